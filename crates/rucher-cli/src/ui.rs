//! TUI implementation of the chat panel

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::sync::{broadcast, mpsc};

use rucher_session::SessionEvent;
use rucher_tui::{
    Theme,
    input::{Action, event_to_action},
    widgets::{
        ChatMessage, InputBox, MessageList, QuickActionBar, Speaker, bar_height,
        transcript_height,
    },
};

/// Panel title
const TITLE: &str = "Assistant Coin des Apiculteurs 🐝";
/// Greeting shown on an empty conversation
const GREETING: &str = "Bonjour ! Comment puis-je vous aider aujourd'hui ?";
/// Input placeholder
const PLACEHOLDER: &str = "Posez votre question…";

/// Preset questions: (chip label, sent text)
pub const QUICK_ACTIONS: &[(&str, &str)] = &[
    (
        "🐝 Conseils débutant",
        "Quels sont tes meilleurs conseils pour un apiculteur débutant ?",
    ),
    ("🦟 Varroa", "Comment lutter efficacement contre le varroa ?"),
    ("🍯 Récolte", "Quand et comment récolter le miel ?"),
    (
        "💪 Santé du miel",
        "Quels sont les bienfaits du miel pour la santé ?",
    ),
];

/// Commands sent from the UI to the session task
#[derive(Debug)]
pub enum UiMessage {
    /// User submitted text (manual or quick action)
    Submit(String),
    /// User requested clear
    Clear,
    /// User requested quit
    Quit,
}

/// State of the chat panel
pub struct WidgetState {
    /// Whether the panel is expanded; a collapsed panel keeps streaming
    open: bool,
    /// Transcript mirror of the conversation store
    messages: Vec<ChatMessage>,
    /// Input box
    input: InputBox,
    /// Current scroll position in lines
    scroll: usize,
    /// Follow the newest content
    stick_to_bottom: bool,
    /// A turn is in flight
    loading: bool,
    /// Error banner, kept until the next send or clear
    error: Option<String>,
    /// Theme
    theme: Theme,
    /// Animation tick
    tick: usize,
    /// Highlighted quick-action chip
    selected_action: usize,
    /// Channel to the session task
    ui_tx: mpsc::Sender<UiMessage>,
}

impl WidgetState {
    /// Create the panel over a restored transcript
    pub fn new(initial: Vec<ChatMessage>, theme: Theme, ui_tx: mpsc::Sender<UiMessage>) -> Self {
        Self {
            open: true,
            messages: initial,
            input: InputBox::new().with_placeholder(PLACEHOLDER),
            scroll: 0,
            stick_to_bottom: true,
            loading: false,
            error: None,
            theme,
            tick: 0,
            selected_action: 0,
            ui_tx,
        }
    }

    /// Advance animations
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Typing dots are shown only before the first delta lands
    fn typing_visible(&self) -> bool {
        self.loading
            && self
                .messages
                .last()
                .is_none_or(|m| m.speaker != Speaker::Assistant)
    }

    /// Quick-action chips are shown on an empty, idle conversation
    fn chips_visible(&self) -> bool {
        self.messages.is_empty() && !self.loading
    }

    /// Mirror a session event into the transcript
    pub fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::TurnStart => {
                self.loading = true;
                self.error = None;
                self.input.set_enabled(false);
                self.stick_to_bottom = true;
            }
            SessionEvent::UserMessage { message } => {
                self.messages.push(ChatMessage::user(message.content));
                self.stick_to_bottom = true;
            }
            SessionEvent::AssistantUpdate { content } => {
                match self.messages.last_mut() {
                    Some(last) if last.streaming => last.content = content,
                    _ => self.messages.push(ChatMessage::assistant_streaming(content)),
                }
                self.stick_to_bottom = true;
            }
            SessionEvent::TurnEnd { message } => {
                self.finish_assistant_entry(message.content);
                self.loading = false;
                self.input.set_enabled(true);
            }
            SessionEvent::Failed { message, reply } => {
                self.finish_assistant_entry(reply.content);
                self.error = Some(message);
                self.loading = false;
                self.input.set_enabled(true);
            }
            SessionEvent::Cleared => {
                self.messages.clear();
                self.error = None;
                self.scroll = 0;
                self.stick_to_bottom = true;
                self.selected_action = 0;
            }
        }
    }

    /// Replace the streaming tail with its final content, or append it
    fn finish_assistant_entry(&mut self, content: String) {
        match self.messages.last_mut() {
            Some(last) if last.streaming => {
                last.content = content;
                last.streaming = false;
            }
            _ => self.messages.push(ChatMessage::assistant(content)),
        }
        self.stick_to_bottom = true;
    }

    /// Handle an input action; returns false to quit the application
    pub async fn handle_action(&mut self, action: Action, width: u16) -> bool {
        if !self.open {
            match action {
                Action::Escape | Action::Submit => self.open = true,
                Action::Quit | Action::Interrupt => {
                    let _ = self.ui_tx.send(UiMessage::Quit).await;
                    return false;
                }
                _ => {}
            }
            return true;
        }

        match action {
            Action::Quit | Action::Interrupt => {
                let _ = self.ui_tx.send(UiMessage::Quit).await;
                return false;
            }
            Action::Escape => {
                // Collapse only; an in-flight turn keeps streaming
                self.open = false;
            }
            Action::ClearChat => {
                let _ = self.ui_tx.send(UiMessage::Clear).await;
            }
            Action::Submit => {
                if self.loading {
                    return true;
                }
                if !self.input.is_empty() {
                    let text = self.input.take();
                    let _ = self.ui_tx.send(UiMessage::Submit(text)).await;
                } else if self.chips_visible() {
                    let (_, text) = QUICK_ACTIONS[self.selected_action];
                    let _ = self.ui_tx.send(UiMessage::Submit(text.to_string())).await;
                }
            }
            Action::Tab => {
                if self.chips_visible() {
                    self.selected_action = (self.selected_action + 1) % QUICK_ACTIONS.len();
                }
            }
            Action::Up => {
                self.stick_to_bottom = false;
                self.scroll = self.scroll.saturating_sub(1);
            }
            Action::Down => self.scroll += 1,
            Action::PageUp => {
                self.stick_to_bottom = false;
                self.scroll = self.scroll.saturating_sub(10);
            }
            Action::PageDown => self.scroll += 10,
            other => {
                self.input.handle_action(&other, width);
            }
        }
        true
    }

    /// Render the panel
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        if !self.open {
            self.render_collapsed(frame, area);
            return;
        }

        let error_height = u16::from(self.error.is_some());
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(error_height),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        if self.chips_visible() {
            self.render_greeting(frame, chunks[1]);
        } else {
            self.render_messages(frame, chunks[1]);
        }
        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(error.clone(), self.theme.error_style()))
                    .centered(),
                chunks[2],
            );
        }
        self.input
            .render(chunks[3], frame.buffer_mut(), &self.theme);
        self.render_footer(frame, chunks[4]);
    }

    fn render_collapsed(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("💬 Aide", self.theme.accent_bold())),
            Line::from(Span::styled(
                "Appuyez sur Entrée pour ouvrir l'assistant",
                self.theme.dim_style(),
            )),
            Line::from(Span::styled("Ctrl+Q : quitter", self.theme.dim_style())),
        ];
        frame.render_widget(Paragraph::new(lines).centered(), area);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let hints = "Ctrl+L: effacer │ Échap: réduire │ Ctrl+Q: quitter";
        let title_width = TITLE.chars().count();
        let hints_width = hints.chars().count();
        let available = area.width as usize;

        let line = if title_width + hints_width + 2 <= available {
            let spacing = available - title_width - hints_width;
            Line::from(vec![
                Span::styled(TITLE, self.theme.accent_bold()),
                Span::raw(" ".repeat(spacing)),
                Span::styled(hints, self.theme.dim_style()),
            ])
        } else {
            Line::from(Span::styled(TITLE, self.theme.accent_bold()))
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_greeting(&mut self, frame: &mut Frame, area: Rect) {
        let labels: Vec<&str> = QUICK_ACTIONS.iter().map(|(label, _)| *label).collect();
        let chips = bar_height(&labels, area.width);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(2),
                Constraint::Length(chips),
                Constraint::Min(1),
            ])
            .split(area);

        let greeting = vec![
            Line::from(Span::raw("🐝")),
            Line::from(Span::styled(GREETING, self.theme.dim_style())),
        ];
        frame.render_widget(Paragraph::new(greeting).centered(), chunks[1]);
        frame.render_widget(
            QuickActionBar::new(&labels, self.selected_action, &self.theme),
            chunks[2],
        );
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let typing = self.typing_visible();
        let total = transcript_height(&self.messages, &self.theme, area.width as usize, typing);
        let max_scroll = total.saturating_sub(area.height as usize);
        if self.stick_to_bottom {
            self.scroll = max_scroll;
        } else {
            self.scroll = self.scroll.min(max_scroll);
            if self.scroll == max_scroll {
                self.stick_to_bottom = true;
            }
        }

        let typing_tick = typing.then_some(self.tick);
        frame.render_widget(
            MessageList::new(&self.messages, &self.theme)
                .scroll(self.scroll)
                .typing(typing_tick),
            area,
        );
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let hint = if self.loading {
            "L'assistant rédige une réponse…"
        } else if self.chips_visible() {
            "Tab: suggestions │ Entrée: envoyer"
        } else {
            "Entrée: envoyer"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, self.theme.dim_style())),
            area,
        );
    }
}

/// Run the panel event loop until the user quits
pub async fn run_widget(
    mut state: WidgetState,
    mut session_rx: broadcast::Receiver<SessionEvent>,
) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut event_stream = EventStream::new();

    // Tick interval for the typing animation
    let mut tick_interval = tokio::time::interval(std::time::Duration::from_millis(80));

    let result = loop {
        terminal.draw(|frame| state.render(frame))?;
        let width = terminal.size()?.width;

        tokio::select! {
            biased;

            // Session events first, for streaming responsiveness
            event = session_rx.recv() => {
                match event {
                    Ok(event) => state.handle_session_event(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("dropped {} session events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break Ok(()),
                }
            }

            event = event_stream.next() => {
                match event {
                    Some(Ok(event)) => {
                        if let Some(action) = event_to_action(event) {
                            if !state.handle_action(action, width).await {
                                break Ok(());
                            }
                        }
                    }
                    Some(Err(e)) => break Err(e.into()),
                    None => break Ok(()),
                }
            }

            _ = tick_interval.tick() => {
                state.tick();
            }
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;

    result
}
