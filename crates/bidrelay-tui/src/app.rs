//! Application state and logic

use std::sync::Arc;

use bidrelay_cli::console::{
    Console, RelayTransport, SubmissionEvent, SubmissionForm, run_submission,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::event::Event;

/// Result tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Writers,
    Messages,
    Raw,
    Logs,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Writers, Tab::Messages, Tab::Raw, Tab::Logs];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Writers => "Writers",
            Tab::Messages => "All messages",
            Tab::Raw => "Raw",
            Tab::Logs => "Logs",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Writers => 0,
            Tab::Messages => 1,
            Tab::Raw => 2,
            Tab::Logs => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// `'1'..='4'` select a tab directly
    pub fn from_digit(c: char) -> Option<Self> {
        let n = c.to_digit(10)? as usize;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }
}

/// Main application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    pub console: Console,
    pub form: SubmissionForm,
    pub tab: Tab,
    /// Prompt being typed while in edit mode
    pub input: Option<String>,
    /// Vertical scroll of the active tab
    pub scroll: u16,
    transport: Arc<dyn RelayTransport>,
    events: UnboundedSender<Event>,
    task: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(
        transport: Arc<dyn RelayTransport>,
        form: SubmissionForm,
        stream_logs: bool,
        events: UnboundedSender<Event>,
    ) -> Self {
        Self {
            should_quit: false,
            console: Console::new(stream_logs),
            form,
            tab: Tab::Writers,
            input: None,
            scroll: 0,
            transport,
            events,
            task: None,
        }
    }

    /// Mark the app as ready to quit
    pub fn quit(&mut self) {
        self.should_quit = true;
        self.cancel();
    }

    pub fn is_editing(&self) -> bool {
        self.input.is_some()
    }

    /// URL the next submission will go to
    pub fn endpoint(&self) -> String {
        self.transport.endpoint(self.console.stream_logs)
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Submission(generation, event) => {
                self.console.apply(generation, event);
            }
            Event::Resize(_, _) | Event::Tick => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }
        if self.is_editing() {
            self.handle_edit_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Enter | KeyCode::Char('r') => self.submit(),
            KeyCode::Char('l') => {
                self.console.stream_logs = !self.console.stream_logs;
            }
            KeyCode::Char('e') => {
                self.input = Some(self.form.message.clone());
            }
            KeyCode::Tab => self.select_tab(self.tab.next()),
            KeyCode::BackTab => self.select_tab(self.tab.previous()),
            KeyCode::Char(c) => {
                if let Some(tab) = Tab::from_digit(c) {
                    self.select_tab(tab);
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::Home => self.scroll = 0,
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                self.form.message = std::mem::take(input);
                self.input = None;
            }
            KeyCode::Esc => self.input = None,
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
    }

    fn select_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.scroll = 0;
        }
    }

    /// Start a submission, superseding any still in flight
    pub fn submit(&mut self) {
        self.cancel();
        let generation = self.console.begin();
        tracing::info!(generation, endpoint = %self.endpoint(), "Submitting");

        let transport = Arc::clone(&self.transport);
        let form = self.form.clone();
        let stream_logs = self.console.stream_logs;
        let events = self.events.clone();

        self.task = Some(tokio::spawn(async move {
            run_submission(
                transport.as_ref(),
                &form,
                stream_logs,
                &mut |event: SubmissionEvent| {
                    let _ = events.send(Event::Submission(generation, event));
                },
            )
            .await;
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                tracing::debug!("Aborting superseded submission");
            }
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bidrelay_cli::console::{SubmissionState, WriterBucket};
    use bidrelay_cli::testing::{ScriptedResponse, ScriptedTransport};
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    fn app_with(response: ScriptedResponse) -> (App, UnboundedReceiver<Event>) {
        let (tx, rx) = unbounded_channel();
        let transport = Arc::new(ScriptedTransport::new(response));
        (App::new(transport, SubmissionForm::default(), true, tx), rx)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    async fn drain(app: &mut App, rx: &mut UnboundedReceiver<Event>) {
        while app.console.is_loading() {
            let Some(event) = rx.recv().await else {
                break;
            };
            app.handle_event(event);
        }
    }

    #[tokio::test]
    async fn test_submit_fills_console() {
        let (mut app, mut rx) = app_with(
            ScriptedResponse::new(200, Some("application/json"))
                .chunk(r#"[{"message":"Pricing: 12k","compliant":true}]"#),
        );
        press(&mut app, KeyCode::Enter);
        drain(&mut app, &mut rx).await;

        assert_eq!(app.console.state(), SubmissionState::Done);
        assert!(app.console.verdict().is_some_and(|v| v.compliant));
        assert_eq!(app.console.buckets().get(WriterBucket::Pricing).len(), 1);
        assert!(!app.console.logs.live.is_empty());
    }

    #[tokio::test]
    async fn test_resubmission_ignores_stale_events() {
        let (mut app, mut rx) =
            app_with(ScriptedResponse::new(200, Some("text/plain")).chunk("hello"));

        app.submit();
        let first = app.console.generation();
        app.submit();
        let second = app.console.generation();
        assert!(second > first);

        drain(&mut app, &mut rx).await;
        assert_eq!(app.console.state(), SubmissionState::Done);
        assert_eq!(app.console.messages().len(), 1);
        assert_eq!(
            app.console
                .logs
                .network
                .entries()
                .iter()
                .filter(|e| e.text == "Preparing request...")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_tab_keys() {
        let (mut app, _rx) = app_with(ScriptedResponse::new(200, None));
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.tab, Tab::Raw);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, Tab::Logs);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, Tab::Writers);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.tab, Tab::Logs);
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.tab, Tab::Logs);
    }

    #[tokio::test]
    async fn test_toggle_logs_changes_endpoint() {
        let (mut app, _rx) = app_with(ScriptedResponse::new(200, None));
        assert!(app.endpoint().ends_with("?stream=1"));
        press(&mut app, KeyCode::Char('l'));
        assert!(!app.console.stream_logs);
        assert!(!app.endpoint().contains("stream"));
    }

    #[tokio::test]
    async fn test_edit_prompt() {
        let (mut app, _rx) = app_with(ScriptedResponse::new(200, None));
        press(&mut app, KeyCode::Char('e'));
        assert!(app.is_editing());
        for c in "Only q".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert!(!app.is_editing());
        assert_eq!(app.form.message, "Only ");
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let (mut app, _rx) = app_with(ScriptedResponse::new(200, None));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let (mut app, _rx) = app_with(ScriptedResponse::new(200, None));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_from_digit() {
        assert_eq!(Tab::from_digit('1'), Some(Tab::Writers));
        assert_eq!(Tab::from_digit('4'), Some(Tab::Logs));
        assert_eq!(Tab::from_digit('0'), None);
        assert_eq!(Tab::from_digit('x'), None);
    }
}
