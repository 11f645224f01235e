//! Event types for the TUI

use std::thread;
use std::time::Duration;

use bidrelay_cli::console::SubmissionEvent;
use crossterm::event::{self as term, KeyEvent};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Events that can occur in the TUI
#[derive(Debug)]
pub enum Event {
    /// A key was pressed
    Key(KeyEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// A tick occurred (for UI refresh)
    Tick,
    /// Progress from the submission with the given generation
    Submission(u64, SubmissionEvent),
}

/// Merges terminal input and submission progress into one queue
pub struct EventHandler {
    tx: UnboundedSender<Event>,
    rx: UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Start polling the terminal on a background thread
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = unbounded_channel();
        let input_tx = tx.clone();

        thread::spawn(move || {
            loop {
                let event = match term::poll(tick_rate) {
                    Ok(true) => match term::read() {
                        Ok(term::Event::Key(key)) => Event::Key(key),
                        Ok(term::Event::Resize(w, h)) => Event::Resize(w, h),
                        Ok(_) => continue,
                        Err(e) => {
                            tracing::warn!("Terminal read failed: {e}");
                            break;
                        }
                    },
                    Ok(false) => Event::Tick,
                    Err(e) => {
                        tracing::warn!("Terminal poll failed: {e}");
                        break;
                    }
                };
                if input_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { tx, rx }
    }

    /// Handle for submission tasks to report through
    pub fn sender(&self) -> UnboundedSender<Event> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
