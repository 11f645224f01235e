//! Structured form of every message as pretty JSON

use ratatui::{
    Frame,
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
};
use serde_json::Value;

pub struct RawView;

impl RawView {
    pub fn render(frame: &mut Frame, area: Rect, raw: &Value, scroll: u16) {
        let text = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
        let view = Paragraph::new(text)
            .scroll((scroll, 0))
            .block(Block::default().borders(Borders::ALL).title("Raw"));
        frame.render_widget(view, area);
    }
}
