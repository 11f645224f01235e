//! Network and live log panes

use bidrelay_cli::console::{LogBook, LogStream};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub struct LogPanes;

impl LogPanes {
    /// Side-by-side panes showing the newest lines of each log
    pub fn render_tail(frame: &mut Frame, area: Rect, logs: &LogBook) {
        let panes = split(area);
        let visible = area.height.saturating_sub(2) as usize;

        let network = tail(logs.network_text(), visible);
        let live = tail(logs.live_text(), visible);

        frame.render_widget(pane(network, "Network"), panes[0]);
        frame.render_widget(pane(live, "Live").wrap(Wrap { trim: false }), panes[1]);
    }

    /// The whole network log with timestamps, next to the whole live log
    pub fn render_full(frame: &mut Frame, area: Rect, logs: &LogBook, scroll: u16) {
        let panes = split(area);

        frame.render_widget(
            Paragraph::new(timestamped(&logs.network))
                .scroll((scroll, 0))
                .block(Block::default().borders(Borders::ALL).title("Network log")),
            panes[0],
        );
        frame.render_widget(
            Paragraph::new(logs.live_text())
                .wrap(Wrap { trim: false })
                .scroll((scroll, 0))
                .block(Block::default().borders(Borders::ALL).title("Live log")),
            panes[1],
        );
    }
}

fn split(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

fn pane(text: String, title: &'static str) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title(title))
}

/// Last `lines` lines of `text`
fn tail(text: String, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

fn timestamped(stream: &LogStream) -> Vec<Line<'static>> {
    stream
        .entries()
        .iter()
        .map(|entry| Line::from(format!("{} {}", entry.at.format("%H:%M:%S%.3f"), entry.text)))
        .collect()
}
