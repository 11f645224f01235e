//! TUI view components

pub mod banner;
pub mod logs;
pub mod messages;
pub mod raw;
pub mod writers;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Tabs},
};

use crate::app::{App, Tab};

pub use banner::{ComplianceBanner, StatusBar};
pub use logs::LogPanes;
pub use messages::MessageListView;
pub use raw::RawView;
pub use writers::WritersView;

/// Draw the whole screen
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Status + prompt
            Constraint::Length(4),  // Compliance banner
            Constraint::Length(3),  // Tabs
            Constraint::Min(6),     // Active tab
            Constraint::Length(10), // Log panes
            Constraint::Length(1),  // Footer
        ])
        .split(frame.area());

    StatusBar::render(frame, chunks[0], app);
    ComplianceBanner::render(frame, chunks[1], app.console.verdict());
    render_tabs(frame, chunks[2], app.tab);

    let body = chunks[3];
    match app.tab {
        Tab::Writers => WritersView::render(frame, body, app.console.buckets(), app.scroll),
        Tab::Messages => MessageListView::render(frame, body, app.console.messages(), app.scroll),
        Tab::Raw => RawView::render(frame, body, &app.console.raw_view(), app.scroll),
        Tab::Logs => LogPanes::render_full(frame, body, &app.console.logs, app.scroll),
    }

    LogPanes::render_tail(frame, chunks[4], &app.console.logs);
    render_footer(frame, chunks[5], app);
}

fn render_tabs(frame: &mut Frame, area: ratatui::layout::Rect, active: Tab) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| Line::from(format!("{} {}", tab.index() + 1, tab.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(active.index())
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_footer(frame: &mut Frame, area: ratatui::layout::Rect, app: &App) {
    let text = if app.is_editing() {
        " Enter: save prompt | Esc: cancel "
    } else {
        " Enter/r: submit | l: toggle logs | Tab/1-4: switch tab | e: edit prompt | ↑↓: scroll | q: quit "
    };
    let footer = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, area);
}
