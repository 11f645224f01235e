//! Every flattened message in order

use bidrelay_cli::console::ChatMessage;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
};

pub struct MessageListView;

impl MessageListView {
    pub fn render(frame: &mut Frame, area: Rect, messages: &[ChatMessage], scroll: u16) {
        let header = Row::new(vec![
            Cell::from("#").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Role").style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from("Content").style(Style::default().add_modifier(Modifier::BOLD)),
        ])
        .height(1);

        let rows: Vec<Row> = messages
            .iter()
            .skip(scroll as usize)
            .map(|message| {
                let content = message.content.split_whitespace().collect::<Vec<_>>().join(" ");
                Row::new(vec![
                    Cell::from(message.id.to_string()),
                    Cell::from("assistant"),
                    Cell::from(content),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(4),  // #
            Constraint::Length(10), // Role
            Constraint::Min(20),    // Content
        ];

        let table = Table::new(rows, widths).header(header).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("All messages [{}]", messages.len())),
        );
        frame.render_widget(table, area);
    }
}
