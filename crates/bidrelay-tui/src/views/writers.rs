//! Messages grouped by writer bucket

use bidrelay_cli::console::WriterBuckets;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub struct WritersView;

impl WritersView {
    pub fn render(frame: &mut Frame, area: Rect, buckets: &WriterBuckets, scroll: u16) {
        let mut lines = Vec::new();
        for (bucket, messages) in buckets.iter() {
            let heading = Style::default()
                .fg(if messages.is_empty() {
                    Color::DarkGray
                } else {
                    Color::Cyan
                })
                .add_modifier(Modifier::BOLD);
            lines.push(Line::from(Span::styled(
                format!("{} ({})", bucket.label(), messages.len()),
                heading,
            )));

            for message in messages {
                for (i, text) in message.content.lines().enumerate() {
                    let prefix = if i == 0 {
                        format!("  #{} ", message.id)
                    } else {
                        "     ".to_string()
                    };
                    lines.push(Line::from(format!("{prefix}{text}")));
                }
            }
            lines.push(Line::default());
        }

        let view = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Writers [{} messages]", buckets.total())),
            );
        frame.render_widget(view, area);
    }
}
