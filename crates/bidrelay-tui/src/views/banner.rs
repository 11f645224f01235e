//! Status line and compliance banner

use bidrelay_cli::console::{ComplianceVerdict, SubmissionState};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let console = &app.console;
        let state_style = match console.state() {
            SubmissionState::Done => Style::default().fg(Color::Green),
            SubmissionState::Failed => Style::default().fg(Color::Red),
            SubmissionState::Idle => Style::default().fg(Color::DarkGray),
            _ => Style::default().fg(Color::Yellow),
        };

        let logs = if console.stream_logs { "on" } else { "off" };
        let prompt = match &app.input {
            Some(input) => Span::styled(
                format!("{input}▏"),
                Style::default().add_modifier(Modifier::UNDERLINED),
            ),
            None => Span::raw(app.form.prompt().to_string()),
        };

        let mut spans = vec![
            Span::styled(
                format!("[{}]", console.state().label()),
                state_style.add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" logs: {logs} | prompt: ")),
            prompt,
        ];
        if let Some(error) = console.error() {
            spans.push(Span::styled(
                format!(" | {error}"),
                Style::default().fg(Color::Red),
            ));
        }

        let status = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Bid relay {}", app.endpoint())),
        );
        frame.render_widget(status, area);
    }
}

pub struct ComplianceBanner;

impl ComplianceBanner {
    pub fn render(frame: &mut Frame, area: Rect, verdict: Option<&ComplianceVerdict>) {
        let (lines, color) = match verdict {
            Some(v) => (
                vec![
                    Line::from(Span::styled(
                        v.headline(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(v.message.clone()),
                ],
                if v.compliant { Color::Green } else { Color::Red },
            ),
            None => (
                vec![Line::from("No compliance verdict yet.")],
                Color::DarkGray,
            ),
        };

        let banner = Paragraph::new(lines)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Compliance"));
        frame.render_widget(banner, area);
    }
}
