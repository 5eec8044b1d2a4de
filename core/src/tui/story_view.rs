use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use gram_core::format::{image_url, relative_time};
use gram_core::routes::Route;
use gram_core::story::{StoryViewer, ViewerCommand, ViewerEvent, ViewerFrame};
use gram_core::types::UserId;
use gram_core::{Config, HttpApi};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};
use tokio::sync::mpsc::{self, error::TryRecvError};

use super::{centered, Term};

#[derive(Default)]
struct ViewState {
    frame: Option<ViewerFrame>,
    notice: Option<String>,
}

impl ViewState {
    fn confirming(&self) -> bool {
        self.frame.as_ref().is_some_and(|f| f.confirming_delete)
    }
}

/// Play `user_id`'s stories full screen. Returns where the viewer sent us.
pub async fn run(
    api: Arc<HttpApi>,
    config: &Config,
    user_id: UserId,
    viewer_id: Option<UserId>,
) -> anyhow::Result<Route> {
    let (viewer, mut events) = StoryViewer::new(api, config, viewer_id);
    let (commands, command_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(viewer.run(user_id, command_rx));

    let mut terminal = super::enter()?;
    let image_base = config.image_base_url.clone();
    let result = tokio::task::block_in_place(|| {
        run_app(&mut terminal, &mut events, &commands, &image_base)
    });
    super::leave(&mut terminal)?;

    // closing the command channel ends the viewer if it is still running
    drop(commands);
    let reason = handle.await?;
    tracing::debug!("story view closed: {:?}", reason);
    Ok(result?)
}

fn run_app(
    terminal: &mut Term,
    events: &mut mpsc::UnboundedReceiver<ViewerEvent>,
    commands: &mpsc::UnboundedSender<ViewerCommand>,
    image_base: &str,
) -> io::Result<Route> {
    let mut view = ViewState::default();
    loop {
        loop {
            match events.try_recv() {
                Ok(ViewerEvent::Frame(frame)) => view.frame = Some(frame),
                Ok(ViewerEvent::Notice(msg)) => view.notice = Some(msg),
                Ok(ViewerEvent::Exited(route)) => return Ok(route),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(Route::Feed),
            }
        }

        terminal.draw(|f| draw(f, &view, image_base))?;

        if event::poll(Duration::from_millis(20))? {
            let command = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    key_command(key.code, view.confirming())
                }
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    let width = terminal.size()?.width;
                    Some(ViewerCommand::Click {
                        x: f64::from(mouse.column),
                        width: f64::from(width),
                    })
                }
                _ => None,
            };
            if let Some(command) = command {
                view.notice = None;
                let _ = commands.send(command);
            }
        }
    }
}

fn key_command(code: KeyCode, confirming: bool) -> Option<ViewerCommand> {
    match code {
        KeyCode::Char('y') | KeyCode::Enter if confirming => Some(ViewerCommand::ConfirmDelete),
        KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc if confirming => {
            Some(ViewerCommand::CancelDelete)
        }
        _ if confirming => None,
        KeyCode::Left | KeyCode::Char('h') => Some(ViewerCommand::Prev),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => Some(ViewerCommand::Next),
        KeyCode::Char('d') => Some(ViewerCommand::RequestDelete),
        KeyCode::Char('q') | KeyCode::Esc => Some(ViewerCommand::Close),
        _ => None,
    }
}

fn draw(f: &mut Frame, view: &ViewState, image_base: &str) {
    let area = f.size();
    let Some(frame) = &view.frame else {
        f.render_widget(
            Paragraph::new("Loading stories...").alignment(Alignment::Center),
            area,
        );
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let total = frame.bars.len().max(1) as u32;
    let segments = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, total); frame.bars.len()])
        .spacing(1)
        .split(rows[0]);
    for (fill, segment) in frame.bars.iter().zip(segments.iter()) {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::White).bg(Color::DarkGray))
            .ratio((fill / 100.0).clamp(0.0, 1.0))
            .label("");
        f.render_widget(gauge, *segment);
    }

    let header = Line::from(vec![
        Span::styled(
            frame.story.user_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            relative_time(&frame.story.created_at),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("  {}/{}", frame.index + 1, frame.total),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(header), rows[1]);

    let prev = if frame.has_prev { "‹" } else { " " };
    let next = if frame.has_next { "›" } else { " " };
    let body = vec![
        Line::from(""),
        Line::from(image_url(image_base, Some(&frame.story.story_image))),
        Line::from(""),
        Line::from(format!("{}{}{}", prev, " ".repeat(20), next)),
    ];
    f.render_widget(
        Paragraph::new(body)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        rows[2],
    );

    let footer = match &view.notice {
        Some(msg) => Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Red))),
        None if frame.can_delete => Line::from("←/→ or click the sides · d delete · q close"),
        None => Line::from("←/→ or click the sides · q close"),
    };
    f.render_widget(Paragraph::new(footer), rows[3]);

    if frame.confirming_delete {
        let popup = centered(area, 36, 5);
        f.render_widget(Clear, popup);
        f.render_widget(
            Paragraph::new(vec![
                Line::from("Delete this story?"),
                Line::from(""),
                Line::from("y delete · n cancel"),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().title("Delete").borders(Borders::ALL)),
            popup,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_navigate() {
        assert_eq!(key_command(KeyCode::Left, false), Some(ViewerCommand::Prev));
        assert_eq!(key_command(KeyCode::Right, false), Some(ViewerCommand::Next));
        assert_eq!(key_command(KeyCode::Esc, false), Some(ViewerCommand::Close));
    }

    #[test]
    fn dialog_captures_keys() {
        assert_eq!(key_command(KeyCode::Char('y'), true), Some(ViewerCommand::ConfirmDelete));
        assert_eq!(key_command(KeyCode::Esc, true), Some(ViewerCommand::CancelDelete));
        assert_eq!(key_command(KeyCode::Right, true), None);
        assert_eq!(key_command(KeyCode::Char('y'), false), None);
    }
}
