use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use gram_core::mention::{
    KeyOutcome, MentionInput, MentionKey, MentionToken, SearchDispatcher, SearchOutcome,
    SearchRequest, TokenKind,
};
use gram_core::{Config, HttpApi};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use tokio::sync::mpsc;

use super::Term;

const POPUP_WIDTH: u16 = 36;
const POPUP_ROWS: usize = 6;

/// Where the suggestion list landed on screen, and how far it is scrolled
#[derive(Debug, Clone, Copy, PartialEq)]
struct PopupArea {
    rect: Rect,
    offset: usize,
}

#[derive(Debug, PartialEq)]
enum Action {
    Nothing,
    /// Text or caret moved; carries the search to start, if any
    Edited(Option<SearchRequest>),
    Save,
    Discard,
}

/// Edit text with live @mention suggestions. `None` when discarded.
pub async fn run(api: Arc<HttpApi>, config: &Config) -> anyhow::Result<Option<String>> {
    let (dispatcher, mut outcomes) = SearchDispatcher::new(api, config.search_debounce);

    let mut terminal = super::enter()?;
    let result =
        tokio::task::block_in_place(|| run_app(&mut terminal, &dispatcher, &mut outcomes));
    super::leave(&mut terminal)?;
    dispatcher.cancel_all();

    Ok(result?)
}

fn run_app(
    terminal: &mut Term,
    dispatcher: &SearchDispatcher<HttpApi>,
    outcomes: &mut mpsc::UnboundedReceiver<SearchOutcome>,
) -> io::Result<Option<String>> {
    let mut input = MentionInput::new();
    let mut list = ListState::default();
    let mut popup: Option<PopupArea> = None;

    loop {
        while let Ok(outcome) = outcomes.try_recv() {
            input.apply_search_result(outcome.generation, outcome.result);
        }

        terminal.draw(|f| popup = draw(f, &input, &mut list))?;

        if !event::poll(Duration::from_millis(20))? {
            continue;
        }
        let action = match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => on_key(&mut input, key),
            Event::Mouse(mouse) => {
                let row = popup.and_then(|area| popup_row(&area, mouse.column, mouse.row));
                match (mouse.kind, row) {
                    (MouseEventKind::Moved, Some(i)) => {
                        input.hover(i);
                        Action::Nothing
                    }
                    (MouseEventKind::Down(MouseButton::Left), Some(i)) => {
                        input.select(i);
                        Action::Edited(None)
                    }
                    (MouseEventKind::Down(MouseButton::Left), None) => {
                        input.click_outside();
                        Action::Nothing
                    }
                    _ => Action::Nothing,
                }
            }
            Event::Paste(pasted) => {
                let (text, cursor) = insert_str(input.text(), input.cursor(), &pasted);
                Action::Edited(input.on_text_change(text, cursor))
            }
            _ => Action::Nothing,
        };

        match action {
            Action::Nothing => {}
            Action::Edited(Some(request)) => {
                dispatcher.dispatch(request);
            }
            Action::Edited(None) => dispatcher.cancel_all(),
            Action::Save => return Ok(Some(input.text().to_string())),
            Action::Discard => return Ok(None),
        }
    }
}

fn on_key(input: &mut MentionInput, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('s') | KeyCode::Char('d') => Action::Save,
            KeyCode::Char('c') => Action::Discard,
            _ => Action::Nothing,
        };
    }

    match input.on_key(mention_key(key.code)) {
        KeyOutcome::Consumed => return Action::Nothing,
        KeyOutcome::Selected(_) => return Action::Edited(None),
        KeyOutcome::PassThrough => {}
    }
    if key.code == KeyCode::Esc && input.is_searching() {
        // popup is waiting on results: close it, keep the draft
        input.dismiss();
        return Action::Edited(None);
    }

    let text = input.text();
    let cursor = input.cursor();
    let (text, cursor) = match key.code {
        KeyCode::Char(c) => insert_str(text, cursor, c.encode_utf8(&mut [0; 4])),
        KeyCode::Enter => insert_str(text, cursor, "\n"),
        KeyCode::Backspace => delete_before(text, cursor),
        KeyCode::Left => (text.to_string(), prev_boundary(text, cursor)),
        KeyCode::Right => (text.to_string(), next_boundary(text, cursor)),
        KeyCode::Home => (text.to_string(), line_start(text, cursor)),
        KeyCode::End => (text.to_string(), line_end(text, cursor)),
        KeyCode::Esc => return Action::Discard,
        _ => return Action::Nothing,
    };
    Action::Edited(input.on_text_change(text, cursor))
}

fn mention_key(code: KeyCode) -> MentionKey {
    match code {
        KeyCode::Down => MentionKey::Down,
        KeyCode::Up => MentionKey::Up,
        KeyCode::Enter | KeyCode::Tab => MentionKey::Confirm,
        KeyCode::Esc => MentionKey::Escape,
        _ => MentionKey::Other,
    }
}

fn insert_str(text: &str, cursor: usize, s: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len() + s.len());
    out.push_str(&text[..cursor]);
    out.push_str(s);
    out.push_str(&text[cursor..]);
    (out, cursor + s.len())
}

fn delete_before(text: &str, cursor: usize) -> (String, usize) {
    let start = prev_boundary(text, cursor);
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..start]);
    out.push_str(&text[cursor..]);
    (out, start)
}

fn prev_boundary(text: &str, cursor: usize) -> usize {
    text[..cursor].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_boundary(text: &str, cursor: usize) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map_or(cursor, |c| cursor + c.len_utf8())
}

fn line_start(text: &str, cursor: usize) -> usize {
    text[..cursor].rfind('\n').map_or(0, |i| i + 1)
}

fn line_end(text: &str, cursor: usize) -> usize {
    text[cursor..].find('\n').map_or(text.len(), |i| cursor + i)
}

/// Suggestion index under (column, row), skipping the popup border
fn popup_row(popup: &PopupArea, column: u16, row: u16) -> Option<usize> {
    let area = popup.rect;
    let inside = column > area.x
        && column < area.x + area.width.saturating_sub(1)
        && row > area.y
        && row < area.y + area.height.saturating_sub(1);
    inside.then(|| popup.offset + usize::from(row - area.y - 1))
}

/// Line and column (in chars) of the caret
fn caret_position(text: &str, cursor: usize) -> (usize, usize) {
    let before = &text[..cursor];
    let line = before.matches('\n').count();
    let column = before[line_start(text, cursor)..].chars().count();
    (line, column)
}

fn styled_lines(tokens: &[MentionToken]) -> Vec<Line<'static>> {
    let mention = Style::default()
        .fg(Color::LightBlue)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::default()];
    for token in tokens {
        let style = match token.kind {
            TokenKind::Mention => mention,
            TokenKind::Text => Style::default(),
        };
        for (i, part) in token.content.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            if !part.is_empty() {
                if let Some(line) = lines.last_mut() {
                    line.spans.push(Span::styled(part.to_string(), style));
                }
            }
        }
    }
    lines
}

/// Draw the editor; returns where the suggestion popup went.
/// `list` keeps the popup's scroll position between frames.
fn draw(f: &mut Frame, input: &MentionInput, list: &mut ListState) -> Option<PopupArea> {
    let area = f.size();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let editor = rows[0];

    f.render_widget(
        Paragraph::new(styled_lines(&input.highlighted()))
            .block(Block::default().title("Compose").borders(Borders::ALL)),
        editor,
    );

    let hint = if input.is_searching() {
        "searching..."
    } else {
        "@ to mention · ↑/↓ Enter pick · Ctrl+S save · Esc discard"
    };
    f.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        rows[1],
    );

    let (line, column) = caret_position(input.text(), input.cursor());
    let caret_x = (editor.x + 1).saturating_add(column as u16);
    let caret_y = (editor.y + 1).saturating_add(line as u16);
    f.set_cursor(caret_x, caret_y);

    if !input.is_visible() {
        *list = ListState::default();
        return None;
    }

    let shown = input.suggestions().len().min(POPUP_ROWS) as u16;
    let height = (shown + 2).min(area.height);
    let width = POPUP_WIDTH.min(area.width);
    let mut y = caret_y.saturating_add(1);
    if y + height > area.y + area.height {
        y = caret_y.saturating_sub(height);
    }
    let x = caret_x.min(area.x + area.width - width);
    let popup = Rect {
        x,
        y,
        width,
        height,
    };

    let items: Vec<ListItem> = input
        .suggestions()
        .iter()
        .map(|user| {
            let mut spans = vec![Span::styled(
                user.user_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if let Some(name) = &user.user_fullname {
                spans.push(Span::styled(
                    format!("  {}", name),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    list.select(Some(input.selected_index()));

    f.render_widget(Clear, popup);
    f.render_stateful_widget(
        List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::Blue).fg(Color::White)),
        popup,
        list,
    );
    Some(PopupArea {
        rect: popup,
        offset: list.offset(),
    })
}
