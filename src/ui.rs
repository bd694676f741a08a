//! Terminal UI rendering with ratatui

use blockfall::engine::Engine;
use blockfall::settings::Settings;
use blockfall::tetromino::{TetrominoType, color_for_key};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::collections::HashSet;

const EMPTY: &str = "  ";

/// Hold box width
const SIDE_WIDTH: u16 = 12;
/// Next queue + stats column width
const INFO_WIDTH: u16 = 16;

/// Render the whole game screen
pub fn render_game(frame: &mut Frame, engine: &Engine, settings: &Settings, paused: bool) {
    let area = frame.area();
    let (block_char, _) = settings.visual.block_chars();

    let board_width = engine.board().num_cols() as u16 * 2 + 2;
    let board_height = engine.board().num_rows() as u16 + 2;
    let game_area = center_rect(
        area,
        SIDE_WIDTH + board_width + INFO_WIDTH,
        board_height.max(20),
    );

    // Create main layout: hold | board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(SIDE_WIDTH),
            Constraint::Length(board_width),
            Constraint::Length(INFO_WIDTH),
        ])
        .split(game_area);

    render_hold(frame, main_layout[0], engine.held_piece(), block_char);
    render_board(frame, main_layout[1], engine, settings);

    // Right side: next queue and stats
    let queue: Vec<TetrominoType> = engine.preview().collect();
    let queue_height = (queue.len().min(4) as u16) * 3 + 2;
    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(queue_height), Constraint::Min(8)])
        .split(main_layout[2]);

    render_next_queue(frame, right_layout[0], &queue, block_char);
    render_stats(frame, right_layout[1], engine);

    // Overlays
    if engine.is_game_over() {
        let hint = format!("Press {} to quit", key_hint(&settings.keys.quit, "q"));
        render_overlay(frame, area, "GAME OVER", &hint);
    } else if paused {
        let hint = format!("Press {} to resume", key_hint(&settings.keys.pause, "p"));
        render_overlay(frame, area, "PAUSED", &hint);
    }
}

/// First key bound to an action, as written in the settings file
fn key_hint<'a>(keys: &'a [String], fallback: &'a str) -> &'a str {
    keys.first().map(String::as_str).unwrap_or(fallback)
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the hold piece box
fn render_hold(frame: &mut Frame, area: Rect, hold: Option<TetrominoType>, block_char: &str) {
    let block = Block::default()
        .title(" HOLD ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    // A 4x4 preview needs at most 4 rows inside the border
    let area = Rect {
        height: area.height.min(6),
        ..area
    };
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(piece_type) = hold {
        render_mini_piece(frame, inner, piece_type, block_char);
    }
}

/// Render the next piece queue
fn render_next_queue(frame: &mut Frame, area: Rect, queue: &[TetrominoType], block_char: &str) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Show up to 4 pieces in the queue
    let num_pieces = queue.len().min(4);
    if num_pieces == 0 {
        return;
    }

    let piece_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3); num_pieces])
        .split(inner);

    for (i, &piece_type) in queue.iter().take(num_pieces).enumerate() {
        render_mini_piece(frame, piece_areas[i], piece_type, block_char);
    }
}

/// Render a small piece preview (for hold and next queue)
fn render_mini_piece(frame: &mut Frame, area: Rect, piece_type: TetrominoType, block_char: &str) {
    if area.height < 1 || area.width < 4 {
        return;
    }

    let color = color_for_key(piece_type.color_key());
    let matrix = piece_type.matrix();

    // Skip the empty padding rows of the default orientation
    let lines: Vec<Line> = matrix
        .rows()
        .filter(|row| row.iter().any(|&cell| cell != 0))
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|&cell| {
                    if cell != 0 {
                        Span::styled(block_char, Style::default().fg(color))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, engine: &Engine, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();

    let block = Block::default()
        .title(" BLOCKFALL ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Landing preview cells, drawn only where the board is empty
    let mut ghost_cells = HashSet::new();
    let mut ghost_color = Color::White;
    if settings.visual.show_ghost {
        if let (Some(piece), Some(row)) = (engine.active_piece(), engine.ghost_row()) {
            ghost_cells.extend(piece.cells_at(row, piece.col));
            ghost_color = color_for_key(piece.color_key());
        }
    }

    let lines: Vec<Line> = engine
        .board()
        .rows()
        .enumerate()
        .map(|(row, cells)| {
            let spans: Vec<Span> = cells
                .iter()
                .enumerate()
                .map(|(col, &key)| {
                    if key != 0 {
                        Span::styled(block_char, Style::default().fg(color_for_key(key)))
                    } else if ghost_cells.contains(&(row as i32, col as i32)) {
                        Span::styled(ghost_char, Style::default().fg(ghost_color).dim())
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn render_stats(frame: &mut Frame, area: Rect, engine: &Engine) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled("SCORE", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", engine.points()),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::raw(""),
        Line::from(Span::styled("LEVEL", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", engine.level()),
            Style::default().fg(Color::Cyan),
        )),
        Line::raw(""),
        Line::from(Span::styled("LINES", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", engine.lines()),
            Style::default().fg(Color::Green),
        )),
    ];

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = 24u16;
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
