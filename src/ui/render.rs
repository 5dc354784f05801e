use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, Screen};

use super::screens::{auth, todos};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    // While the persisted session is loading only a neutral waiting
    // indicator is shown; the gate is not redirecting yet.
    if app.phase().is_loading() {
        render_loading(frame);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);

    match app.screen {
        Screen::Login => auth::render_login(frame, app, chunks[1]),
        Screen::Register => auth::render_register(frame, app, chunks[1]),
        Screen::Home => todos::render(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::AddingTodo) {
        todos::render_add_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_loading(frame: &mut Frame) {
    let area = centered_rect_fixed(30, 3, frame.area());
    let paragraph = Paragraph::new(Line::from(Span::styled(
        "Loading session...",
        styles::muted_style(),
    )))
    .block(Block::default().borders(Borders::ALL).border_style(styles::muted_style()));
    frame.render_widget(paragraph, area);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Tasklight";
    let right = match app.phase().user() {
        Some(user) => format!("{} [?] Help ", user.name),
        None => "[?] Help ".to_string(),
    };

    let padding = (area.width as usize)
        .saturating_sub(title.len())
        .saturating_sub(right.len());

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if app.screen == Screen::Home {
        format!(" {} of {} done ", app.completed_count(), app.todos.len())
    } else {
        String::from(" ")
    };

    let shortcuts = match app.screen {
        Screen::Home => "[a]dd | [/]filter | [L]ogout | [q]uit",
        Screen::Login | Screen::Register => "[Enter] submit | [Ctrl+C] quit",
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 16, frame.area());
    frame.render_widget(Clear, area);

    let key = styles::help_key_style();
    let desc = styles::help_desc_style();

    let help_text = vec![
        Line::from(Span::styled("        T A S K L I G H T", styles::title_style())),
        Line::from(Span::styled(
            format!("          version {}", env!("CARGO_PKG_VERSION")),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Todos", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  ↑/↓ j/k   ", key),
            Span::styled("Navigate list", desc),
        ]),
        Line::from(vec![
            Span::styled("  Space     ", key),
            Span::styled("Toggle done", desc),
        ]),
        Line::from(vec![Span::styled("  a         ", key), Span::styled("Add todo", desc)]),
        Line::from(vec![
            Span::styled("  d         ", key),
            Span::styled("Delete todo", desc),
        ]),
        Line::from(vec![Span::styled("  /         ", key), Span::styled("Filter", desc)]),
        Line::from(vec![Span::styled("  r         ", key), Span::styled("Refresh", desc)]),
        Line::from(vec![Span::styled("  L         ", key), Span::styled("Log out", desc)]),
        Line::from(vec![Span::styled("  q         ", key), Span::styled("Quit", desc)]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", key),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", key),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(30, 5, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("   Quit Tasklight? [y/n]", styles::list_item_style())),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Center a fixed-size rect inside `area`, clamped to its bounds.
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
