//! Login and register screens.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AuthFocus};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;
use crate::utils::truncate_string;

/// Width of the centered auth dialogs
const FORM_WIDTH: u16 = 48;

/// Visible width of a form field
const FIELD_WIDTH: usize = 26;

pub fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let height = if app.auth_error.is_some() { 15 } else { 13 };
    let box_area = centered_rect_fixed(FORM_WIDTH, height, area);
    frame.render_widget(Clear, box_area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));
    lines.push(field_line(
        "Email",
        &app.form_email,
        app.auth_focus == AuthFocus::Email,
        false,
    ));
    lines.push(Line::from(""));
    lines.push(field_line(
        "Password",
        &app.form_password,
        app.auth_focus == AuthFocus::Password,
        true,
    ));
    lines.push(Line::from(""));
    lines.push(button_line("[ Sign in ]", app.auth_focus == AuthFocus::Button));

    if let Some(ref err) = app.auth_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", truncate_string(err, FORM_WIDTH as usize - 4)),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " [Tab] next field  [Ctrl+R] create account",
        styles::muted_style(),
    )));

    let block = Block::default()
        .title(" Sign in ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), box_area);
}

pub fn render_register(frame: &mut Frame, app: &App, area: Rect) {
    let height = if app.auth_error.is_some() { 17 } else { 15 };
    let box_area = centered_rect_fixed(FORM_WIDTH, height, area);
    frame.render_widget(Clear, box_area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));
    lines.push(field_line(
        "Name",
        &app.form_name,
        app.auth_focus == AuthFocus::Name,
        false,
    ));
    lines.push(Line::from(""));
    lines.push(field_line(
        "Email",
        &app.form_email,
        app.auth_focus == AuthFocus::Email,
        false,
    ));
    lines.push(Line::from(""));
    lines.push(field_line(
        "Password",
        &app.form_password,
        app.auth_focus == AuthFocus::Password,
        true,
    ));
    lines.push(Line::from(""));
    lines.push(button_line(
        "[ Create account ]",
        app.auth_focus == AuthFocus::Button,
    ));

    if let Some(ref err) = app.auth_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", truncate_string(err, FORM_WIDTH as usize - 4)),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " [Tab] next field  [Ctrl+R] back to sign in",
        styles::muted_style(),
    )));

    let block = Block::default()
        .title(" Create account ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), box_area);
}

fn logo_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "        T A S K L I G H T",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!("          version {}", env!("CARGO_PKG_VERSION")),
            styles::muted_style(),
        )),
    ]
}

fn field_line(label: &str, value: &str, focused: bool, mask: bool) -> Line<'static> {
    let shown = if mask {
        "*".repeat(value.chars().count().min(FIELD_WIDTH))
    } else {
        truncate_string(value, FIELD_WIDTH)
    };
    let marker = if focused { "> " } else { "  " };
    let value_style = if focused {
        styles::highlight_style()
    } else {
        styles::list_item_style()
    };
    Line::from(vec![
        Span::styled(format!(" {}{:<10}", marker, label), styles::muted_style()),
        Span::styled(format!("{:<width$}", shown, width = FIELD_WIDTH), value_style),
    ])
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::muted_style()
    };
    Line::from(vec![
        Span::raw("             "),
        Span::styled(label.to_string(), style),
    ])
}
