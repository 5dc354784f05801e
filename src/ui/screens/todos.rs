//! The authenticated home screen: the todo list and its detail panel.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, TodoFocus};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;
use crate::utils::{relative_time, truncate_string};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_list(frame, app, chunks[0]);
    render_detail(frame, app, chunks[1]);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let todos = app.filtered_todos();

    let title = if app.search_query.is_empty() {
        Line::from(" Todos ")
    } else {
        Line::from(vec![
            Span::raw(" Todos "),
            Span::styled(format!("/{} ", app.search_query), styles::search_style()),
        ])
    };

    let items: Vec<ListItem> = todos
        .iter()
        .map(|todo| {
            let marker_style = if todo.completed {
                styles::done_style()
            } else {
                styles::muted_style()
            };
            let title_style = if todo.completed {
                styles::muted_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", todo.status_marker()), marker_style),
                Span::styled(todo.title.clone(), title_style),
            ]))
        })
        .collect();

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if items.is_empty() {
        let text = if app.refreshing {
            "Loading todos..."
        } else if app.search_query.is_empty() {
            "No todos yet - press [a] to add one"
        } else {
            "No todos match the filter"
        };
        let empty = Paragraph::new(Line::from(Span::styled(text, styles::muted_style())))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    state.select(Some(app.todo_selection.min(todos.len() - 1)));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(todo) = app.selected_todo() else {
        let empty = Paragraph::new(Line::from(Span::styled(
            "Nothing selected",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(todo.title.clone(), styles::title_style())),
        Line::from(""),
    ];

    if let Some(ref description) = todo.description {
        lines.push(Line::from(Span::styled(
            description.clone(),
            styles::list_item_style(),
        )));
        lines.push(Line::from(""));
    }

    let status = if todo.completed { "Done" } else { "Open" };
    let status_style = if todo.completed {
        styles::done_style()
    } else {
        styles::highlight_style()
    };
    lines.push(Line::from(vec![
        Span::styled("Status:  ", styles::muted_style()),
        Span::styled(status, status_style),
    ]));

    if let Some(created) = todo.created_at {
        lines.push(Line::from(vec![
            Span::styled("Created: ", styles::muted_style()),
            Span::styled(relative_time(created), styles::list_item_style()),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Overlay for creating a todo.
pub fn render_add_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(52, 10, frame.area());
    frame.render_widget(Clear, area);

    let field = |label: &str, value: &str, focused: bool| -> Line<'static> {
        let marker = if focused { "> " } else { "  " };
        let style = if focused {
            styles::highlight_style()
        } else {
            styles::list_item_style()
        };
        Line::from(vec![
            Span::styled(format!(" {}{:<13}", marker, label), styles::muted_style()),
            Span::styled(truncate_string(value, 30), style),
        ])
    };

    let lines = vec![
        Line::from(""),
        field("Title", &app.new_title, app.todo_focus == TodoFocus::Title),
        Line::from(""),
        field(
            "Description",
            &app.new_description,
            app.todo_focus == TodoFocus::Description,
        ),
        Line::from(""),
        Line::from(Span::styled(
            " [Tab] switch field  [Enter] save  [Esc] cancel",
            styles::muted_style(),
        )),
    ];

    let block = Block::default()
        .title(" New todo ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
