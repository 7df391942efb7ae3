use portal_api::prelude::*;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row as TableRow, Table, Tabs, Wrap},
};

use super::app::{App, InputMode, Route};

const HELP_TEXT: &[(&str, &str)] = &[
    ("Tab / 1 / 2", "Switch page"),
    ("j / Down", "Move down"),
    ("k / Up", "Move up"),
    ("PgDn / PgUp", "Page down / up"),
    ("g / G", "Jump to first / last"),
    ("Enter", "Open selection / retry"),
    ("b / Backspace", "Back to list"),
    ("/", "Search (applied as you type)"),
    ("Ctrl-a/e/k", "In input: start/end/kill-to-eol"),
    ("Esc", "Clear search / dismiss"),
    ("d", "Download CSV of open dataset"),
    ("r", "Reload catalog"),
    ("?", "Toggle help"),
    ("q", "Quit"),
];

const PRODUCT_TITLE: &str = " Data Portal ";

pub fn draw(frame: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_nav_bar(frame, app, outer[0]);
    match (app.route, listing(app)) {
        (Route::Data, true) => draw_dataset_list(frame, app, outer[1]),
        (Route::Data, false) => draw_dataset_detail(frame, app, outer[1]),
        (Route::Api, true) => draw_api_list(frame, app, outer[1]),
        (Route::Api, false) => draw_api_detail(frame, app, outer[1]),
    }
    draw_footer(frame, app, outer[2]);

    if app.show_help {
        draw_help_overlay(frame, frame.area());
    }
}

fn listing(app: &App) -> bool {
    match app.route {
        Route::Data => app.data.selection().is_listing(),
        Route::Api => app.api.selection().is_listing(),
    }
}

fn highlight() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn bordered(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Cyan))
}

fn draw_nav_bar(frame: &mut Frame, app: &App, area: Rect) {
    #[allow(clippy::cast_possible_truncation)]
    let title_width = PRODUCT_TITLE.len() as u16;
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(title_width + 1), Constraint::Min(10)])
        .split(area);

    let bar_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let title = Paragraph::new(PRODUCT_TITLE).style(bar_style.add_modifier(Modifier::BOLD));
    frame.render_widget(title, parts[0]);

    let tabs = Tabs::new(Route::ALL.iter().map(|route| route.title()))
        .select(app.route.index())
        .style(bar_style)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, parts[1]);
}

/// List title with a match count while a query is active
fn list_title(name: &str, shown: usize, total: usize, loading: bool) -> String {
    if loading && total == 0 {
        format!(" {name} (loading…) ")
    } else if shown == total {
        format!(" {name} ({total}) ")
    } else {
        format!(" {name} ({shown}/{total}) ")
    }
}

fn draw_dataset_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(44), Constraint::Percentage(56)])
        .split(area);

    let items = app.data.filtered_catalog();
    let title = list_title(
        "Datasets",
        items.len(),
        app.data.catalog().len(),
        app.data.is_catalog_loading(),
    );
    let rows: Vec<TableRow> = items
        .iter()
        .map(|item| TableRow::new([item.label.clone()]))
        .collect();

    let table = Table::new(rows, [Constraint::Min(16)])
        .header(TableRow::new(["Dataset"]).style(header_style()))
        .block(bordered(title))
        .row_highlight_style(highlight())
        .highlight_symbol("> ");
    frame.render_stateful_widget(table, columns[0], &mut app.data_view.list);

    let hint = Paragraph::new(vec![
        Line::from(""),
        Line::from("  Select a dataset to preview its first rows."),
        Line::from(""),
        Line::from("  Enter opens the preview, / filters the list."),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(hint, columns[1]);
}

fn draw_dataset_detail(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(item) = app.data.selected() else {
        return;
    };
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(area);

    let preview = app.data.detail().detail();
    let shown = preview.map_or(0, |p| p.filtered_rows(app.data.query(), &app.formatter).len());
    let mut summary = vec![Span::styled("Columns: ", header_style())];
    summary.push(Span::raw(preview.map_or(0, |p| p.columns.len()).to_string()));
    summary.push(Span::styled("   Rows shown: ", header_style()));
    summary.push(Span::raw(shown.to_string()));
    summary.push(Span::styled("   Object: ", header_style()));
    summary.push(Span::raw(item.key.clone()));

    let heading = Paragraph::new(vec![
        Line::from(Span::styled(
            item.label.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Preview (top {PREVIEW_ROW_LIMIT})")),
        Line::from(summary),
    ])
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(heading, sections[0]);

    let body = sections[1];
    match app.data.detail() {
        DetailState::Idle => {}
        DetailState::Loading => draw_message(frame, body, "Loading preview…", Color::Yellow),
        DetailState::Failed(message) => {
            let text = format!("Error loading preview: {message}\n\nPress Enter to retry.");
            draw_message(frame, body, &text, Color::Red);
        }
        DetailState::Ready(preview) if preview.columns.is_empty() => {
            draw_message(frame, body, "No rows returned.", Color::DarkGray);
        }
        DetailState::Ready(preview) => {
            let rows: Vec<TableRow> = preview
                .filtered_rows(app.data.query(), &app.formatter)
                .into_iter()
                .map(|row| TableRow::new(preview.cells(row, &app.formatter)))
                .collect();
            let widths = vec![Constraint::Fill(1); preview.columns.len()];
            let header = TableRow::new(preview.columns.iter().map(|c| Cell::from(c.clone())))
                .style(header_style());
            let table = Table::new(rows, widths)
                .header(header)
                .block(bordered(format!(" {} ", item.key)))
                .row_highlight_style(highlight())
                .highlight_symbol("> ");
            frame.render_stateful_widget(table, body, &mut app.data_view.detail);
        }
    }
}

fn draw_api_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let apis = app.api.filtered_catalog();
    let title = list_title("APIs", apis.len(), app.api.catalog().len(), false);
    let rows: Vec<TableRow> = apis
        .iter()
        .map(|spec| TableRow::new([spec.label.clone(), spec.url.clone()]))
        .collect();

    let table = Table::new(rows, [Constraint::Length(16), Constraint::Min(16)])
        .header(TableRow::new(["API", "Document"]).style(header_style()))
        .block(bordered(title))
        .row_highlight_style(highlight())
        .highlight_symbol("> ");
    frame.render_stateful_widget(table, area, &mut app.api_view.list);
}

fn draw_api_detail(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(spec) = app.api.selected() else {
        return;
    };
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    let document = app.api.detail().detail();
    let mut lines = vec![Line::from(Span::styled(
        format!("Data Portal API – {}", spec.label),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))];
    if let Some(doc) = document {
        let version = doc.version.as_deref().unwrap_or("");
        lines.push(Line::from(format!("{} {version}", doc.title)));
        if let Some(description) = &doc.description {
            lines.push(Line::from(Span::styled(
                description.clone(),
                Style::default().fg(Color::DarkGray),
            )));
        }
    } else {
        lines.push(Line::from(Span::styled(
            spec.url.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    let heading = Paragraph::new(lines).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(heading, sections[0]);

    let body = sections[1];
    match app.api.detail() {
        DetailState::Idle => {}
        DetailState::Loading => draw_message(frame, body, "Loading specification…", Color::Yellow),
        DetailState::Failed(message) => {
            let text = format!("Error loading specification: {message}\n\nPress Enter to retry.");
            draw_message(frame, body, &text, Color::Red);
        }
        DetailState::Ready(doc) => {
            let operations = filter_items(&doc.operations, app.api.query());
            let title = list_title("Operations", operations.len(), doc.operations.len(), false);
            let rows: Vec<TableRow> = operations
                .iter()
                .map(|op| {
                    TableRow::new([
                        Cell::from(Span::styled(op.method.clone(), method_style(&op.method))),
                        Cell::from(op.path.clone()),
                        Cell::from(op.summary.clone().unwrap_or_default()),
                        Cell::from(op.tags.join(", ")),
                    ])
                })
                .collect();
            let widths = [
                Constraint::Length(8),
                Constraint::Percentage(40),
                Constraint::Min(16),
                Constraint::Length(12),
            ];
            let table = Table::new(rows, widths)
                .header(TableRow::new(["Method", "Path", "Summary", "Tags"]).style(header_style()))
                .block(bordered(title))
                .row_highlight_style(highlight())
                .highlight_symbol("> ");
            frame.render_stateful_widget(table, body, &mut app.api_view.detail);
        }
    }
}

fn method_style(method: &str) -> Style {
    let color = match method {
        "GET" => Color::LightBlue,
        "POST" => Color::LightGreen,
        "PUT" | "PATCH" => Color::Yellow,
        "DELETE" => Color::LightRed,
        _ => Color::Gray,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn draw_message(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(paragraph, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let prefix = "Search: ";
    let text = if app.input_mode == InputMode::Query {
        format!("{prefix}{}", app.current_query())
    } else if let Some(status) = &app.status_message {
        status.clone()
    } else if !app.current_query().is_empty() {
        format!(" search=\"{}\"  Esc:clear  /:edit  ?:help  q:quit", app.current_query())
    } else if listing(app) {
        " j/k:move  Enter:open  /:search  Tab:page  r:reload  ?:help  q:quit".to_string()
    } else if app.route == Route::Data {
        " j/k:move  /:search rows  d:download  b:back  Tab:page  ?:help  q:quit".to_string()
    } else {
        " j/k:move  /:search operations  b:back  Tab:page  ?:help  q:quit".to_string()
    };
    let style = if app.input_mode == InputMode::None {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Yellow)
    };
    frame.render_widget(Paragraph::new(text).style(style), area);

    if app.input_mode != InputMode::None {
        let query = app.current_query();
        let chars_before_cursor = query[..app.input_cursor.min(query.len())].chars().count();
        #[allow(clippy::cast_possible_truncation)]
        let cursor_x = area.x + (prefix.len() + chars_before_cursor) as u16;
        if cursor_x < area.x + area.width {
            frame.set_cursor_position((cursor_x, area.y));
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 56u16.min(area.width.saturating_sub(4));
    let height = (HELP_TEXT.len() as u16 + 4).min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let popup_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = HELP_TEXT
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(
                    format!("  {key:<18}"),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(*desc),
            ])
        })
        .collect();

    let help = Paragraph::new(lines).block(bordered(" Keybindings ".to_string()));
    frame.render_widget(help, popup_area);
}
