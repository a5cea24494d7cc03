use ratatui::{
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell as TableCell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, InputMode, TableLayout, ToastKind};
use crate::format::Cell;

const COLUMN_SPACING: u16 = 1;

// ===============================
// Top-level draw
// ===============================
pub fn draw(f: &mut Frame, app: &mut App) {
    let prompt_open = app.input_mode() != InputMode::Normal || !app.filter_query().is_empty();

    let mut constraints: Vec<Constraint> = Vec::with_capacity(4);
    constraints.push(Constraint::Length(1)); // tabs
    if prompt_open {
        constraints.push(Constraint::Length(3)); // filter / namespace prompt
    }
    constraints.push(Constraint::Min(0)); // table
    constraints.push(Constraint::Length(1)); // pagination + keys

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let mut idx = 0usize;
    header(f, chunks[idx], app);
    idx += 1;
    if prompt_open {
        prompt_bar(f, chunks[idx], app);
        idx += 1;
    }
    table(f, chunks[idx], app);
    idx += 1;
    footer(f, chunks[idx], app);

    // Overlays render last
    if app.detail().is_open() {
        detail_overlay(f, app);
    } else {
        app.set_detail_area(None);
    }
    popover(f, app);
    if app.toasts().current().is_some() {
        toast(f, app);
    }
}

// ===============================
// Header / prompt
// ===============================
fn header(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let current = app.list().resource();

    let mut spans = vec![Span::styled(
        format!(" {} ", app.list().namespace()),
        Style::default().fg(theme.header).add_modifier(Modifier::BOLD),
    )];
    for r in crate::types::Resource::ALL {
        spans.push(Span::raw(" │ "));
        if r == current {
            spans.push(Span::styled(
                r.title(),
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(r.title(), Style::default().fg(theme.text_dim)));
        }
    }
    if app.list().loading() {
        spans.push(Span::styled("  loading…", Style::default().fg(theme.text_dim)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn prompt_bar(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let mode = app.input_mode();
    let focused = mode != InputMode::Normal;
    let (title, text) = match mode {
        InputMode::Namespace => (" Namespace ", app.input()),
        InputMode::Filter => (" Filter ", app.input()),
        InputMode::Normal => (" Filter ", app.filter_query()),
    };

    let border = if focused { theme.accent } else { theme.border };
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(if focused { theme.accent } else { theme.text }))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border)),
        );
    f.render_widget(paragraph, area);

    if focused && area.width > 2 {
        let x = area.x + 1 + (text.chars().count().min(area.width.saturating_sub(2) as usize) as u16);
        f.set_cursor_position((x, area.y + 1));
    }
}

// ===============================
// Table
// ===============================
fn column_widths(headers: &[&str]) -> Vec<Constraint> {
    headers
        .iter()
        .map(|h| match *h {
            "ID" | "Author" | "Data Hash" | "Message ID" => Constraint::Length(14),
            "Created" => Constraint::Length(19),
            "Pinned" => Constraint::Length(6),
            _ => Constraint::Fill(1),
        })
        .collect()
}

fn table(f: &mut Frame, area: Rect, app: &mut App) {
    let theme = app.theme();
    let headers = app.headers();
    let rows = app.rows();
    let block = Block::default()
        .title(format!(" {} ", app.list().resource().title()))
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);

    if rows.is_empty() {
        let text = if !app.list().loaded() {
            match app.list().last_error() {
                Some(e) => format!("Could not load {}: {e}", app.list().resource()),
                None => "Loading…".to_string(),
            }
        } else {
            app.list().resource().empty_text().to_string()
        };
        let p = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.text_dim))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(p, area);
        app.set_table_layout(TableLayout::default());
        return;
    }

    let widths = column_widths(headers);
    let columns: Vec<(u16, u16)> = Layout::horizontal(widths.clone())
        .flex(Flex::Start)
        .spacing(COLUMN_SPACING)
        .split(inner)
        .iter()
        .map(|r| (r.x, r.width))
        .collect();

    let sel_row = app.sel_row();
    let sel_col = app.sel_col();
    let body_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(ri, row)| {
            let cells: Vec<TableCell> = row
                .cells
                .iter()
                .enumerate()
                .map(|(ci, cell)| {
                    let mut style = match cell {
                        Cell::Hash(_) => Style::default().fg(theme.hash),
                        Cell::Check => Style::default().fg(theme.check),
                        Cell::Empty => Style::default().fg(theme.text_dim),
                        Cell::Text(_) => Style::default().fg(theme.text),
                    };
                    if sel_row == Some(ri) && ci == sel_col {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    TableCell::from(cell.display()).style(style)
                })
                .collect();
            Row::new(cells)
        })
        .collect();

    let header_row = Row::new(headers.iter().copied())
        .style(Style::default().fg(theme.header).add_modifier(Modifier::BOLD));

    let table = Table::new(body_rows, widths)
        .header(header_row)
        .column_spacing(COLUMN_SPACING)
        .flex(Flex::Start)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(theme.selection_fg)
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD),
        );

    f.render_stateful_widget(table, area, app.table_state_mut());

    let body = Rect {
        x: inner.x,
        y: inner.y.saturating_add(1),
        width: inner.width,
        height: inner.height.saturating_sub(1),
    };
    app.set_table_layout(TableLayout { body, columns });
}

// ===============================
// Footer
// ===============================
fn footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let list = app.list();
    let q = list.query();
    let arrow = |enabled: bool, s: &'static str| {
        if enabled {
            Span::styled(s, Style::default().fg(theme.accent))
        } else {
            Span::styled(s, Style::default().fg(theme.text_dim))
        }
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" Rows per page: {} ", q.page_size),
            Style::default().fg(theme.text_dim),
        ),
        Span::styled(
            format!(" {} ", q.range_label(list.items().len())),
            Style::default().fg(theme.text),
        ),
        arrow(list.can_go_back(), " ◀"),
        arrow(list.can_advance(), " ▶ "),
        Span::styled(
            " ↑↓←→ move  ⏎ details  space hash  c copy  n/p page  s size  tab view  / filter  : ns  r refresh  q quit",
            Style::default().fg(theme.text_dim),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

// ===============================
// Overlays
// ===============================
fn centered(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
    let v = Layout::vertical([
        Constraint::Percentage((100 - pct_y) / 2),
        Constraint::Percentage(pct_y),
        Constraint::Percentage((100 - pct_y) / 2),
    ])
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - pct_x) / 2),
        Constraint::Percentage(pct_x),
        Constraint::Percentage((100 - pct_x) / 2),
    ])
    .split(v[1])[1]
}

fn detail_overlay(f: &mut Frame, app: &mut App) {
    let Some(text) = app.detail_text() else {
        app.set_detail_area(None);
        return;
    };
    let theme = app.theme();
    let area = centered(f.area(), 80, 80);
    app.set_detail_area(Some(area));
    app.set_detail_viewport_height(area.height.saturating_sub(2));

    let title = format!(
        " {} {} (esc close, c copy) ",
        app.list().resource().title(),
        app.detail().key().unwrap_or("")
    );
    let p = Paragraph::new(text)
        .style(Style::default().fg(theme.text))
        .scroll((app.detail().scroll(), 0))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(theme.accent)),
        );
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

/// Full-identifier popover, anchored above its cell (below when there is no room)
fn popover(f: &mut Frame, app: &App) {
    let Some((cell, row_idx, full)) = app.open_popover() else {
        return;
    };
    let theme = app.theme();
    let screen = f.area();
    let Some(layout) = app_layout(app) else {
        return;
    };
    let Some(&(col_x, _)) = layout.columns.get(cell.col) else {
        return;
    };
    let offset = row_idx.saturating_sub(app.table_offset());
    let row_y = layout.body.y.saturating_add(offset as u16);

    let width = (full.chars().count() as u16 + 4).clamp(20, screen.width);
    let height = 4u16;
    let y = if row_y >= screen.y + height { row_y - height } else { row_y + 1 };
    let x = col_x.min(screen.width.saturating_sub(width));
    let area = Rect { x, y, width, height }.intersection(screen);

    let body = vec![
        Line::from(Span::styled(full, Style::default().fg(theme.text))),
        Line::from(Span::styled("[c] copy  [esc] close", Style::default().fg(theme.text_dim))),
    ];
    let p = Paragraph::new(body).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.accent)),
    );
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

fn app_layout(app: &App) -> Option<&TableLayout> {
    let layout = app.table_layout();
    (!layout.columns.is_empty()).then_some(layout)
}

fn toast(f: &mut Frame, app: &App) {
    let Some((msg, kind)) = app.toasts().current() else {
        return;
    };
    let theme = app.theme();
    let color = match kind {
        ToastKind::Info => theme.toast_info,
        ToastKind::Error => theme.toast_error,
    };
    let screen = f.area();
    let width = (msg.chars().count() as u16 + 4).min(screen.width);
    let area = Rect {
        x: screen.width.saturating_sub(width) / 2,
        y: screen.height.saturating_sub(4),
        width,
        height: 3.min(screen.height),
    };
    let p = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::query::PageSizes;
    use crate::theme::Theme;
    use crate::types::{AppEvent, Page, Resource};
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn loaded_app() -> App {
        let mut app = App::new(
            "default",
            Resource::Datatypes,
            PageSizes::default(),
            30,
            Theme::Nord,
            Box::new(MemoryClipboard::default()),
        );
        let req = app.take_request().unwrap();
        let items = ["d0", "d1", "d2"]
            .iter()
            .map(|id| Resource::Datatypes.decode(json!({"id": id, "name": "widget"})).unwrap())
            .collect();
        app.on_event(AppEvent::PageLoaded {
            seq: req.seq,
            query: req.query,
            result: Ok(Page { items, total: 3 }),
        });
        app
    }

    #[test]
    fn selected_row_uses_theme_selection_colors() {
        let mut app = loaded_app();
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let theme = app.theme();
        let layout = app.table_layout().clone();
        let name_x = layout.columns[1].0;
        let buf = terminal.backend().buffer();

        let selected = &buf[(name_x, layout.body.y)];
        assert_eq!(selected.bg, theme.selection_bg);
        assert_eq!(selected.fg, theme.selection_fg);

        let other = &buf[(name_x, layout.body.y + 1)];
        assert_ne!(other.bg, theme.selection_bg);
    }

    #[test]
    fn detail_overlay_records_its_area() {
        let mut app = loaded_app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();
        assert_eq!(app.detail_area(), None);

        app.activate_row(1);
        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let area = app.detail_area().expect("overlay drawn");
        assert_eq!(area, centered(Rect::new(0, 0, 100, 30), 80, 80));

        // a click on the overlay keeps it; the backdrop closes it
        app.click(area.x + 1, area.y + 1);
        assert_eq!(app.detail().key(), Some("d1"));
        app.click(0, area.y + 1);
        assert!(!app.detail().is_open());

        terminal.draw(|f| draw(f, &mut app)).unwrap();
        assert_eq!(app.detail_area(), None);
    }
}
