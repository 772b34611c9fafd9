//! Shared table widget: header with sort arrows, one page of rows,
//! pagination footer.

use std::time::Instant;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use futebol_core::table::{Column, TableRow, TableState, EMPTY_PLACEHOLDER};

use crate::theme;

/// Per-cell style hook; return `Style::default()` to keep the row style.
pub type CellStyle<'s, R> = &'s dyn Fn(&Column<R>, &R) -> Style;

/// Draw the current page of `rows` through `state`, keeping only rows
/// that pass `keep`.
pub fn render<R: TableRow>(
    f: &mut Frame,
    area: Rect,
    rows: &[R],
    cols: &[Column<R>],
    state: &TableState,
    keep: impl Fn(&R) -> bool,
    cell_style: CellStyle<'_, R>,
) {
    let view = state.view_with(rows, cols, keep);
    let copied = state.acknowledged(Instant::now());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .split(area);

    let widths: Vec<Constraint> = cols.iter().map(|_| Constraint::Fill(1)).collect();
    let header = header_row(cols, state);

    if view.is_empty() {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(chunks[0]);
        f.render_widget(Table::new(Vec::<Row>::new(), widths).header(header), parts[0]);
        let placeholder = Paragraph::new(Span::styled(EMPTY_PLACEHOLDER, theme::muted()))
            .alignment(Alignment::Center);
        f.render_widget(placeholder, parts[1]);
    } else {
        let body = view.rows.iter().enumerate().map(|(i, row)| {
            let style = if copied == Some(view.offset + i) {
                theme::positive().add_modifier(Modifier::REVERSED)
            } else if i == state.cursor() {
                theme::cursor_row()
            } else {
                theme::text()
            };
            let cells = cols.iter().map(|col| {
                Cell::from(col.cell(row)).style(cell_style(col, row))
            });
            Row::new(cells).style(style).height(1)
        });
        let table = Table::new(body, widths)
            .header(header)
            .column_spacing(1);
        f.render_widget(table, chunks[0]);
    }

    let mut footer = vec![
        Span::styled("◀ ", theme::action(view.has_prev())),
        Span::styled(
            format!("Page {}/{}", view.page + 1, view.total_pages.max(1)),
            theme::secondary(),
        ),
        Span::styled(" ▶", theme::action(view.has_next())),
        Span::styled(format!("  {}", view.range_label()), theme::muted()),
    ];
    if !state.query().is_empty() {
        footer.push(Span::styled(
            format!("  filter: \"{}\"", state.query()),
            theme::warning(),
        ));
    }
    if copied.is_some() {
        footer.push(Span::styled("  copied", theme::positive()));
    }
    f.render_widget(Paragraph::new(Line::from(footer)), chunks[1]);
}

fn header_row<R>(cols: &[Column<R>], state: &TableState) -> Row<'static> {
    let cells = cols.iter().enumerate().map(|(i, col)| {
        let arrow = state
            .sort()
            .filter(|s| s.key == col.key)
            .map(|s| format!(" {}", s.direction.arrow()))
            .unwrap_or_default();
        let mut style = theme::accent_bold();
        if i == state.focused_column() {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        Cell::from(format!("{}{arrow}", col.header)).style(style)
    });
    Row::new(cells).height(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futebol_core::table::CellValue;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    struct Club(&'static str, u32);

    impl TableRow for Club {
        fn field(&self, key: &str) -> CellValue {
            match key {
                "name" => CellValue::text(self.0),
                "points" => self.1.into(),
                _ => CellValue::Empty,
            }
        }
    }

    fn columns() -> Vec<Column<Club>> {
        vec![
            Column::new("name", "Club").sortable(),
            Column::new("points", "Pts").sortable(),
        ]
    }

    fn draw(rows: &[Club], state: &TableState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                let plain = |_: &Column<Club>, _: &Club| Style::default();
                render(f, area, rows, &columns(), state, |_: &Club| true, &plain);
            })
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn shows_rows_and_page_footer() {
        let rows = [Club("Benfica", 80), Club("Porto", 75)];
        let text = draw(&rows, &TableState::new(10));
        assert!(text.contains("Benfica"));
        assert!(text.contains("Page 1/1"));
        assert!(text.contains("1-2 of 2"));
    }

    #[test]
    fn empty_filter_shows_placeholder() {
        let rows = [Club("Benfica", 80)];
        let mut state = TableState::new(10);
        state.set_query("zzz");
        let text = draw(&rows, &state);
        assert!(text.contains(EMPTY_PLACEHOLDER));
        assert!(text.contains("Club"));
    }
}
