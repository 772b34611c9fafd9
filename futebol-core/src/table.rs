//! Generic tabular view: search, sort, pagination and row copy over any row type.
//!
//! Rows are only read through [`TableRow::field`]. Each render runs:
//!
//! 1. **Filter**: keep rows where any search field contains the query
//!    (case-insensitive substring). Empty query keeps everything.
//! 2. **Sort**: at most one key; numeric when both sides are numbers,
//!    otherwise case-sensitive string order. Stable.
//! 3. **Paginate**: fixed-size slices of the filtered+sorted sequence.

use std::cmp::Ordering;
use std::fmt;
use std::time::{Duration, Instant};

use crate::api::{BacktestFold, MatchRecord, PredictionRow};

/// How long a "copied" acknowledgement stays visible.
pub const COPY_ACK_DURATION: Duration = Duration::from_secs(2);

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Placeholder shown when no row survives the filter.
pub const EMPTY_PLACEHOLDER: &str = "No results.";

// ─── Cells and rows ─────────────────────────────────────────────────

/// A single field value as seen by the table engine.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Order two values: numerically when both are numbers, else by display string.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            _ => self.to_string().cmp(&other.to_string()),
        }
    }

    fn contains_lowercase(&self, needle_lower: &str) -> bool {
        self.to_string().to_lowercase().contains(needle_lower)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<u32> for CellValue {
    fn from(v: u32) -> Self {
        CellValue::Number(f64::from(v))
    }
}

impl From<u16> for CellValue {
    fn from(v: u16) -> Self {
        CellValue::Number(f64::from(v))
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<&String> for CellValue {
    fn from(v: &String) -> Self {
        CellValue::Text(v.clone())
    }
}

/// Keyed field access for anything shown in a table.
pub trait TableRow {
    /// Value of `key`, or [`CellValue::Empty`] for unknown keys.
    fn field(&self, key: &str) -> CellValue;
}

// ─── Columns ────────────────────────────────────────────────────────

/// Column descriptor: which field to show, under what header, and how.
pub struct Column<R> {
    pub key: String,
    pub header: String,
    pub render: Option<fn(&R) -> String>,
    pub sortable: bool,
    pub searchable: bool,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            render: self.render,
            sortable: self.sortable,
            searchable: self.searchable,
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("custom_render", &self.render.is_some())
            .field("sortable", &self.sortable)
            .field("searchable", &self.searchable)
            .finish()
    }
}

impl<R> Column<R> {
    /// A plain, unsortable, searchable column.
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            render: None,
            sortable: false,
            searchable: true,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn unsearchable(mut self) -> Self {
        self.searchable = false;
        self
    }

    pub fn render_with(mut self, render: fn(&R) -> String) -> Self {
        self.render = Some(render);
        self
    }
}

impl<R: TableRow> Column<R> {
    /// Display text of this column for `row`.
    pub fn cell(&self, row: &R) -> String {
        match self.render {
            Some(render) => render(row),
            None => row.field(&self.key).to_string(),
        }
    }
}

// ─── Pure transforms ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

/// Rows where any of `keys` contains `query`, case-insensitively, in input order.
pub fn filter_rows<'a, R: TableRow, K: AsRef<str>>(
    rows: &'a [R],
    keys: &[K],
    query: &str,
) -> Vec<&'a R> {
    if query.is_empty() {
        return rows.iter().collect();
    }
    let needle = query.to_lowercase();
    rows.iter()
        .filter(|row| {
            keys.iter()
                .any(|k| row.field(k.as_ref()).contains_lowercase(&needle))
        })
        .collect()
}

/// Stable in-place sort by one field.
pub fn sort_rows<R: TableRow>(rows: &mut [&R], spec: &SortSpec) {
    rows.sort_by(|a, b| {
        let ord = a.field(&spec.key).compare(&b.field(&spec.key));
        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// Number of pages needed for `count` rows: `ceil(count / page_size)`.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// "Header: value" lines for one row, in column order.
pub fn row_text<R: TableRow>(row: &R, columns: &[Column<R>]) -> String {
    columns
        .iter()
        .map(|col| format!("{}: {}", col.header, row.field(&col.key)))
        .collect::<Vec<_>>()
        .join("\n")
}

// ─── Clipboard seam ─────────────────────────────────────────────────

/// Destination for the row-copy side effect.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String>;
}

// ─── Stateful view ──────────────────────────────────────────────────

/// One rendered page of a table.
#[derive(Debug)]
pub struct TableView<'a, R> {
    /// Rows on the current page.
    pub rows: Vec<&'a R>,
    /// Row count after filtering.
    pub filtered_len: usize,
    /// Zero-based page actually shown (clamped to the last page).
    pub page: usize,
    pub total_pages: usize,
    /// Index of `rows[0]` within the filtered+sorted sequence.
    pub offset: usize,
}

impl<R> TableView<'_, R> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    /// One-based inclusive range label such as `11-20 of 42`.
    pub fn range_label(&self) -> String {
        if self.rows.is_empty() {
            return format!("0 of {}", self.filtered_len);
        }
        format!(
            "{}-{} of {}",
            self.offset + 1,
            self.offset + self.rows.len(),
            self.filtered_len
        )
    }
}

#[derive(Debug, Clone)]
struct CopyAck {
    index: usize,
    at: Instant,
}

/// Interaction state of one table: query, sort, page, cursor, copy ack.
#[derive(Debug, Clone)]
pub struct TableState {
    query: String,
    search_keys: Option<Vec<String>>,
    sort: Option<SortSpec>,
    page: usize,
    page_size: usize,
    cursor: usize,
    focused_column: usize,
    copied: Option<CopyAck>,
}

impl Default for TableState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl TableState {
    pub fn new(page_size: usize) -> Self {
        Self {
            query: String::new(),
            search_keys: None,
            sort: None,
            page: 0,
            page_size: page_size.max(1),
            cursor: 0,
            focused_column: 0,
            copied: None,
        }
    }

    /// Restrict search to these fields instead of the searchable columns.
    pub fn with_search_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn focused_column(&self) -> usize {
        self.focused_column
    }

    /// Replace the search query; always returns to the first page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 0;
        self.cursor = 0;
    }

    /// Back to page 0 with no selection; used when the underlying rows are replaced.
    pub fn reset_position(&mut self) {
        self.page = 0;
        self.cursor = 0;
        self.copied = None;
    }

    /// Select `key` as sort column: same key toggles direction, a new key
    /// starts ascending. Unknown or unsortable keys are ignored (returns false).
    pub fn toggle_sort<R>(&mut self, columns: &[Column<R>], key: &str) -> bool {
        let sortable = columns.iter().any(|c| c.key == key && c.sortable);
        if !sortable {
            return false;
        }
        self.sort = match self.sort.take() {
            Some(spec) if spec.key == key => Some(SortSpec {
                key: spec.key,
                direction: spec.direction.toggled(),
            }),
            _ => Some(SortSpec {
                key: key.to_string(),
                direction: SortDirection::Ascending,
            }),
        };
        true
    }

    /// Sort by the column under the column cursor.
    pub fn toggle_sort_focused<R>(&mut self, columns: &[Column<R>]) -> bool {
        match columns.get(self.focused_column) {
            Some(col) => {
                let key = col.key.clone();
                self.toggle_sort(columns, &key)
            }
            None => false,
        }
    }

    pub fn focus_next_column(&mut self, column_count: usize) {
        if self.focused_column + 1 < column_count {
            self.focused_column += 1;
        }
    }

    pub fn focus_prev_column(&mut self) {
        self.focused_column = self.focused_column.saturating_sub(1);
    }

    /// Filtered and sorted rows (all pages).
    pub fn apply<'a, R: TableRow>(&self, rows: &'a [R], columns: &[Column<R>]) -> Vec<&'a R> {
        self.apply_with(rows, columns, |_| true)
    }

    /// Like [`apply`](Self::apply), with an extra predicate applied after the
    /// text search (e.g. a league selector).
    pub fn apply_with<'a, R: TableRow>(
        &self,
        rows: &'a [R],
        columns: &[Column<R>],
        keep: impl Fn(&R) -> bool,
    ) -> Vec<&'a R> {
        let mut out = match &self.search_keys {
            Some(keys) => filter_rows(rows, keys, &self.query),
            None => {
                let keys: Vec<&str> = columns
                    .iter()
                    .filter(|c| c.searchable)
                    .map(|c| c.key.as_str())
                    .collect();
                filter_rows(rows, &keys, &self.query)
            }
        };
        out.retain(|row| keep(*row));
        if let Some(spec) = &self.sort {
            sort_rows(&mut out, spec);
        }
        out
    }

    /// The current page of `rows`.
    pub fn view<'a, R: TableRow>(&self, rows: &'a [R], columns: &[Column<R>]) -> TableView<'a, R> {
        self.view_with(rows, columns, |_| true)
    }

    pub fn view_with<'a, R: TableRow>(
        &self,
        rows: &'a [R],
        columns: &[Column<R>],
        keep: impl Fn(&R) -> bool,
    ) -> TableView<'a, R> {
        let all = self.apply_with(rows, columns, keep);
        let filtered_len = all.len();
        let pages = total_pages(filtered_len, self.page_size);
        let page = self.page.min(pages.saturating_sub(1));
        let offset = page * self.page_size;
        let rows = all
            .into_iter()
            .skip(offset)
            .take(self.page_size)
            .collect();
        TableView {
            rows,
            filtered_len,
            page,
            total_pages: pages,
            offset,
        }
    }

    /// Advance one page. Rejected (false) on the last page.
    pub fn next_page(&mut self, filtered_len: usize) -> bool {
        if self.page + 1 >= total_pages(filtered_len, self.page_size) {
            return false;
        }
        self.page += 1;
        self.cursor = 0;
        true
    }

    /// Go back one page. Rejected (false) on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.page == 0 {
            return false;
        }
        self.page -= 1;
        self.cursor = 0;
        true
    }

    pub fn cursor_down(&mut self, page_len: usize) {
        if self.cursor + 1 < page_len {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Row under the cursor on the given page, if any.
    pub fn selected<'a, R>(&self, view: &TableView<'a, R>) -> Option<&'a R> {
        view.rows.get(self.cursor).copied()
    }

    /// Copy the selected row to `clipboard`. On success the row is
    /// acknowledged for [`COPY_ACK_DURATION`], replacing any earlier ack.
    pub fn copy_selected<R: TableRow>(
        &mut self,
        view: &TableView<'_, R>,
        columns: &[Column<R>],
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) -> Result<(), String> {
        let row = self
            .selected(view)
            .ok_or_else(|| "no row selected".to_string())?;
        clipboard.set_text(&row_text(row, columns))?;
        self.copied = Some(CopyAck {
            index: view.offset + self.cursor,
            at: now,
        });
        Ok(())
    }

    /// Absolute index of the row whose copy is still being acknowledged.
    pub fn acknowledged(&self, now: Instant) -> Option<usize> {
        self.copied
            .as_ref()
            .filter(|ack| now.saturating_duration_since(ack.at) < COPY_ACK_DURATION)
            .map(|ack| ack.index)
    }
}

// ─── Domain rows ────────────────────────────────────────────────────

impl TableRow for BacktestFold {
    fn field(&self, key: &str) -> CellValue {
        match key {
            "fold" => self.fold.into(),
            "train_end" => (&self.train_end).into(),
            "test_start" => (&self.test_start).into(),
            "test_end" => (&self.test_end).into(),
            "accuracy" => self.metrics.accuracy.into(),
            "log_loss" => self.metrics.log_loss.into(),
            "brier_score" => self.metrics.brier_score.into(),
            _ => CellValue::Empty,
        }
    }
}

impl TableRow for PredictionRow {
    fn field(&self, key: &str) -> CellValue {
        match key {
            "date" => (&self.date).into(),
            "league" => (&self.league).into(),
            "season" => self.season.into(),
            "home_team" => (&self.home_team).into(),
            "away_team" => (&self.away_team).into(),
            "prob_home" => self.prob_home.into(),
            "prob_draw" => self.prob_draw.into(),
            "prob_away" => self.prob_away.into(),
            "pred_class" => self.pred_class.code().into(),
            _ => CellValue::Empty,
        }
    }
}

impl TableRow for MatchRecord {
    fn field(&self, key: &str) -> CellValue {
        match key {
            "date" => (&self.date).into(),
            "league" => (&self.league).into(),
            "season" => self.season.into(),
            "home_team" => (&self.home_team).into(),
            "away_team" => (&self.away_team).into(),
            "home_goals" => self.home_goals.into(),
            "away_goals" => self.away_goals.into(),
            _ => CellValue::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Team {
        name: &'static str,
        points: f64,
        code: &'static str,
    }

    impl TableRow for Team {
        fn field(&self, key: &str) -> CellValue {
            match key {
                "name" => self.name.into(),
                "points" => self.points.into(),
                "code" => self.code.into(),
                _ => CellValue::Empty,
            }
        }
    }

    fn teams() -> Vec<Team> {
        vec![
            Team { name: "Benfica", points: 10.0, code: "b" },
            Team { name: "Porto", points: 2.0, code: "P" },
            Team { name: "Braga", points: 7.0, code: "a" },
            Team { name: "Sporting", points: 10.0, code: "S" },
        ]
    }

    fn columns() -> Vec<Column<Team>> {
        vec![
            Column::new("name", "Team").sortable(),
            Column::new("points", "Pts").sortable(),
            Column::new("code", "Code"),
        ]
    }

    fn names(rows: &[&Team]) -> Vec<&'static str> {
        rows.iter().map(|t| t.name).collect()
    }

    #[test]
    fn empty_query_keeps_everything() {
        let rows = teams();
        let state = TableState::default();
        assert_eq!(state.apply(&rows, &columns()).len(), 4);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let rows = teams();
        let mut state = TableState::default();
        state.set_query("BR");
        assert_eq!(names(&state.apply(&rows, &columns())), vec!["Braga"]);
        state.set_query("or");
        assert_eq!(names(&state.apply(&rows, &columns())), vec!["Porto", "Sporting"]);
    }

    #[test]
    fn search_matches_numbers_by_display() {
        let rows = teams();
        let mut state = TableState::default();
        state.set_query("10");
        assert_eq!(names(&state.apply(&rows, &columns())), vec!["Benfica", "Sporting"]);
    }

    #[test]
    fn explicit_search_keys_override_columns() {
        let rows = teams();
        let mut state = TableState::default().with_search_keys(["code"]);
        state.set_query("s");
        assert_eq!(names(&state.apply(&rows, &columns())), vec!["Sporting"]);
    }

    #[test]
    fn extra_predicate_narrows_after_search() {
        let rows = teams();
        let mut state = TableState::default();
        state.set_query("o");
        let view = state.view_with(&rows, &columns(), |t| t.points > 5.0);
        assert_eq!(names(&view.rows), vec!["Sporting"]);
        assert_eq!(view.filtered_len, 1);
    }

    #[test]
    fn unsearchable_columns_are_skipped() {
        let rows = teams();
        let cols = vec![
            Column::new("points", "Pts"),
            Column::new("code", "Code").unsearchable(),
        ];
        let mut state = TableState::default();
        state.set_query("a");
        assert!(state.apply(&rows, &cols).is_empty());
    }

    #[test]
    fn changing_query_resets_page() {
        let rows: Vec<Team> = (0..25).map(|_| teams()[0].clone()).collect();
        let mut state = TableState::new(10);
        assert!(state.next_page(rows.len()));
        assert_eq!(state.page(), 1);
        state.set_query("ben");
        assert_eq!(state.page(), 0);
    }

    #[test]
    fn sort_toggle_cycle() {
        let cols = columns();
        let mut state = TableState::default();
        assert!(state.toggle_sort(&cols, "points"));
        assert_eq!(state.sort().unwrap().direction, SortDirection::Ascending);
        state.toggle_sort(&cols, "points");
        assert_eq!(state.sort().unwrap().direction, SortDirection::Descending);
        state.toggle_sort(&cols, "points");
        assert_eq!(state.sort().unwrap().direction, SortDirection::Ascending);
        state.toggle_sort(&cols, "points");
        state.toggle_sort(&cols, "name");
        let spec = state.sort().unwrap();
        assert_eq!(spec.key, "name");
        assert_eq!(spec.direction, SortDirection::Ascending);
    }

    #[test]
    fn unsortable_column_is_ignored() {
        let cols = columns();
        let mut state = TableState::default();
        assert!(!state.toggle_sort(&cols, "code"));
        assert!(!state.toggle_sort(&cols, "missing"));
        assert!(state.sort().is_none());
    }

    #[test]
    fn numeric_sort_is_stable() {
        let rows = teams();
        let cols = columns();
        let mut state = TableState::default();
        state.toggle_sort(&cols, "points");
        assert_eq!(
            names(&state.apply(&rows, &cols)),
            vec!["Porto", "Braga", "Benfica", "Sporting"]
        );
        state.toggle_sort(&cols, "points");
        assert_eq!(
            names(&state.apply(&rows, &cols)),
            vec!["Benfica", "Sporting", "Braga", "Porto"]
        );
    }

    #[test]
    fn nan_points_sort_after_numbers() {
        let mut rows = teams();
        rows[1].points = f64::NAN;
        let cols = columns();
        let mut state = TableState::default();
        state.toggle_sort(&cols, "points");
        assert_eq!(
            names(&state.apply(&rows, &cols)),
            vec!["Braga", "Benfica", "Sporting", "Porto"]
        );
        assert_eq!(
            CellValue::Number(f64::NAN).compare(&CellValue::Number(1.0)),
            Ordering::Greater
        );
    }

    #[test]
    fn text_sort_is_case_sensitive() {
        let a = CellValue::text("a");
        let upper = CellValue::text("B");
        assert_eq!(upper.compare(&a), Ordering::Less);
    }

    #[test]
    fn numbers_compare_numerically_not_lexically() {
        assert_eq!(CellValue::Number(2.0).compare(&CellValue::Number(10.0)), Ordering::Less);
        assert_eq!(CellValue::text("2").compare(&CellValue::text("10")), Ordering::Greater);
    }

    #[test]
    fn pagination_bounds() {
        let rows: Vec<Team> = (0..23).map(|i| Team { name: "T", points: i as f64, code: "c" }).collect();
        let cols = columns();
        let mut state = TableState::new(10);
        let view = state.view(&rows, &cols);
        assert_eq!(view.total_pages, 3);
        assert!(!view.has_prev());
        assert!(!state.prev_page());
        assert!(state.next_page(rows.len()));
        assert!(state.next_page(rows.len()));
        assert!(!state.next_page(rows.len()));
        let last = state.view(&rows, &cols);
        assert_eq!(last.rows.len(), 3);
        assert_eq!(last.range_label(), "21-23 of 23");
        assert!(!last.has_next());
    }

    #[test]
    fn view_clamps_stale_page() {
        let rows = teams();
        let cols = columns();
        let mut state = TableState::new(2);
        state.next_page(rows.len());
        let fewer = &rows[..1];
        let view = state.view(fewer, &cols);
        assert_eq!(view.page, 0);
        assert_eq!(view.rows.len(), 1);
    }

    #[test]
    fn empty_view() {
        let rows = teams();
        let mut state = TableState::default();
        state.set_query("zzz");
        let view = state.view(&rows, &columns());
        assert!(view.is_empty());
        assert_eq!(view.total_pages, 0);
        assert_eq!(view.range_label(), "0 of 0");
    }

    #[test]
    fn row_text_uses_headers_and_raw_values() {
        let rows = teams();
        let cols = vec![
            Column::new("name", "Team"),
            Column::new("points", "Pts").render_with(|t: &Team| format!("{} pts", t.points)),
        ];
        assert_eq!(row_text(&rows[1], &cols), "Team: Porto\nPts: 2");
    }

    struct Recorder(Vec<String>);

    impl Clipboard for Recorder {
        fn set_text(&mut self, text: &str) -> Result<(), String> {
            self.0.push(text.to_string());
            Ok(())
        }
    }

    struct Broken;

    impl Clipboard for Broken {
        fn set_text(&mut self, _text: &str) -> Result<(), String> {
            Err("no clipboard".into())
        }
    }

    #[test]
    fn copy_ack_expires_and_moves() {
        let rows = teams();
        let cols = columns();
        let mut state = TableState::default();
        let mut clip = Recorder(Vec::new());
        let t0 = Instant::now();

        let view = state.view(&rows, &cols);
        state.copy_selected(&view, &cols, &mut clip, t0).unwrap();
        assert_eq!(state.acknowledged(t0), Some(0));
        assert!(clip.0[0].starts_with("Team: Benfica"));

        state.cursor_down(view.rows.len());
        let view = state.view(&rows, &cols);
        state.copy_selected(&view, &cols, &mut clip, t0).unwrap();
        assert_eq!(state.acknowledged(t0), Some(1));
        assert_eq!(state.acknowledged(t0 + Duration::from_millis(2500)), None);
    }

    #[test]
    fn failed_copy_shows_no_ack() {
        let rows = teams();
        let cols = columns();
        let mut state = TableState::default();
        let view = state.view(&rows, &cols);
        assert!(state.copy_selected(&view, &cols, &mut Broken, Instant::now()).is_err());
        assert_eq!(state.acknowledged(Instant::now()), None);
    }
}
