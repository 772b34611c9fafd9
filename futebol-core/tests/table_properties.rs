//! Property tests for the tabular view.
//!
//! 1. Pages concatenate back to the filtered+sorted sequence
//! 2. Page count is ceil(filtered / page size)
//! 3. Filtering preserves order and is idempotent
//! 4. Numeric sort orders by value, stable on ties

use proptest::prelude::*;

use futebol_core::api::{PredClass, PredictionRow};
use futebol_core::table::{
    filter_rows, total_pages, CellValue, Column, SortDirection, TableRow, TableState,
};

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: usize,
    team: String,
    score: f64,
}

impl TableRow for Row {
    fn field(&self, key: &str) -> CellValue {
        match key {
            "id" => CellValue::Number(self.id as f64),
            "team" => CellValue::Text(self.team.clone()),
            "score" => CellValue::Number(self.score),
            _ => CellValue::Empty,
        }
    }
}

fn columns() -> Vec<Column<Row>> {
    vec![
        Column::new("team", "Team").sortable(),
        Column::new("score", "Score").sortable(),
    ]
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(("[a-dA-D]{1,4}", 0u8..20), 0..80).prop_map(|v| {
        v.into_iter()
            .enumerate()
            .map(|(id, (team, score))| Row {
                id,
                team,
                score: f64::from(score),
            })
            .collect()
    })
}

fn ids(rows: &[&Row]) -> Vec<usize> {
    rows.iter().map(|r| r.id).collect()
}

// ── 1-2. Pagination ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn pages_concatenate_to_full_sequence(
        rows in arb_rows(),
        page_size in 1usize..15,
        query in "[a-d]{0,2}",
        sort_score in any::<bool>(),
    ) {
        let cols = columns();
        let mut state = TableState::new(page_size);
        state.set_query(query);
        if sort_score {
            state.toggle_sort(&cols, "score");
        }
        let expected = ids(&state.apply(&rows, &cols));

        let first = state.view(&rows, &cols);
        prop_assert_eq!(first.total_pages, total_pages(expected.len(), page_size));
        prop_assert_eq!(first.total_pages, expected.len().div_ceil(page_size));

        let mut seen = ids(&first.rows);
        while state.next_page(expected.len()) {
            let view = state.view(&rows, &cols);
            prop_assert!(!view.rows.is_empty());
            prop_assert!(view.rows.len() <= page_size);
            seen.extend(ids(&view.rows));
        }
        prop_assert_eq!(seen, expected);
        prop_assert!(!state.next_page(first.filtered_len));
    }

    #[test]
    fn prev_is_rejected_on_first_page(rows in arb_rows()) {
        let mut state = TableState::new(5);
        prop_assert!(!state.prev_page());
        prop_assert_eq!(state.page(), 0);
        if state.next_page(rows.len()) {
            prop_assert!(state.prev_page());
            prop_assert_eq!(state.page(), 0);
        }
    }
}

// ── 3. Filtering ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn filter_preserves_order_and_is_idempotent(rows in arb_rows(), query in "[a-dA-D]{0,3}") {
        let once = filter_rows(&rows, &["team"], &query);
        let ids_once = ids(&once);
        prop_assert!(ids_once.windows(2).all(|w| w[0] < w[1]));

        let owned: Vec<Row> = once.iter().map(|r| (*r).clone()).collect();
        let twice = filter_rows(&owned, &["team"], &query);
        prop_assert_eq!(ids(&twice), ids_once);

        let needle = query.to_lowercase();
        for r in &once {
            prop_assert!(r.team.to_lowercase().contains(&needle));
        }
    }

    #[test]
    fn empty_query_is_identity(rows in arb_rows()) {
        let all = filter_rows(&rows, &["team", "score"], "");
        prop_assert_eq!(all.len(), rows.len());
    }
}

// ── 4. Sorting ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn numeric_sort_is_ordered_and_stable(rows in arb_rows()) {
        let cols = columns();
        let mut state = TableState::default();
        state.toggle_sort(&cols, "score");
        let sorted = state.apply(&rows, &cols);
        for w in sorted.windows(2) {
            prop_assert!(w[0].score <= w[1].score);
            if w[0].score == w[1].score {
                prop_assert!(w[0].id < w[1].id);
            }
        }

        state.toggle_sort(&cols, "score");
        prop_assert_eq!(state.sort().map(|s| s.direction), Some(SortDirection::Descending));
        let desc = state.apply(&rows, &cols);
        for w in desc.windows(2) {
            prop_assert!(w[0].score >= w[1].score);
        }
    }
}

#[test]
fn prediction_rows_sort_by_probability() {
    let mk = |home: &str, p: f64| PredictionRow {
        date: "2025-01-01".into(),
        league: "Serie A".into(),
        season: 2024,
        home_team: home.into(),
        away_team: "X".into(),
        prob_home: p,
        prob_draw: 0.3,
        prob_away: 0.7 - p,
        pred_class: PredClass::Home,
    };
    let rows = vec![mk("Juventus", 0.41), mk("Inter Milan", 0.09), mk("Napoli", 0.4)];
    let cols: Vec<Column<PredictionRow>> = vec![Column::new("prob_home", "P(H)").sortable()];
    let mut state = TableState::default();
    state.toggle_sort(&cols, "prob_home");
    let order: Vec<&str> = state
        .apply(&rows, &cols)
        .iter()
        .map(|r| r.home_team.as_str())
        .collect();
    assert_eq!(order, vec!["Inter Milan", "Napoli", "Juventus"]);
}
