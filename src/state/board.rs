//! Jeopardy board generation: category grouping and ordering, per-category
//! difficulty sort, row clamping with auto-expansion, and linear point
//! scaling by row depth.
//!
//! Layout is pure data; presentation formatting lives in `scoring`.

use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};

use crate::types::OrderingPolicy;

use super::store::QuestionStore;

/// Inputs to a board build
#[derive(Debug, Clone)]
pub struct BoardRequest {
    pub ordering: OrderingPolicy,
    /// Rows the presenter asked for
    pub requested_rows: usize,
    /// `max_available_rows` from the previous build (0 for a first build)
    pub previous_max_rows: usize,
    /// Base points for row scaling (the L1 value)
    pub base_points: u32,
    pub use_point_values: bool,
}

/// A playable cell: one question at (row, category)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCell {
    pub question_index: usize,
    pub points: u32,
    pub used: bool,
}

/// Computed board. `cells[row][column]` is `None` where the category has run
/// out of questions (an inert placeholder downstream).
#[derive(Debug, Clone)]
pub struct BoardLayout {
    pub categories: Vec<String>,
    pub rows: usize,
    pub max_available_rows: usize,
    /// The possibly auto-expanded row request the session should keep
    pub effective_requested_rows: usize,
    pub cells: Vec<Vec<Option<BoardCell>>>,
}

impl BoardLayout {
    pub fn cell(&self, row: usize, column: usize) -> Option<&BoardCell> {
        self.cells.get(row).and_then(|r| r.get(column)).and_then(Option::as_ref)
    }
}

/// Largest category size in the store; the ceiling for row requests
pub fn max_available_rows(store: &QuestionStore) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for q in store.questions() {
        *counts.entry(q.category.as_str()).or_default() += 1;
    }
    counts.values().copied().max().unwrap_or(0)
}

pub fn build(store: &QuestionStore, used: &HashSet<usize>, request: &BoardRequest) -> BoardLayout {
    // Group by category, remembering first-appearance order
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    let mut appearance_order: Vec<String> = Vec::new();
    for (index, q) in store.questions().iter().enumerate() {
        let entry = groups.entry(q.category.clone()).or_default();
        if entry.is_empty() {
            appearance_order.push(q.category.clone());
        }
        entry.push(index);
    }

    let mut categories = appearance_order;
    if request.ordering == OrderingPolicy::Randomized {
        categories.shuffle(&mut rand::rng());
    }

    // Difficulty sort always applies, id as tiebreak; a category-local
    // shuffle replaces it only under the randomized policy
    for indices in groups.values_mut() {
        indices.sort_by_key(|&i| {
            store
                .get(i)
                .map(|q| (q.difficulty.level(), q.question_id))
                .unwrap_or((u32::MAX, u64::MAX))
        });
        if request.ordering == OrderingPolicy::Randomized {
            indices.shuffle(&mut rand::rng());
        }
    }

    let max_rows = categories
        .iter()
        .map(|c| groups.get(c).map(Vec::len).unwrap_or(0))
        .max()
        .unwrap_or(0);

    // Clamp, then auto-expand: follow growth from imports when the previous
    // request sat at the old ceiling or the floor, but respect an explicit
    // narrower choice otherwise
    let mut requested = request.requested_rows.min(max_rows);
    if requested >= request.previous_max_rows
        || requested <= 1
        || max_rows > request.previous_max_rows
    {
        requested = max_rows;
    }
    let rows = if requested > 0 { requested } else { max_rows };

    let mut cells: Vec<Vec<Option<BoardCell>>> = Vec::with_capacity(rows);
    for row in 0..rows {
        let points = if request.use_point_values {
            request.base_points * (row as u32 + 1)
        } else {
            1
        };
        let row_cells = categories
            .iter()
            .map(|category| {
                groups
                    .get(category)
                    .and_then(|indices| indices.get(row))
                    .map(|&question_index| BoardCell {
                        question_index,
                        points,
                        used: used.contains(&question_index),
                    })
            })
            .collect();
        cells.push(row_cells);
    }

    BoardLayout {
        categories,
        rows,
        max_available_rows: max_rows,
        effective_requested_rows: requested,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{sample_questions, RawQuestion};

    fn store_with_sizes(sizes: &[usize]) -> QuestionStore {
        let mut store = QuestionStore::new();
        let mut batch = Vec::new();
        for (c, &size) in sizes.iter().enumerate() {
            for i in 0..size {
                batch.push(RawQuestion {
                    category: Some(format!("Cat{}", c)),
                    question: Some(format!("Question {}-{}", c, i)),
                    answers: vec![format!("Answer {}-{}", c, i)],
                    difficulty: Some(format!("L{}", i + 1)),
                    ..Default::default()
                });
            }
        }
        store.add_batch(batch);
        store
    }

    fn request(requested: usize, previous_max: usize) -> BoardRequest {
        BoardRequest {
            ordering: OrderingPolicy::Ordered,
            requested_rows: requested,
            previous_max_rows: previous_max,
            base_points: 100,
            use_point_values: true,
        }
    }

    #[test]
    fn max_rows_is_largest_category() {
        let store = store_with_sizes(&[3, 5, 2]);
        assert_eq!(max_available_rows(&store), 5);
    }

    #[test]
    fn requested_rows_clamp_to_available() {
        let store = store_with_sizes(&[3, 5, 2]);
        let layout = build(&store, &HashSet::new(), &request(10, 5));
        assert_eq!(layout.max_available_rows, 5);
        assert_eq!(layout.rows, 5);
    }

    #[test]
    fn request_at_previous_max_follows_growth() {
        let store = store_with_sizes(&[3, 7, 2]);
        // Presenter sat at the old ceiling of 5; board grew to 7
        let layout = build(&store, &HashSet::new(), &request(5, 5));
        assert_eq!(layout.rows, 7);
        assert_eq!(layout.effective_requested_rows, 7);
    }

    #[test]
    fn narrower_explicit_choice_is_respected() {
        let store = store_with_sizes(&[3, 5, 2]);
        let layout = build(&store, &HashSet::new(), &request(3, 5));
        assert_eq!(layout.rows, 3);
        assert_eq!(layout.effective_requested_rows, 3);
    }

    #[test]
    fn floor_request_expands_to_max() {
        let store = store_with_sizes(&[3, 5, 2]);
        let layout = build(&store, &HashSet::new(), &request(1, 5));
        assert_eq!(layout.rows, 5);
    }

    #[test]
    fn row_points_scale_linearly() {
        let store = store_with_sizes(&[3]);
        let layout = build(&store, &HashSet::new(), &request(3, 3));

        for row in 0..3 {
            let cell = layout.cell(row, 0).unwrap();
            assert_eq!(cell.points, 100 * (row as u32 + 1));
        }
    }

    #[test]
    fn flat_points_when_disabled() {
        let store = store_with_sizes(&[3]);
        let mut req = request(3, 3);
        req.use_point_values = false;
        let layout = build(&store, &HashSet::new(), &req);
        assert!(layout.cells.iter().flatten().flatten().all(|c| c.points == 1));
    }

    #[test]
    fn short_categories_get_placeholders() {
        let store = store_with_sizes(&[3, 5, 2]);
        let layout = build(&store, &HashSet::new(), &request(5, 5));

        assert_eq!(layout.categories.len(), 3);
        // Cat2 has 2 questions; rows 2..5 are placeholders
        assert!(layout.cell(1, 2).is_some());
        assert!(layout.cell(2, 2).is_none());
        assert!(layout.cell(4, 2).is_none());
    }

    #[test]
    fn ordered_categories_keep_first_appearance_order() {
        let store = store_with_sizes(&[2, 2, 2]);
        let layout = build(&store, &HashSet::new(), &request(2, 2));
        assert_eq!(layout.categories, vec!["Cat0", "Cat1", "Cat2"]);
    }

    #[test]
    fn rows_sort_by_difficulty_then_id() {
        let mut store = QuestionStore::new();
        store.add_batch(vec![
            RawQuestion {
                category: Some("Mixed".to_string()),
                question: Some("Deep".to_string()),
                answers: vec!["a".to_string()],
                difficulty: Some("L2".to_string()),
                ..Default::default()
            },
            RawQuestion {
                category: Some("Mixed".to_string()),
                question: Some("Shallow".to_string()),
                answers: vec!["b".to_string()],
                difficulty: Some("L1".to_string()),
                ..Default::default()
            },
        ]);

        let layout = build(&store, &HashSet::new(), &request(2, 2));
        let top = layout.cell(0, 0).unwrap();
        assert_eq!(store.get(top.question_index).unwrap().text, "Shallow");
    }

    #[test]
    fn used_questions_flag_their_cells() {
        let store = store_with_sizes(&[2]);
        let mut used = HashSet::new();
        used.insert(0);

        let layout = build(&store, &used, &request(2, 2));
        let flags: Vec<bool> = (0..2)
            .map(|row| layout.cell(row, 0).unwrap().used)
            .collect();
        assert_eq!(flags.iter().filter(|&&u| u).count(), 1);
    }

    #[test]
    fn sample_set_builds_full_four_by_four() {
        let mut store = QuestionStore::new();
        store.add_batch(sample_questions());

        let layout = build(&store, &HashSet::new(), &request(5, 5));
        assert_eq!(layout.max_available_rows, 4);
        assert_eq!(layout.rows, 4);
        assert_eq!(layout.categories.len(), 4);
        assert!(layout
            .cells
            .iter()
            .all(|row| row.iter().all(Option::is_some)));
    }

    #[test]
    fn randomized_policy_still_covers_every_question() {
        let store = store_with_sizes(&[3, 3]);
        let mut req = request(3, 3);
        req.ordering = OrderingPolicy::Randomized;

        let layout = build(&store, &HashSet::new(), &req);
        let mut seen: Vec<usize> = layout
            .cells
            .iter()
            .flatten()
            .flatten()
            .map(|c| c.question_index)
            .collect();
        seen.sort();
        assert_eq!(seen, (0..6).collect::<Vec<_>>());
    }
}
