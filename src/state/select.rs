//! Single-mode question selection over the used/unused partition.

use rand::seq::IndexedRandom;
use std::collections::HashSet;

use crate::types::OrderingPolicy;

use super::store::QuestionStore;

/// Pick the next unused question, or `None` when the set is exhausted.
///
/// Ordered policy returns the lowest `question_id` (store index as tiebreak),
/// giving deterministic import-order delivery. Randomized picks uniformly.
/// Selection never mutates state; marking used happens only once an answer
/// is committed.
pub fn next_question(
    store: &QuestionStore,
    used: &HashSet<usize>,
    policy: OrderingPolicy,
) -> Option<usize> {
    let unused: Vec<usize> = (0..store.len()).filter(|i| !used.contains(i)).collect();
    if unused.is_empty() {
        return None;
    }

    match policy {
        OrderingPolicy::Ordered => unused
            .into_iter()
            .min_by_key(|&i| (store.get(i).map(|q| q.question_id).unwrap_or(i as u64), i)),
        OrderingPolicy::Randomized => unused.choose(&mut rand::rng()).copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::sample_questions;

    fn store() -> QuestionStore {
        let mut s = QuestionStore::new();
        s.add_batch(sample_questions());
        s
    }

    #[test]
    fn ordered_returns_lowest_id_first() {
        let store = store();
        let used = HashSet::new();

        for _ in 0..5 {
            let index = next_question(&store, &used, OrderingPolicy::Ordered).unwrap();
            assert_eq!(store.get(index).unwrap().question_id, 1);
        }
    }

    #[test]
    fn ordered_advances_after_marking_used() {
        let store = store();
        let mut used = HashSet::new();

        let first = next_question(&store, &used, OrderingPolicy::Ordered).unwrap();
        used.insert(first);
        let second = next_question(&store, &used, OrderingPolicy::Ordered).unwrap();

        assert_eq!(store.get(first).unwrap().question_id, 1);
        assert_eq!(store.get(second).unwrap().question_id, 2);
    }

    #[test]
    fn exhaustion_returns_none() {
        let store = store();
        let used: HashSet<usize> = (0..store.len()).collect();

        assert!(next_question(&store, &used, OrderingPolicy::Ordered).is_none());
        assert!(next_question(&store, &used, OrderingPolicy::Randomized).is_none());
    }

    #[test]
    fn randomized_visits_every_question_exactly_once() {
        let store = store();
        let mut used = HashSet::new();
        let mut visited = Vec::new();

        while let Some(index) = next_question(&store, &used, OrderingPolicy::Randomized) {
            assert!(used.insert(index), "question {} selected twice", index);
            visited.push(index);
        }

        assert_eq!(visited.len(), store.len());
        let distinct: HashSet<usize> = visited.into_iter().collect();
        assert_eq!(distinct.len(), store.len());
    }

    #[test]
    fn selection_does_not_mutate_used_set() {
        let store = store();
        let used = HashSet::new();

        next_question(&store, &used, OrderingPolicy::Ordered);
        next_question(&store, &used, OrderingPolicy::Randomized);
        assert!(used.is_empty());
    }
}
