//! The question store: ingestion, normalization, content-hash deduplication,
//! and stable export.

use sha2::{Digest, Sha256};

use crate::import::{
    clean_value, difficulty_from_wire, kind_from_wire, normalize_type, RawQuestion,
};
use crate::types::Question;

/// Outcome of ingesting one batch of raw records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub added: usize,
    pub duplicates_skipped: usize,
}

/// Holds the full question list and the id sequence. Questions are only ever
/// appended; usage tracking lives with the session.
#[derive(Debug, Clone, Default)]
pub struct QuestionStore {
    questions: Vec<Question>,
    next_question_id: u64,
}

/// Dedup key: normalized question text and sorted normalized correct answers.
/// Two questions with the same text and answer set hash identically no matter
/// the answer order, casing, or which import batch they arrived in.
pub fn content_hash(text: &str, answers: &[String]) -> String {
    let mut sorted: Vec<String> = answers
        .iter()
        .map(|a| a.trim().to_lowercase())
        .collect();
    sorted.sort();

    let mut hasher = Sha256::new();
    hasher.update(text.trim().to_lowercase().as_bytes());
    hasher.update(b"::");
    hasher.update(sorted.join("|").as_bytes());
    hex::encode(hasher.finalize())
}

impl QuestionStore {
    pub fn new() -> Self {
        Self {
            questions: Vec::new(),
            next_question_id: 1,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn next_question_id(&self) -> u64 {
        self.next_question_id
    }

    /// Restore the id counter from a saved session. Never moves backwards
    /// past already-assigned ids.
    pub fn set_next_question_id(&mut self, next: u64) {
        let floor = self
            .questions
            .iter()
            .map(|q| q.question_id + 1)
            .max()
            .unwrap_or(1);
        self.next_question_id = next.max(floor);
    }

    /// Normalize, hash, and append a batch of raw records. Duplicates against
    /// the store or within the batch are skipped and counted, never an error.
    pub fn add_batch(&mut self, raw: Vec<RawQuestion>) -> BatchReport {
        let mut report = BatchReport::default();
        let mut seen: std::collections::HashSet<String> =
            self.questions.iter().map(|q| q.id.clone()).collect();

        for record in raw {
            let question = self.normalize(record);
            if seen.contains(&question.id) {
                report.duplicates_skipped += 1;
                continue;
            }
            seen.insert(question.id.clone());
            self.questions.push(question);
            report.added += 1;
        }

        if report.duplicates_skipped > 0 {
            tracing::info!(
                "Skipped {} duplicate questions",
                report.duplicates_skipped
            );
        }
        report
    }

    fn normalize(&mut self, record: RawQuestion) -> Question {
        let text = clean_value(record.question.as_deref().unwrap_or(""))
            .trim()
            .to_string();
        // The bank server reports a question's subcategory as its category
        let category = clean_value(
            record
                .subcategory
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(record.category.as_deref())
                .unwrap_or(""),
        )
        .trim()
        .to_string();
        let difficulty = difficulty_from_wire(record.difficulty.as_deref());
        let type_name = normalize_type(record.kind.as_deref());

        let answers: Vec<String> = record
            .answers
            .iter()
            .map(|a| clean_value(a).trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        let incorrect: Vec<String> = record
            .incorrect_answers
            .iter()
            .map(|a| clean_value(a).trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        let description = record
            .description
            .map(|d| clean_value(&d).trim().to_string())
            .filter(|d| !d.is_empty());
        let regex = record
            .regex
            .map(|p| clean_value(&p).trim().to_string())
            .filter(|p| !p.is_empty());
        let regex_description = record
            .regex_description
            .map(|d| clean_value(&d).trim().to_string())
            .filter(|d| !d.is_empty());

        let question_id = match record.question_id {
            Some(id) => {
                self.next_question_id = self.next_question_id.max(id + 1);
                id
            }
            None => {
                let id = self.next_question_id;
                self.next_question_id += 1;
                id
            }
        };

        Question {
            id: content_hash(&text, &answers),
            question_id,
            category,
            difficulty,
            text,
            description,
            kind: kind_from_wire(type_name, answers, incorrect, regex, regex_description),
        }
    }

    /// All questions as wire records in stable field order
    pub fn export_records(&self) -> Vec<RawQuestion> {
        self.questions.iter().map(RawQuestion::from_question).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::sample_questions;
    use crate::types::QuestionKind;

    fn raw(question: &str, answers: &[&str]) -> RawQuestion {
        RawQuestion {
            question: Some(question.to_string()),
            answers: answers.iter().map(|a| a.to_string()).collect(),
            category: Some("Test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn add_batch_assigns_sequential_ids() {
        let mut store = QuestionStore::new();
        let report = store.add_batch(vec![raw("Q1", &["A"]), raw("Q2", &["B"])]);

        assert_eq!(report.added, 2);
        assert_eq!(store.get(0).unwrap().question_id, 1);
        assert_eq!(store.get(1).unwrap().question_id, 2);
        assert_eq!(store.next_question_id(), 3);
    }

    #[test]
    fn importing_twice_adds_nothing_new() {
        let mut store = QuestionStore::new();
        let first = store.add_batch(sample_questions());
        assert_eq!(first.added, 16);
        assert_eq!(first.duplicates_skipped, 0);

        let second = store.add_batch(sample_questions());
        assert_eq!(second.added, 0);
        assert_eq!(second.duplicates_skipped, 16);
        assert_eq!(store.len(), 16);
    }

    #[test]
    fn duplicates_within_one_batch_are_skipped() {
        let mut store = QuestionStore::new();
        let report = store.add_batch(vec![raw("Same?", &["Yes"]), raw("same?  ", &["YES"])]);

        assert_eq!(report.added, 1);
        assert_eq!(report.duplicates_skipped, 1);
    }

    #[test]
    fn hash_ignores_answer_order_and_case() {
        let a = content_hash("What?", &["Nile".to_string(), "Amazon".to_string()]);
        let b = content_hash("  WHAT?  ", &["amazon ".to_string(), " NILE".to_string()]);
        assert_eq!(a, b);

        let c = content_hash("What?", &["Nile".to_string()]);
        assert_ne!(a, c);
    }

    #[test]
    fn explicit_question_id_is_respected() {
        let mut store = QuestionStore::new();
        let mut record = raw("Q", &["A"]);
        record.question_id = Some(41);
        store.add_batch(vec![record, raw("Q2", &["B"])]);

        assert_eq!(store.get(0).unwrap().question_id, 41);
        // Counter advances past explicit ids so they are never reused
        assert_eq!(store.get(1).unwrap().question_id, 42);
    }

    #[test]
    fn excel_artifacts_are_stripped() {
        let mut record = raw("=\"What is 2+2?\"", &["=\"4\""]);
        record.category = Some("=\"Math\"".to_string());

        let mut store = QuestionStore::new();
        store.add_batch(vec![record]);

        let q = store.get(0).unwrap();
        assert_eq!(q.text, "What is 2+2?");
        assert_eq!(q.category, "Math");
        assert_eq!(q.kind.correct_answers(), vec!["4"]);
    }

    #[test]
    fn legacy_regex_type_becomes_general() {
        let mut record = raw("Year?", &["1945"]);
        record.kind = Some("regex".to_string());
        record.regex = Some("^1945$".to_string());

        let mut store = QuestionStore::new();
        store.add_batch(vec![record]);

        match &store.get(0).unwrap().kind {
            QuestionKind::General { pattern, .. } => {
                assert_eq!(pattern.as_deref(), Some("^1945$"));
            }
            other => panic!("expected general kind, got {:?}", other),
        }
    }

    #[test]
    fn export_roundtrips_through_add_batch() {
        let mut store = QuestionStore::new();
        store.add_batch(sample_questions());
        let exported = store.export_records();

        let mut reimported = QuestionStore::new();
        let report = reimported.add_batch(exported);
        assert_eq!(report.added, 16);
        assert_eq!(reimported.questions(), store.questions());
    }

    #[test]
    fn subcategory_wins_over_category() {
        let mut record = raw("Q", &["A"]);
        record.category = Some("Science".to_string());
        record.subcategory = Some("Physics".to_string());

        let mut store = QuestionStore::new();
        store.add_batch(vec![record]);
        assert_eq!(store.get(0).unwrap().category, "Physics");
    }
}
