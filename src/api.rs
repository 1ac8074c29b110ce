//! HTTP API for the question bank server: category browsing, per-category
//! question fetches, and bank statistics.
//!
//! Responses use a `success` envelope with an `error` string on failure, and
//! camelCase payload fields. Question payloads are wire-format records the
//! import flow consumes directly.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::import::RawQuestion;
use crate::state::content_hash;

/// Cap on one questions fetch
pub const MAX_QUESTIONS_PER_REQUEST: usize = 500;

/// Read-only bank state shared across handlers. Keeps the wire-form records
/// so the Subcategory field survives for grouping and filtering.
pub struct BankState {
    records: Vec<RawQuestion>,
}

/// One category grouping with its subcategory breakdown
struct CategoryEntry {
    name: String,
    question_count: usize,
    subcategories: Vec<(String, usize)>,
}

impl BankState {
    /// Duplicate records (same text and answer set) are dropped up front;
    /// the serving side never mutates.
    pub fn new(records: Vec<RawQuestion>) -> Self {
        let mut seen = HashSet::new();
        let records = records
            .into_iter()
            .filter(|r| {
                let text = r.question.as_deref().unwrap_or("");
                seen.insert(content_hash(text, &r.answers))
            })
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    fn record_category(record: &RawQuestion) -> &str {
        record
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("General")
    }

    fn record_subcategory(record: &RawQuestion) -> Option<&str> {
        record
            .subcategory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn record_difficulty(record: &RawQuestion) -> &str {
        record
            .difficulty
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or("L1")
    }

    /// Categories sorted by name, subcategory counts sorted within each. The
    /// 1-based position in this list is the category id.
    fn categories(&self) -> Vec<CategoryEntry> {
        let mut grouped: BTreeMap<&str, (usize, BTreeMap<&str, usize>)> = BTreeMap::new();
        for record in &self.records {
            let entry = grouped.entry(Self::record_category(record)).or_default();
            entry.0 += 1;
            if let Some(sub) = Self::record_subcategory(record) {
                *entry.1.entry(sub).or_insert(0) += 1;
            }
        }

        grouped
            .into_iter()
            .map(|(name, (question_count, subs))| CategoryEntry {
                name: name.to_string(),
                question_count,
                subcategories: subs
                    .into_iter()
                    .map(|(sub, count)| (sub.to_string(), count))
                    .collect(),
            })
            .collect()
    }

    fn category_name(&self, id: u64) -> Option<String> {
        if id < 1 {
            return None;
        }
        self.categories()
            .into_iter()
            .nth(id as usize - 1)
            .map(|entry| entry.name)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: message.into(),
        }),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryBody {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBody {
    pub id: u64,
    pub name: String,
    pub question_count: usize,
    pub subcategories: Vec<SubcategoryBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesBody {
    pub success: bool,
    pub categories: Vec<CategoryBody>,
    pub total_categories: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsBody {
    pub success: bool,
    pub category_name: String,
    pub questions: Vec<RawQuestion>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsPayload {
    pub total_categories: usize,
    pub total_questions: usize,
    pub difficulties: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct StatsBody {
    pub success: bool,
    pub stats: StatsPayload,
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub questions: usize,
}

#[derive(Debug, Deserialize, Default)]
pub struct QuestionsQuery {
    pub limit: Option<usize>,
    pub difficulty: Option<String>,
    pub subcategory: Option<String>,
}

/// GET /api/health
pub async fn health(State(state): State<Arc<BankState>>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "healthy",
        questions: state.len(),
    })
}

/// GET /api/categories
pub async fn list_categories(State(state): State<Arc<BankState>>) -> Json<CategoriesBody> {
    let categories: Vec<CategoryBody> = state
        .categories()
        .into_iter()
        .enumerate()
        .map(|(i, entry)| CategoryBody {
            id: i as u64 + 1,
            name: entry.name,
            question_count: entry.question_count,
            subcategories: entry
                .subcategories
                .into_iter()
                .map(|(name, count)| SubcategoryBody { name, count })
                .collect(),
        })
        .collect();

    Json(CategoriesBody {
        success: true,
        total_categories: categories.len(),
        categories,
    })
}

/// GET /api/categories/{id}/questions
///
/// Optional `limit` (capped), `difficulty` (L1/L2 only) and `subcategory`
/// filters.
pub async fn category_questions(
    State(state): State<Arc<BankState>>,
    Path(category_id): Path<u64>,
    Query(query): Query<QuestionsQuery>,
) -> Response {
    if !(1..=10_000).contains(&category_id) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid category ID");
    }
    let name = match state.category_name(category_id) {
        Some(name) => name,
        None => return error_response(StatusCode::NOT_FOUND, "Category not found"),
    };

    let limit = query
        .limit
        .unwrap_or(MAX_QUESTIONS_PER_REQUEST)
        .min(MAX_QUESTIONS_PER_REQUEST);
    let difficulty = query
        .difficulty
        .as_deref()
        .filter(|d| matches!(*d, "L1" | "L2"));
    let subcategory = query
        .subcategory
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let questions: Vec<RawQuestion> = state
        .records
        .iter()
        .filter(|r| BankState::record_category(r) == name)
        .filter(|r| subcategory.is_none_or(|s| BankState::record_subcategory(r) == Some(s)))
        .filter(|r| difficulty.is_none_or(|d| BankState::record_difficulty(r) == d))
        .take(limit)
        .map(|r| wire_record(r, &name))
        .collect();

    Json(QuestionsBody {
        success: true,
        category_name: name,
        count: questions.len(),
        questions,
    })
    .into_response()
}

/// GET /api/stats
pub async fn stats(State(state): State<Arc<BankState>>) -> Json<StatsBody> {
    let mut difficulties = BTreeMap::new();
    for record in &state.records {
        *difficulties
            .entry(BankState::record_difficulty(record).to_string())
            .or_insert(0) += 1;
    }

    Json(StatsBody {
        success: true,
        stats: StatsPayload {
            total_categories: state.categories().len(),
            total_questions: state.len(),
            difficulties,
        },
    })
}

/// Unknown API paths get the JSON error envelope instead of a bare 404
async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Endpoint not found")
}

/// API routes with the shared bank state applied
pub fn router(state: Arc<BankState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{id}/questions", get(category_questions))
        .route("/api/stats", get(stats))
        .route("/api/{*rest}", get(not_found))
        .with_state(state)
}

/// Serve a record without its local ids. The served Category collapses to
/// the subcategory when one is present; importers regroup from there.
fn wire_record(record: &RawQuestion, category_name: &str) -> RawQuestion {
    let category = BankState::record_subcategory(record)
        .unwrap_or(category_name)
        .to_string();
    RawQuestion {
        id: None,
        question_id: None,
        category: Some(category),
        subcategory: None,
        ..record.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::sample_questions;

    fn bank() -> Arc<BankState> {
        Arc::new(BankState::new(sample_questions()))
    }

    fn record(category: &str, subcategory: Option<&str>, text: &str) -> RawQuestion {
        RawQuestion {
            id: None,
            question_id: None,
            difficulty: Some("L1".into()),
            category: Some(category.into()),
            subcategory: subcategory.map(String::from),
            kind: Some("multiple_choice".into()),
            description: Some(String::new()),
            question: Some(text.into()),
            answers: vec!["yes".into()],
            incorrect_answers: vec!["no".into()],
            regex: None,
            regex_description: None,
        }
    }

    fn subcategorized_bank() -> Arc<BankState> {
        Arc::new(BankState::new(vec![
            record("Science", Some("Physics"), "What pulls apples down?"),
            record("Science", Some("Physics"), "What resists acceleration?"),
            record("Science", Some("Chemistry"), "Lightest element?"),
            record("Science", None, "Is this science?"),
            record("History", None, "First moon landing year?"),
        ]))
    }

    #[tokio::test]
    async fn categories_are_sorted_with_stable_ids() {
        let body = list_categories(State(bank())).await.0;

        assert!(body.success);
        assert_eq!(body.total_categories, 4);
        let names: Vec<&str> = body.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Geography", "History", "Pop Culture", "Science"]);
        assert_eq!(body.categories[0].id, 1);
        assert_eq!(body.categories[3].id, 4);
        assert!(body.categories.iter().all(|c| c.question_count == 4));
    }

    #[tokio::test]
    async fn categories_carry_subcategory_counts() {
        let body = list_categories(State(subcategorized_bank())).await.0;

        assert_eq!(body.total_categories, 2);
        let science = &body.categories[1];
        assert_eq!(science.name, "Science");
        assert_eq!(science.question_count, 4);
        assert_eq!(science.subcategories.len(), 2);
        assert_eq!(science.subcategories[0].name, "Chemistry");
        assert_eq!(science.subcategories[0].count, 1);
        assert_eq!(science.subcategories[1].name, "Physics");
        assert_eq!(science.subcategories[1].count, 2);
        assert!(body.categories[0].subcategories.is_empty());
    }

    #[tokio::test]
    async fn questions_filtered_by_subcategory() {
        let state = subcategorized_bank();
        // Science is id 2 in sorted order
        let response = category_questions(
            State(state),
            Path(2),
            Query(QuestionsQuery {
                subcategory: Some("Physics".into()),
                ..Default::default()
            }),
        )
        .await;
        let body = body_json(response).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["categoryName"], "Science");
        assert_eq!(body["count"], 2);
        // Served Category collapses to the subcategory
        for q in body["questions"].as_array().unwrap() {
            assert_eq!(q["Category"], "Physics");
            assert!(q.get("Subcategory").is_none());
        }
    }

    #[tokio::test]
    async fn questions_filtered_by_difficulty() {
        let response = category_questions(
            State(bank()),
            // Science is id 4 in sorted order
            Path(4),
            Query(QuestionsQuery {
                difficulty: Some("L2".into()),
                ..Default::default()
            }),
        )
        .await;
        let body = body_json(response).await;

        assert_eq!(body["categoryName"], "Science");
        assert_eq!(body["count"], 2);
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        assert!(bank().category_name(99).is_none());
        assert!(bank().category_name(0).is_none());
    }

    #[tokio::test]
    async fn served_records_carry_no_ids() {
        let source = RawQuestion {
            id: Some("abc".into()),
            question_id: Some(7),
            ..record("Science", None, "Any?")
        };
        let served = wire_record(&source, "Science");

        assert!(served.id.is_none());
        assert!(served.question_id.is_none());
        assert_eq!(served.category.as_deref(), Some("Science"));
        assert_eq!(served.question.as_deref(), Some("Any?"));
    }

    #[tokio::test]
    async fn stats_count_by_difficulty() {
        let body = stats(State(bank())).await.0;

        assert_eq!(body.stats.total_questions, 16);
        assert_eq!(body.stats.total_categories, 4);
        assert_eq!(body.stats.difficulties["L1"], 8);
        assert_eq!(body.stats.difficulties["L2"], 8);
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
