//! Client for a remote question bank: category browsing, bank statistics,
//! and fetching question batches for import.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::import::RawQuestion;

/// Result type for question bank operations
pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Question bank error: {0}")]
    Api(String),

    #[error("Unexpected response: {0}")]
    Parse(String),
}

/// Per-subcategory question count inside a category listing
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryCount {
    pub name: String,
    pub count: usize,
}

/// One browsable category as the bank reports it
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: u64,
    pub name: String,
    pub question_count: usize,
    #[serde(default)]
    pub source_file: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<SubcategoryCount>,
}

/// Whole-bank statistics
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankStats {
    pub total_questions: usize,
    pub total_categories: usize,
    #[serde(default)]
    pub difficulties: HashMap<String, usize>,
}

// Response envelopes: `success` plus either the payload or an `error` string.

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    success: bool,
    #[serde(default)]
    categories: Vec<CategorySummary>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuestionsResponse {
    success: bool,
    #[serde(default, rename = "categoryName")]
    category_name: Option<String>,
    #[serde(default)]
    questions: Vec<RawQuestion>,
    #[serde(default)]
    #[allow(dead_code)] // Reported by the bank; the vec length is authoritative
    count: usize,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    success: bool,
    stats: Option<BankStats>,
    #[serde(default)]
    error: Option<String>,
}

fn envelope_error(error: Option<String>) -> RemoteError {
    RemoteError::Api(error.unwrap_or_else(|| "Unknown question bank error".to_string()))
}

/// Trait for question sources the import flow can pull from
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// List browsable categories with their question counts
    async fn list_categories(&self) -> RemoteResult<Vec<CategorySummary>>;

    /// Whole-bank statistics
    async fn stats(&self) -> RemoteResult<BankStats>;

    /// Fetch up to `limit` questions from one category, in wire form ready
    /// for the normal import path
    async fn fetch_questions(
        &self,
        category_id: u64,
        limit: Option<usize>,
    ) -> RemoteResult<Vec<RawQuestion>>;
}

/// HTTP implementation against the question bank API
pub struct HttpQuestionBank {
    base_url: String,
    client: reqwest::Client,
}

impl HttpQuestionBank {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> RemoteResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(RemoteError::Api(format!(
                "Question bank returned status {}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionBank {
    async fn list_categories(&self) -> RemoteResult<Vec<CategorySummary>> {
        let body: CategoriesResponse = self.get_json("/api/categories").await?;
        if !body.success {
            return Err(envelope_error(body.error));
        }
        Ok(body.categories)
    }

    async fn stats(&self) -> RemoteResult<BankStats> {
        let body: StatsResponse = self.get_json("/api/stats").await?;
        if !body.success {
            return Err(envelope_error(body.error));
        }
        body.stats
            .ok_or_else(|| RemoteError::Parse("Stats payload missing".to_string()))
    }

    async fn fetch_questions(
        &self,
        category_id: u64,
        limit: Option<usize>,
    ) -> RemoteResult<Vec<RawQuestion>> {
        let path = match limit {
            Some(n) => format!("/api/categories/{}/questions?limit={}", category_id, n),
            None => format!("/api/categories/{}/questions", category_id),
        };
        let body: QuestionsResponse = self.get_json(&path).await?;
        if !body.success {
            return Err(envelope_error(body.error));
        }
        tracing::info!(
            category_id,
            category = body.category_name.as_deref().unwrap_or("?"),
            fetched = body.questions.len(),
            "Fetched questions from bank"
        );
        Ok(body.questions)
    }
}
