//! JSONL question records: the wire format shared by file import/export, the
//! remote category browser, and saved-state snapshots.
//!
//! Field names and their serialization order are fixed for round-trip
//! stability with existing question files.

use serde::{Deserialize, Serialize};

use crate::types::{Difficulty, Question, QuestionKind};

/// One question as it appears on the wire. All fields are optional on input;
/// normalization and defaulting happen at ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "QuestionId", default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<u64>,
    #[serde(rename = "Difficulty", default)]
    pub difficulty: Option<String>,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    #[serde(rename = "Subcategory", default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Question", default)]
    pub question: Option<String>,
    #[serde(rename = "Answers", default)]
    pub answers: Vec<String>,
    #[serde(rename = "IncorrectAnswers", default)]
    pub incorrect_answers: Vec<String>,
    #[serde(rename = "RegEx", default)]
    pub regex: Option<String>,
    #[serde(rename = "RegExDescription", default)]
    pub regex_description: Option<String>,
}

/// Result of parsing a JSONL batch
#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub records: Vec<RawQuestion>,
    pub malformed_skipped: usize,
}

/// Parse newline-delimited JSON records. Malformed lines are skipped with a
/// warning; they never abort the batch.
pub fn parse_jsonl(text: &str) -> ParsedBatch {
    let mut batch = ParsedBatch::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawQuestion>(line) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse question line: {} ({})", line, e);
                batch.malformed_skipped += 1;
            }
        }
    }

    batch
}

/// Serialize records back to JSONL in the fixed field order
pub fn to_jsonl(records: &[RawQuestion]) -> String {
    records
        .iter()
        .filter_map(|r| serde_json::to_string(r).ok())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip spreadsheet-export artifacts: Excel `="…"` wrapping and doubled
/// quote escaping.
pub fn clean_value(value: &str) -> String {
    let mut v = value.to_string();
    if v.starts_with("=\"") && v.ends_with('"') && v.len() >= 3 {
        v = v[2..v.len() - 1].to_string();
    }
    if v.starts_with("\"\"") {
        v = format!("\"{}", &v[2..]);
    }
    if v.ends_with("\"\"") {
        v = format!("{}\"", &v[..v.len() - 2]);
    }
    v.replace("\"\"", "\"")
}

/// Normalize a wire type name. `"regex"` is the legacy name for `"general"`;
/// anything unknown falls back to multiple choice.
pub fn normalize_type(kind: Option<&str>) -> &'static str {
    match kind.map(str::trim) {
        Some("general") | Some("regex") => "general",
        Some("multiple_answer") => "multiple_answer",
        Some("hidden") => "hidden",
        _ => "multiple_choice",
    }
}

impl RawQuestion {
    /// Flatten an internal question to its wire form, preserving empty-string
    /// defaults where the format expects them.
    pub fn from_question(q: &Question) -> Self {
        let (answers, incorrect, regex, regex_description) = match &q.kind {
            QuestionKind::MultipleChoice {
                correct,
                distractors,
            } => (vec![correct.clone()], distractors.clone(), None, None),
            QuestionKind::MultipleAnswer {
                correct,
                distractors,
            } => (correct.clone(), distractors.clone(), None, None),
            QuestionKind::General {
                answers,
                pattern,
                pattern_hint,
            } => (
                answers.clone(),
                Vec::new(),
                pattern.clone(),
                pattern_hint.clone(),
            ),
            QuestionKind::Hidden { answers } => (answers.clone(), Vec::new(), None, None),
        };

        RawQuestion {
            id: Some(q.id.clone()),
            question_id: Some(q.question_id),
            difficulty: Some(q.difficulty.label().to_string()),
            category: Some(q.category.clone()),
            subcategory: None,
            kind: Some(q.kind.type_name().to_string()),
            description: Some(q.description.clone().unwrap_or_default()),
            question: Some(q.text.clone()),
            answers,
            incorrect_answers: incorrect,
            regex: Some(regex.unwrap_or_default()),
            regex_description: Some(regex_description.unwrap_or_default()),
        }
    }
}

/// Build the internal question kind from normalized wire fields
pub fn kind_from_wire(
    type_name: &str,
    answers: Vec<String>,
    incorrect: Vec<String>,
    regex: Option<String>,
    regex_description: Option<String>,
) -> QuestionKind {
    match type_name {
        "multiple_answer" => QuestionKind::MultipleAnswer {
            correct: answers,
            distractors: incorrect,
        },
        "general" => QuestionKind::General {
            answers,
            pattern: regex.filter(|p| !p.is_empty()),
            pattern_hint: regex_description.filter(|d| !d.is_empty()),
        },
        "hidden" => QuestionKind::Hidden { answers },
        _ => QuestionKind::MultipleChoice {
            correct: answers.first().cloned().unwrap_or_default(),
            distractors: incorrect,
        },
    }
}

/// The bundled starter set: 16 questions across four categories, four each
pub fn sample_questions() -> Vec<RawQuestion> {
    let raw = [
        ("Geography", "L1", "multiple_choice", "What is the capital of France?", vec!["Paris"], vec!["London", "Berlin", "Madrid", "Rome", "Vienna", "Amsterdam", "Brussels"], "", "", ""),
        ("Geography", "L1", "multiple_choice", "Which continent is Brazil located in?", vec!["South America"], vec!["Africa", "Europe", "Asia", "North America", "Australia", "Central America", "Antarctica"], "", "", ""),
        ("Geography", "L2", "multiple_choice", "What is the smallest country in the world by area?", vec!["Vatican City"], vec!["Monaco", "San Marino", "Liechtenstein", "Malta", "Andorra", "Luxembourg", "Singapore"], "", "", ""),
        ("Geography", "L2", "multiple_answer", "Which river is the longest in the world?", vec!["Nile", "Amazon"], vec!["Mississippi", "Yangtze", "Congo", "Ganges", "Danube", "Mekong", "Volga"], "", "", ""),
        ("Science", "L1", "multiple_choice", "What planet is known as the Red Planet?", vec!["Mars"], vec!["Venus", "Jupiter", "Saturn", "Mercury", "Neptune", "Uranus", "Pluto"], "", "", ""),
        ("Science", "L1", "general", "What is the chemical symbol for water?", vec!["H2O"], vec![], "^h2o$", "Enter the chemical formula", ""),
        ("Science", "L2", "multiple_choice", "What is the hardest natural substance on Earth?", vec!["Diamond"], vec!["Titanium", "Quartz", "Graphene", "Tungsten", "Steel", "Obsidian", "Sapphire"], "", "", ""),
        ("Science", "L2", "general", "What is the speed of light in km/s (approximately)?", vec!["300,000", "300000"], vec![], "^300[,.]?000$", "Enter the approximate value in km/s", ""),
        ("History", "L1", "general", "In which year did World War II end?", vec!["1945"], vec![], "^1945$", "Enter the year", ""),
        ("History", "L1", "multiple_choice", "Who was the first President of the United States?", vec!["George Washington"], vec!["Abraham Lincoln", "Thomas Jefferson", "John Adams", "Benjamin Franklin", "James Madison", "Alexander Hamilton", "John Hancock"], "", "", ""),
        ("History", "L2", "multiple_answer", "What ancient wonder was located in Alexandria, Egypt?", vec!["Lighthouse of Alexandria", "The Lighthouse"], vec!["Hanging Gardens", "Colossus of Rhodes", "Temple of Artemis", "Great Pyramid", "Statue of Zeus", "Mausoleum at Halicarnassus", "Library of Alexandria"], "", "", ""),
        ("History", "L2", "multiple_choice", "Which empire was ruled by Genghis Khan?", vec!["Mongol Empire"], vec!["Ottoman Empire", "Roman Empire", "Persian Empire", "Byzantine Empire", "Mughal Empire", "Han Dynasty", "Qing Dynasty"], "", "", ""),
        ("Pop Culture", "L1", "multiple_choice", "What is the name of Harry Potter's owl?", vec!["Hedwig"], vec!["Errol", "Pigwidgeon", "Scabbers", "Fawkes", "Crookshanks", "Nagini", "Buckbeak"], "", "", ""),
        ("Pop Culture", "L1", "multiple_choice", "Which band performed 'Bohemian Rhapsody'?", vec!["Queen"], vec!["The Beatles", "Led Zeppelin", "Pink Floyd", "The Rolling Stones", "AC/DC", "Aerosmith", "Guns N' Roses"], "", "", ""),
        ("Pop Culture", "L2", "general", "What year was the first iPhone released?", vec!["2007"], vec![], "^2007$", "Enter the year", ""),
        ("Pop Culture", "L2", "hidden", "In the movie 'The Matrix', what color pill does Neo take?", vec!["Red"], vec![], "", "", "The red pill represents truth and freedom from the simulation"),
    ];

    raw.into_iter()
        .map(
            |(category, difficulty, kind, question, answers, incorrect, regex, hint, description)| {
                RawQuestion {
                    category: Some(category.to_string()),
                    difficulty: Some(difficulty.to_string()),
                    kind: Some(kind.to_string()),
                    question: Some(question.to_string()),
                    answers: answers.into_iter().map(String::from).collect(),
                    incorrect_answers: incorrect.into_iter().map(String::from).collect(),
                    regex: Some(regex.to_string()),
                    regex_description: Some(hint.to_string()),
                    description: Some(description.to_string()),
                    ..Default::default()
                }
            },
        )
        .collect()
}

/// Build a usable difficulty from a wire label
pub fn difficulty_from_wire(label: Option<&str>) -> Difficulty {
    match label.map(str::trim) {
        Some(l) if !l.is_empty() => Difficulty(l.to_string()),
        _ => Difficulty::default(),
    }
}
