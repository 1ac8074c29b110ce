use serde::{Deserialize, Serialize};

/// Content hash identifying a question across imports
pub type QuestionId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Single,
    Jeopardy,
}

/// Delivery order for single-mode selection and board arrangement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderingPolicy {
    Ordered,
    Randomized,
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        OrderingPolicy::Ordered
    }
}

/// How many distractors are sampled alongside the correct answer(s)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnswerDifficulty {
    Easy,
    Medium,
    Hard,
}

impl AnswerDifficulty {
    /// Maximum number of incorrect answers shown at this setting
    pub fn max_distractors(self) -> usize {
        match self {
            AnswerDifficulty::Easy => 3,
            AnswerDifficulty::Medium => 5,
            AnswerDifficulty::Hard => 7,
        }
    }
}

impl Default for AnswerDifficulty {
    fn default() -> Self {
        AnswerDifficulty::Easy
    }
}

/// Difficulty label such as "L1" or "L2". The numeric level is the leading
/// digits of the label; anything unparseable counts as level 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Difficulty(pub String);

impl Difficulty {
    pub fn level(&self) -> u32 {
        let digits: String = self.0.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.parse().unwrap_or(1).max(1)
    }

    pub fn label(&self) -> &str {
        &self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty("L1".to_string())
    }
}

/// Closed variant over the supported question types. Each variant carries
/// only the fields its presentation and validation need.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        correct: String,
        distractors: Vec<String>,
    },
    MultipleAnswer {
        correct: Vec<String>,
        distractors: Vec<String>,
    },
    /// Free-text input, optionally validated by a regex pattern
    General {
        answers: Vec<String>,
        pattern: Option<String>,
        pattern_hint: Option<String>,
    },
    /// Reveal-only: disclosing the answers is itself the answer action
    Hidden { answers: Vec<String> },
}

impl QuestionKind {
    /// All accepted answers, in declaration order
    pub fn correct_answers(&self) -> Vec<&str> {
        match self {
            QuestionKind::MultipleChoice { correct, .. } => vec![correct.as_str()],
            QuestionKind::MultipleAnswer { correct, .. } => {
                correct.iter().map(String::as_str).collect()
            }
            QuestionKind::General { answers, .. } | QuestionKind::Hidden { answers } => {
                answers.iter().map(String::as_str).collect()
            }
        }
    }

    pub fn distractors(&self) -> &[String] {
        match self {
            QuestionKind::MultipleChoice { distractors, .. }
            | QuestionKind::MultipleAnswer { distractors, .. } => distractors,
            _ => &[],
        }
    }

    /// Wire name as used in JSONL records
    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multiple_choice",
            QuestionKind::MultipleAnswer { .. } => "multiple_answer",
            QuestionKind::General { .. } => "general",
            QuestionKind::Hidden { .. } => "hidden",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    /// Stable content hash used for de-duplication across imports
    pub id: QuestionId,
    /// Monotonic sequence number, assigned once and never reused
    pub question_id: u64,
    pub category: String,
    pub difficulty: Difficulty,
    pub text: String,
    pub description: Option<String>,
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub name: String,
    pub score: u32,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
        }
    }
}

/// Point value configuration. When `use_point_values` is off every question
/// is worth a flat 1 point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointSettings {
    pub use_point_values: bool,
    pub l1_points: u32,
    pub l2_points: u32,
}

impl Default for PointSettings {
    fn default() -> Self {
        Self {
            use_point_values: false,
            l1_points: 100,
            l2_points: 200,
        }
    }
}

/// How board cells render their point value. Presentation only, never part
/// of layout computation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PointImageMode {
    None,
    Replace,
    FullCell,
}

impl Default for PointImageMode {
    fn default() -> Self {
        PointImageMode::None
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DisplaySettings {
    #[serde(default)]
    pub point_label: String,
    #[serde(default)]
    pub point_image_mode: PointImageMode,
}
