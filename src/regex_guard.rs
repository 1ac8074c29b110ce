//! Safety checks and timeout-guarded execution for user-supplied regex
//! patterns used by free-text questions.
//!
//! The static shape filter is a best-effort heuristic against ReDoS-prone
//! constructs, not a soundness proof; the execution timeout is the operative
//! guard for anything that slips through.

use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;
use std::time::Duration;

/// Default wall-clock budget for matching a single answer
pub const REGEX_TIMEOUT: Duration = Duration::from_millis(100);

/// Result type for pattern validation and matching
pub type PatternResult<T> = Result<T, PatternError>;

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("Pattern is empty or invalid")]
    Empty,

    #[error("Pattern contains potentially unsafe constructs")]
    Unsafe,

    #[error("Invalid regex: {0}")]
    Compile(String),

    #[error("Validation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Validation task failed: {0}")]
    Execution(String),
}

impl PatternError {
    /// Whether the failure was the timeout guard firing (callers treat this
    /// as a non-match with a distinguishable reason)
    pub fn is_timeout(&self) -> bool {
        matches!(self, PatternError::Timeout(_))
    }
}

/// Shapes known to invite catastrophic backtracking: runs of quantifier
/// tokens, a quantified group followed by another quantifier, and quantified
/// backreferences.
fn danger_shapes() -> &'static [Regex] {
    static SHAPES: OnceLock<Vec<Regex>> = OnceLock::new();
    SHAPES.get_or_init(|| {
        [
            r"\+{3,}|\*{3,}|\?{3,}",
            r"\([^)]*[+*][^)]*\)[+*]",
            r"\\\d[+*?]",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("danger shape patterns are valid"))
        .collect()
    })
}

/// Validate a pattern for emptiness, unsafe shapes, and compilability.
/// Compilation is case-insensitive, matching how answers are checked.
pub fn validate_pattern(pattern: &str) -> PatternResult<()> {
    if pattern.trim().is_empty() {
        return Err(PatternError::Empty);
    }

    for shape in danger_shapes() {
        if shape.is_match(pattern) {
            return Err(PatternError::Unsafe);
        }
    }

    compile(pattern)?;
    Ok(())
}

fn compile(pattern: &str) -> PatternResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| PatternError::Compile(e.to_string()))
}

/// Match trimmed user input against a pattern, racing execution against
/// `timeout`. A timeout resolves as `PatternError::Timeout` rather than
/// blocking the caller.
pub async fn validate_answer(
    input: &str,
    pattern: &str,
    timeout: Duration,
) -> PatternResult<bool> {
    if let Err(e) = validate_pattern(pattern) {
        tracing::warn!("Invalid regex pattern: {}", e);
        return Err(e);
    }

    let re = compile(pattern)?;
    let candidate = input.trim().to_string();

    let matching = tokio::task::spawn_blocking(move || re.is_match(&candidate));

    match tokio::time::timeout(timeout, matching).await {
        Ok(Ok(matched)) => Ok(matched),
        Ok(Err(e)) => Err(PatternError::Execution(e.to_string())),
        Err(_) => {
            tracing::warn!("Regex validation timed out after {:?}", timeout);
            Err(PatternError::Timeout(timeout))
        }
    }
}
