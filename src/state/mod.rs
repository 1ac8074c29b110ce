//! Game session state and the operations the presenter drives it with.
//!
//! `GameSession` owns the question store, the used-question set, teams, and
//! the currently open question. Everything mutating goes through it so the
//! used/score/active invariants hold in one place.

pub mod answers;
pub mod board;
pub mod scoring;
pub mod select;
pub mod snapshot;
pub mod store;

use std::collections::HashSet;

use crate::import::{sample_questions, RawQuestion};
use crate::regex_guard::{self, REGEX_TIMEOUT};
use crate::types::{
    AnswerDifficulty, DisplaySettings, GameMode, OrderingPolicy, PointSettings, Question, Team,
};

pub use answers::{PresentedAnswers, PresentedChoice};
pub use board::{BoardCell, BoardLayout, BoardRequest};
pub use snapshot::{
    FileSnapshotStore, SessionSnapshot, SnapshotError, SnapshotStore, SNAPSHOT_SCHEMA_VERSION,
};
pub use store::{content_hash, BatchReport, QuestionStore};

/// The question currently on screen
#[derive(Debug, Clone)]
struct ActiveQuestion {
    index: usize,
    /// Board cell value when opened from a board; overrides settings
    custom_points: Option<u32>,
    /// Point value cached at display time; later settings changes never
    /// touch an open question
    displayed_points: u32,
    revealed: bool,
}

/// Snapshot of an opened question for the presentation layer
#[derive(Debug, Clone)]
pub struct OpenedQuestion {
    pub index: usize,
    pub points: u32,
    pub point_display: String,
    pub answers: PresentedAnswers,
}

/// Outcome of a free-text answer check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeTextVerdict {
    pub matched: bool,
    /// The pattern ran out of time; treated as a non-match
    pub timed_out: bool,
}

pub struct GameSession {
    store: QuestionStore,
    used: HashSet<usize>,
    teams: Vec<Team>,
    pub mode: GameMode,
    pub ordering: OrderingPolicy,
    pub points: PointSettings,
    pub answer_difficulty: AnswerDifficulty,
    pub display: DisplaySettings,
    requested_rows: usize,
    max_available_rows: usize,
    active: Option<ActiveQuestion>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            store: QuestionStore::new(),
            used: HashSet::new(),
            teams: vec![Team::new("Team 1"), Team::new("Team 2")],
            mode: GameMode::Single,
            ordering: OrderingPolicy::Ordered,
            points: PointSettings::default(),
            answer_difficulty: AnswerDifficulty::default(),
            display: DisplaySettings::default(),
            requested_rows: 0,
            max_available_rows: 0,
            active: None,
        }
    }

    pub fn store(&self) -> &QuestionStore {
        &self.store
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn used_questions(&self) -> &HashSet<usize> {
        &self.used
    }

    pub fn requested_rows(&self) -> usize {
        self.requested_rows
    }

    pub fn active_question(&self) -> Option<&Question> {
        self.active.as_ref().and_then(|a| self.store.get(a.index))
    }

    pub fn remaining(&self) -> usize {
        self.store.len().saturating_sub(self.used.len())
    }

    // ---- question lifecycle -------------------------------------------

    /// Open the next unused question (single mode). Returns `None` when the
    /// store is exhausted. The question stays unused until an answer is
    /// committed, so closing it early costs nothing.
    pub fn next_question(&mut self) -> Option<OpenedQuestion> {
        let index = select::next_question(&self.store, &self.used, self.ordering)?;
        self.open(index, None)
    }

    /// Open the question behind a board cell. A used cell is inert: the call
    /// returns `None` and changes nothing.
    pub fn open_board_cell(
        &mut self,
        layout: &BoardLayout,
        row: usize,
        column: usize,
    ) -> Option<OpenedQuestion> {
        let cell = layout.cell(row, column)?;
        if cell.used || self.used.contains(&cell.question_index) {
            return None;
        }
        self.open(cell.question_index, Some(cell.points))
    }

    fn open(&mut self, index: usize, custom_points: Option<u32>) -> Option<OpenedQuestion> {
        let question = self.store.get(index)?;
        let points = scoring::points_for(question, custom_points, &self.points);
        let opened = OpenedQuestion {
            index,
            points,
            point_display: scoring::format_point_display(
                points,
                self.points.use_point_values,
                &self.display,
            ),
            answers: answers::build(question, self.answer_difficulty),
        };
        self.active = Some(ActiveQuestion {
            index,
            custom_points,
            displayed_points: points,
            revealed: false,
        });
        tracing::debug!(index, points, "Opened question");
        Some(opened)
    }

    /// Mark the open question revealed and consume it. Revealing is the
    /// commit point: the question stays used even if no points are awarded
    /// afterwards.
    pub fn reveal(&mut self) -> Result<(), String> {
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| "No question is open".to_string())?;
        active.revealed = true;
        self.used.insert(active.index);
        Ok(())
    }

    /// Check a free-text answer against the open question and commit the
    /// reveal. With a pattern present the input is regex-matched under a
    /// timeout; otherwise it must equal one of the accepted answers,
    /// case-insensitively after trimming.
    pub async fn answer_free_text(&mut self, input: &str) -> Result<FreeTextVerdict, String> {
        let index = self
            .active
            .as_ref()
            .map(|a| a.index)
            .ok_or_else(|| "No question is open".to_string())?;
        let question = self
            .store
            .get(index)
            .ok_or_else(|| "Open question is out of range".to_string())?
            .clone();

        let pattern = match &question.kind {
            crate::types::QuestionKind::General { pattern, .. } => pattern.clone(),
            _ => return Err("Open question does not take free-text answers".to_string()),
        };

        let verdict = match pattern.as_deref() {
            Some(p) => match regex_guard::validate_answer(input, p, REGEX_TIMEOUT).await {
                Ok(matched) => FreeTextVerdict {
                    matched,
                    timed_out: false,
                },
                Err(e) if e.is_timeout() => FreeTextVerdict {
                    matched: false,
                    timed_out: true,
                },
                Err(e) => {
                    tracing::warn!("Rejecting answer, stored pattern is unusable: {}", e);
                    FreeTextVerdict {
                        matched: false,
                        timed_out: false,
                    }
                }
            },
            None => FreeTextVerdict {
                matched: literal_match(input, &question),
                timed_out: false,
            },
        };

        self.reveal()?;
        Ok(verdict)
    }

    /// Credit the open question's displayed value to one team and close it.
    pub fn award(&mut self, team_index: usize) -> Result<u32, String> {
        let active = self
            .active
            .take()
            .ok_or_else(|| "No question is open".to_string())?;
        let team = self
            .teams
            .get_mut(team_index)
            .ok_or_else(|| format!("No team at index {}", team_index))?;

        scoring::award(team, active.displayed_points);
        self.used.insert(active.index);
        tracing::info!(
            team = %team.name,
            points = active.displayed_points,
            "Awarded points"
        );
        Ok(active.displayed_points)
    }

    /// Close the open question without awarding anyone. A revealed question
    /// stays used; an unrevealed one returns to the pool.
    pub fn decline(&mut self) {
        self.active = None;
    }

    /// Alias for closing a question before reveal; no side effects beyond
    /// clearing the active slot.
    pub fn close_question(&mut self) {
        self.active = None;
    }

    // ---- content management -------------------------------------------

    /// Import a batch of records. Clears the used set (indices shift) and
    /// follows board growth with the row request.
    pub fn import_batch(&mut self, raw: Vec<RawQuestion>) -> BatchReport {
        let report = self.store.add_batch(raw);
        self.used.clear();
        self.active = None;

        let new_max = board::max_available_rows(&self.store);
        if new_max > self.max_available_rows || self.requested_rows >= self.max_available_rows {
            self.requested_rows = new_max;
        }
        self.max_available_rows = new_max;
        report
    }

    pub fn load_sample(&mut self) -> BatchReport {
        self.import_batch(sample_questions())
    }

    pub fn export_records(&self) -> Vec<RawQuestion> {
        self.store.export_records()
    }

    // ---- board ---------------------------------------------------------

    /// Build the Jeopardy board for the current store and remember the
    /// effective row counts for the next build.
    pub fn build_board(&mut self) -> BoardLayout {
        let layout = board::build(
            &self.store,
            &self.used,
            &BoardRequest {
                ordering: self.ordering,
                requested_rows: self.requested_rows,
                previous_max_rows: self.max_available_rows,
                base_points: self.points.l1_points,
                use_point_values: self.points.use_point_values,
            },
        );
        self.requested_rows = layout.effective_requested_rows;
        self.max_available_rows = layout.max_available_rows;
        layout
    }

    pub fn set_requested_rows(&mut self, rows: usize) {
        self.requested_rows = rows;
    }

    // ---- teams and resets ----------------------------------------------

    /// Resize the roster, keeping existing names and scores
    pub fn set_team_count(&mut self, count: usize) {
        let count = count.max(1);
        while self.teams.len() < count {
            self.teams.push(Team::new(format!("Team {}", self.teams.len() + 1)));
        }
        self.teams.truncate(count);
    }

    pub fn rename_team(&mut self, index: usize, name: impl Into<String>) -> Result<(), String> {
        let team = self
            .teams
            .get_mut(index)
            .ok_or_else(|| format!("No team at index {}", index))?;
        team.name = name.into();
        Ok(())
    }

    pub fn reset_scores(&mut self) {
        for team in &mut self.teams {
            team.score = 0;
        }
    }

    /// Return every question to the pool without touching scores
    pub fn reset_questions(&mut self) {
        self.used.clear();
        self.active = None;
    }

    /// Full wipe: questions, used set, scores, and row tracking
    pub fn reset_all(&mut self) {
        self.store = QuestionStore::new();
        self.used.clear();
        self.active = None;
        self.requested_rows = 0;
        self.max_available_rows = 0;
        self.reset_scores();
    }

    // ---- persistence ---------------------------------------------------

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut used: Vec<usize> = self.used.iter().copied().collect();
        used.sort_unstable();
        SessionSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
            questions: self.store.export_records(),
            used_questions: used,
            teams: self.teams.clone(),
            mode: self.mode,
            ordering: self.ordering,
            points: self.points.clone(),
            answer_difficulty: self.answer_difficulty,
            display: self.display.clone(),
            requested_rows: self.requested_rows,
            max_available_rows: self.max_available_rows,
            next_question_id: Some(self.store.next_question_id()),
        }
    }

    pub fn restore(snap: SessionSnapshot) -> Result<Self, SnapshotError> {
        snap.validate()?;

        let next_question_id = snap.effective_next_question_id();
        let mut store = QuestionStore::new();
        store.add_batch(snap.questions);
        store.set_next_question_id(next_question_id);

        let len = store.len();
        Ok(Self {
            used: snap
                .used_questions
                .into_iter()
                .filter(|&i| i < len)
                .collect(),
            teams: snap.teams,
            mode: snap.mode,
            ordering: snap.ordering,
            points: snap.points,
            answer_difficulty: snap.answer_difficulty,
            display: snap.display,
            requested_rows: snap.requested_rows,
            max_available_rows: snap.max_available_rows,
            active: None,
            store,
        })
    }
}

fn literal_match(input: &str, question: &Question) -> bool {
    let candidate = input.trim().to_lowercase();
    question
        .kind
        .correct_answers()
        .iter()
        .any(|a| a.trim().to_lowercase() == candidate)
}
