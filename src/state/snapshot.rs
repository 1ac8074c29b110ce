//! Saved-state snapshots: one serializable record holding the full session,
//! written after every state-mutating action and reloaded at startup.
//!
//! Older saves load with defaults filled in for fields they predate; a
//! corrupt blob counts as "no saved state" rather than an error.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::import::RawQuestion;
use crate::types::{
    AnswerDifficulty, DisplaySettings, GameMode, OrderingPolicy, PointSettings, Team,
};

/// Bumped whenever the snapshot gains fields. Loads reject snapshots from a
/// newer schema than this build understands.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// ISO8601 write timestamp
    #[serde(default)]
    pub saved_at: Option<String>,
    pub questions: Vec<RawQuestion>,
    /// Used indices as an explicit list; sets do not serialize natively
    #[serde(default)]
    pub used_questions: Vec<usize>,
    pub teams: Vec<Team>,
    pub mode: GameMode,
    #[serde(default)]
    pub ordering: OrderingPolicy,
    #[serde(default)]
    pub points: PointSettings,
    #[serde(default)]
    pub answer_difficulty: AnswerDifficulty,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub requested_rows: usize,
    #[serde(default)]
    pub max_available_rows: usize,
    /// Absent in older saves; defaults to question count + 1 on load
    #[serde(default)]
    pub next_question_id: Option<u64>,
}

fn default_schema_version() -> u32 {
    1
}

impl SessionSnapshot {
    /// Effective id counter, applying the legacy default for saves that
    /// predate the field
    pub fn effective_next_question_id(&self) -> u64 {
        self.next_question_id
            .unwrap_or(self.questions.len() as u64 + 1)
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.schema_version > SNAPSHOT_SCHEMA_VERSION {
            return Err(SnapshotError::SchemaTooNew {
                found: self.schema_version,
                supported: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Saved state schema {found} is newer than supported {supported}")]
    SchemaTooNew { found: u32, supported: u32 },

    #[error("Failed to write saved state: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize saved state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistence port: a single fixed slot, last-writer-wins
pub trait SnapshotStore {
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), SnapshotError>;
    /// `None` means no usable saved state (absent or unreadable)
    fn load(&self) -> Option<SessionSnapshot>;
    fn clear(&self) -> Result<(), SnapshotError>;
}

/// File-backed slot, the desktop counterpart of browser local storage
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), SnapshotError> {
        let json = serde_json::to_string(snapshot)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn load(&self) -> Option<SessionSnapshot> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        let snapshot: SessionSnapshot = match serde_json::from_str(&text) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Ignoring corrupt saved state: {}", e);
                return None;
            }
        };
        if let Err(e) = snapshot.validate() {
            tracing::warn!("Ignoring saved state: {}", e);
            return None;
        }
        Some(snapshot)
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
