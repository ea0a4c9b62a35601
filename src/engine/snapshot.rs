//! Serializable game snapshots.
//!
//! A snapshot carries everything needed to resume a game faithfully:
//! the full FEN (including clocks, castling availability, and the
//! en-passant target), the move record, and the repetition history.
//! The status is deliberately not stored; it is recomputed on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::board::Position;
use super::game::{Game, MAX_HISTORY};
use super::types::ChessError;

/// Persistent form of a [`Game`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub id: Uuid,
    pub fen: String,
    pub move_log: String,
    pub history: Vec<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    /// Capture the game's full state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            id: self.id(),
            fen: self.position().to_fen(),
            move_log: self.move_log().to_string(),
            history: self.history().to_vec(),
            created_at: self.created_at(),
            updated_at: self.updated_at(),
        }
    }

    /// Rebuild a game from a snapshot, recomputing the status.
    pub fn from_snapshot(snapshot: GameSnapshot) -> Result<Self, ChessError> {
        let position = Position::from_fen(&snapshot.fen)?;
        if snapshot.history.is_empty() {
            return Err(ChessError::InvalidSnapshot(
                "history must contain at least the current position".into(),
            ));
        }
        if snapshot.history.len() > MAX_HISTORY {
            return Err(ChessError::InvalidSnapshot(format!(
                "history exceeds {MAX_HISTORY} entries"
            )));
        }
        // The newest history entry must describe the stored position,
        // unless history already saturated and stopped recording.
        if snapshot.history.len() < MAX_HISTORY
            && *snapshot.history.last().unwrap_or(&0) != position.hash()
        {
            return Err(ChessError::InvalidSnapshot(
                "history tail does not match the position".into(),
            ));
        }
        Ok(Game::from_parts(
            snapshot.id,
            position,
            snapshot.move_log,
            snapshot.history,
            snapshot.created_at,
            snapshot.updated_at,
        ))
    }
}
