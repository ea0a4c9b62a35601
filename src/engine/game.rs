//! Game lifecycle: applying moves, tracking the move log and position
//! history, and deriving the game status after every move.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::attacks::in_check;
use super::board::Position;
use super::rules::{has_legal_move, validate};
use super::types::{Color, DrawReason, GameStatus, Move, MoveError, Piece, PieceType, Square};

/// Position hashes kept for repetition detection. Once full, further
/// hashes are dropped and threefold detection saturates.
pub const MAX_HISTORY: usize = 512;

/// Halfmove-clock threshold for the fifty-move rule (fifty full moves
/// by each side without a pawn move or capture).
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// A running chess game.
pub struct Game {
    id: Uuid,
    position: Position,
    status: GameStatus,
    move_log: String,
    history: Vec<u64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Game {
    /// Start a new game from the standard position.
    pub fn new() -> Self {
        let position = Position::new();
        let mut history = Vec::with_capacity(64);
        history.push(position.hash());
        let now = Utc::now();
        let game = Game {
            id: Uuid::new_v4(),
            position,
            status: GameStatus::Active,
            move_log: String::new(),
            history,
            created_at: now,
            updated_at: now,
        };
        info!(game_id = %game.id, "new game started");
        game
    }

    /// Resume a game from its parts. Recomputes the status from the
    /// position, so stale stored statuses cannot survive a reload.
    pub(crate) fn from_parts(
        id: Uuid,
        position: Position,
        move_log: String,
        history: Vec<u64>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut game = Game {
            id,
            position,
            status: GameStatus::Active,
            move_log,
            history,
            created_at,
            updated_at,
        };
        game.status = game.compute_status();
        game
    }

    // -- accessors -----------------------------------------------------------

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// Space-separated move record ("e2e4 Ng1f3 ..."): bare coordinates
    /// for pawn moves, piece letter prefix otherwise.
    #[inline]
    pub fn move_log(&self) -> &str {
        &self.move_log
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn history(&self) -> &[u64] {
        &self.history
    }

    /// The board as an 8x8 array, `[rank][file]` with rank 0 = rank 1.
    pub fn board_array(&self) -> [[Option<Piece>; 8]; 8] {
        let mut board = [[None; 8]; 8];
        for sq in Square::all() {
            board[sq.rank() as usize][sq.file() as usize] = self.position.piece_at(sq);
        }
        board
    }

    /// Is `color`'s king currently attacked?
    pub fn is_in_check(&self, color: Color) -> bool {
        in_check(&self.position, color)
    }

    /// Number of times the current position has occurred.
    pub fn repetition_count(&self) -> usize {
        let current = self.position.hash();
        self.history.iter().filter(|&&h| h == current).count()
    }

    /// Fifty-move-rule query, independent of the stored status.
    pub fn is_fifty_move_draw(&self) -> bool {
        self.position.halfmove_clock() >= FIFTY_MOVE_PLIES
    }

    /// Threefold-repetition query, independent of the stored status.
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetition_count() >= 3
    }

    // -- move application ----------------------------------------------------

    /// Validate and apply a move for the side to move.
    ///
    /// On rejection the game is untouched. On success the move is
    /// recorded, the position history grows (up to [`MAX_HISTORY`]), and
    /// the refreshed status is returned. Moves are accepted even after
    /// the game has ended; callers that want to stop at mate check the
    /// status themselves.
    pub fn apply_move(&mut self, mv: Move) -> Result<GameStatus, MoveError> {
        let mover = self.position.turn();
        validate(&self.position, mv, mover)?;

        let piece = self.position.piece_at(mv.from).ok_or(
            // validate() guarantees a piece is present.
            MoveError::InvalidSelection {
                from: mv.from,
                to: mv.to,
            },
        )?;

        self.position.make_move(mv);
        self.record_move(piece, mv);
        if self.history.len() < MAX_HISTORY {
            self.history.push(self.position.hash());
        }
        self.status = self.compute_status();
        self.updated_at = Utc::now();

        debug!(
            game_id = %self.id,
            mv = %mv,
            status = %self.status,
            "move applied"
        );
        Ok(self.status.clone())
    }

    /// Append to the move record: "e2e4 " for pawns, "Ng1f3 " otherwise.
    fn record_move(&mut self, piece: Piece, mv: Move) {
        if piece.kind != PieceType::Pawn {
            self.move_log
                .push(piece.kind.to_char(Color::White));
        }
        self.move_log.push_str(&mv.to_string());
        self.move_log.push(' ');
    }

    /// Search-backed move suggestion for the side to move. `None` when
    /// no legal move exists. The returned move still goes through
    /// [`Game::apply_move`]'s legality gate like any other.
    pub fn choose_automated_move(&self, limits: &crate::search::SearchLimits) -> Option<Move> {
        let result = crate::search::SearchEngine::new(*limits).choose_move(&self.position)?;
        Some(result.best_move)
    }

    /// Derive the status for the side now to move: mate and stalemate
    /// first, then the draw rules, then check.
    fn compute_status(&self) -> GameStatus {
        let to_move = self.position.turn();
        let checked = in_check(&self.position, to_move);

        if !has_legal_move(&self.position, to_move) {
            return if checked {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            };
        }
        if self.is_fifty_move_draw() {
            return GameStatus::Draw(DrawReason::FiftyMoveRule);
        }
        if self.is_threefold_repetition() {
            return GameStatus::Draw(DrawReason::ThreefoldRepetition);
        }
        if checked {
            GameStatus::Check
        } else {
            GameStatus::Active
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
