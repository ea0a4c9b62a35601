//! Chess rules engine: board representation, attack detection, move
//! legality, and game lifecycle.

pub mod attacks;
pub mod board;
pub mod game;
pub mod rules;
pub mod snapshot;
pub mod types;

pub use board::{Position, START_FEN, Undo};
pub use game::{FIFTY_MOVE_PLIES, Game, MAX_HISTORY};
pub use snapshot::GameSnapshot;
pub use types::{
    Bitboard, CastlingFlags, ChessError, Color, DrawReason, GameStatus, Move, MoveError, Piece,
    PieceType, SideFlags, Square,
};
