//! Tabula: a chess rules and search engine.
//!
//! The [`engine`] module owns the rules of the game: board state with a
//! mailbox array as the source of truth (bitboards are a derived
//! cache), full move legality including castling and en passant,
//! automatic queen promotion, and game-end detection for checkmate,
//! stalemate, the fifty-move rule, and threefold repetition.
//!
//! The [`search`] module picks moves with alpha-beta minimax over a
//! material-plus-piece-square evaluation, deepening iteratively under
//! an optional time budget.
//!
//! ```
//! use tabula::engine::{Game, Move};
//! use tabula::search::{SearchEngine, SearchLimits};
//!
//! let mut game = Game::new();
//! game.apply_move(Move::from_coords("e2e4").unwrap()).unwrap();
//!
//! let engine = SearchEngine::new(SearchLimits::default());
//! let reply = engine.choose_move(game.position()).unwrap();
//! game.apply_move(reply.best_move).unwrap();
//! assert!(!game.status().is_game_over());
//! ```

pub mod config;
pub mod engine;
pub mod provider;
pub mod search;

pub use config::EngineConfig;
pub use engine::{Game, GameSnapshot, GameStatus, Move, MoveError, Position};
pub use provider::{MoveProvider, RandomProvider, SearchProvider};
pub use search::{SearchEngine, SearchLimits, SearchResult};
