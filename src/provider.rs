//! Pluggable move providers.
//!
//! A provider turns a game state into a move suggestion. The search
//! engine is the serious one; the random provider exists for testing
//! and as a fallback when search has nothing to offer.

use rand::seq::SliceRandom;
use tracing::debug;

use crate::engine::rules::legal_moves;
use crate::engine::{Game, Move};
use crate::search::{SearchEngine, SearchLimits};

/// Source of move suggestions for the side to move.
pub trait MoveProvider {
    fn name(&self) -> &str;

    /// Suggest a move, or `None` when the side to move has no legal
    /// moves.
    fn choose_move(&self, game: &Game) -> Option<Move>;
}

/// Picks a uniformly random legal move.
pub struct RandomProvider;

impl MoveProvider for RandomProvider {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&self, game: &Game) -> Option<Move> {
        let moves = legal_moves(game.position(), game.turn());
        moves.choose(&mut rand::thread_rng()).copied()
    }
}

/// Minimax-backed provider.
pub struct SearchProvider {
    engine: SearchEngine,
}

impl SearchProvider {
    pub fn new(limits: SearchLimits) -> Self {
        SearchProvider {
            engine: SearchEngine::new(limits),
        }
    }
}

impl MoveProvider for SearchProvider {
    fn name(&self) -> &str {
        "search"
    }

    fn choose_move(&self, game: &Game) -> Option<Move> {
        let result = self.engine.choose_move(game.position())?;
        debug!(
            game_id = %game.id(),
            best_move = %result.best_move,
            score = result.score,
            nodes = result.stats.nodes,
            "search provider chose a move"
        );
        Some(result.best_move)
    }
}
