//! Move search: static evaluation plus alpha-beta minimax with
//! iterative deepening.

pub mod engine;
pub mod evaluation;

pub use engine::{SearchEngine, SearchLimits, SearchResult, SearchStats};
pub use evaluation::{INFINITY, MATE_SCORE, evaluate};
