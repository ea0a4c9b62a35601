//! Minimax search with alpha-beta pruning and iterative deepening.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::engine::rules::legal_moves;
use crate::engine::{Color, Move, Position};

use super::evaluation::{evaluate, INFINITY, MATE_SCORE};

/// Search limits: a maximum depth, and an optional wall-clock budget
/// checked between deepening iterations. A depth that has started is
/// always allowed to finish; there is no mid-search cancellation.
#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    pub max_depth: u8,
    pub time_budget: Option<Duration>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_depth: 3,
            time_budget: None,
        }
    }
}

impl SearchLimits {
    pub fn depth(max_depth: u8) -> Self {
        SearchLimits {
            max_depth,
            time_budget: None,
        }
    }
}

/// Outcome of a completed search.
#[derive(Debug, Clone, Copy)]
pub struct SearchResult {
    pub best_move: Move,
    /// Score from White's perspective, in centipawns.
    pub score: i32,
    pub stats: SearchStats,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub depth_reached: u8,
    pub elapsed: Duration,
}

/// Alpha-beta minimax engine.
pub struct SearchEngine {
    limits: SearchLimits,
}

impl SearchEngine {
    pub fn new(limits: SearchLimits) -> Self {
        SearchEngine { limits }
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    /// Pick the best move for the side to move, deepening one ply at a
    /// time up to the depth limit. Returns `None` when the side to move
    /// has no legal moves.
    pub fn choose_move(&self, pos: &Position) -> Option<SearchResult> {
        let side = pos.turn();
        let moves = legal_moves(pos, side);
        if moves.is_empty() {
            return None;
        }

        let start = Instant::now();
        let mut scratch = pos.clone();
        let mut stats = SearchStats::default();
        let mut best_move = moves[0];
        let mut best_score = 0;

        for depth in 1..=self.limits.max_depth.max(1) {
            if depth > 1 {
                if let Some(budget) = self.limits.time_budget {
                    if start.elapsed() >= budget {
                        debug!(depth, "time budget spent, keeping previous result");
                        break;
                    }
                }
            }

            let (mv, score) =
                search_root(&mut scratch, &moves, depth, side, &mut stats.nodes);
            best_move = mv;
            best_score = score;
            stats.depth_reached = depth;

            debug!(
                depth,
                best_move = %best_move,
                score = best_score,
                nodes = stats.nodes,
                "deepening iteration complete"
            );
        }

        stats.elapsed = start.elapsed();
        Some(SearchResult {
            best_move,
            score: best_score,
            stats,
        })
    }
}

/// Root search over an already-generated move list.
fn search_root(
    pos: &mut Position,
    moves: &[Move],
    depth: u8,
    side: Color,
    nodes: &mut u64,
) -> (Move, i32) {
    let maximizing = side == Color::White;
    let mut ordered = moves.to_vec();
    order_moves(pos, &mut ordered);

    let mut alpha = -INFINITY;
    let mut beta = INFINITY;
    let mut best_move = ordered[0];
    let mut best_score = if maximizing { -INFINITY } else { INFINITY };

    for &mv in &ordered {
        let undo = pos.make_move(mv);
        let score = minimax(pos, depth - 1, alpha, beta, !maximizing, nodes);
        pos.unmake_move(mv, undo);

        if maximizing {
            if score > best_score {
                best_score = score;
                best_move = mv;
            }
            alpha = alpha.max(best_score);
        } else {
            if score < best_score {
                best_score = score;
                best_move = mv;
            }
            beta = beta.min(best_score);
        }
    }
    (best_move, best_score)
}

/// Plain minimax with alpha-beta windows, scoring from White's
/// perspective throughout.
fn minimax(
    pos: &mut Position,
    depth: u8,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    nodes: &mut u64,
) -> i32 {
    *nodes += 1;

    let side = if maximizing { Color::White } else { Color::Black };
    let mut moves = legal_moves(pos, side);

    if moves.is_empty() {
        // Mated side scores -MATE for White, +MATE for Black; a
        // stalemated side scores a dead draw.
        return if crate::engine::attacks::in_check(pos, side) {
            if maximizing { -MATE_SCORE } else { MATE_SCORE }
        } else {
            0
        };
    }
    if depth == 0 {
        return evaluate(pos);
    }

    order_moves(pos, &mut moves);

    if maximizing {
        let mut best = -INFINITY;
        for mv in moves {
            let undo = pos.make_move(mv);
            best = best.max(minimax(pos, depth - 1, alpha, beta, false, nodes));
            pos.unmake_move(mv, undo);
            alpha = alpha.max(best);
            if beta <= alpha {
                break;
            }
        }
        best
    } else {
        let mut best = INFINITY;
        for mv in moves {
            let undo = pos.make_move(mv);
            best = best.min(minimax(pos, depth - 1, alpha, beta, true, nodes));
            pos.unmake_move(mv, undo);
            beta = beta.min(best);
            if beta <= alpha {
                break;
            }
        }
        best
    }
}

/// Captures first, most valuable victim first. Quiet moves keep their
/// generation order.
fn order_moves(pos: &Position, moves: &mut [Move]) {
    moves.sort_by_key(|mv| {
        match pos.piece_at(mv.to) {
            Some(victim) => -victim.kind.value(),
            None => 1,
        }
    });
}
