//! Attack detection over the mailbox board.

use super::board::Position;
use super::types::{Color, PieceType, Square};

pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub(crate) const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
pub(crate) const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// True when every square strictly between `from` and `to` is empty.
/// `from` and `to` must share a rank, file, or diagonal.
pub(crate) fn path_clear(pos: &Position, from: Square, to: Square) -> bool {
    let df = (to.file() as i8 - from.file() as i8).signum();
    let dr = (to.rank() as i8 - from.rank() as i8).signum();
    let mut sq = from;
    loop {
        sq = match sq.offset(df, dr) {
            Some(next) => next,
            None => return false,
        };
        if sq == to {
            return true;
        }
        if pos.piece_at(sq).is_some() {
            return false;
        }
    }
}

/// True when any piece of `by` attacks `target`.
///
/// Pawn attacks are the diagonal capture squares only; the en-passant
/// rule does not matter here because the target square itself is what
/// is tested.
pub fn is_square_attacked(pos: &Position, target: Square, by: Color) -> bool {
    // Pawns: a pawn of `by` one rank behind the target on an adjacent
    // file attacks it.
    let back = -by.forward();
    for df in [-1, 1] {
        if let Some(sq) = target.offset(df, back) {
            if pos.piece_at(sq) == Some(super::types::Piece::new(by, PieceType::Pawn)) {
                return true;
            }
        }
    }

    for (df, dr) in KNIGHT_OFFSETS {
        if let Some(sq) = target.offset(df, dr) {
            if let Some(piece) = pos.piece_at(sq) {
                if piece.color == by && piece.kind == PieceType::Knight {
                    return true;
                }
            }
        }
    }

    for (df, dr) in KING_OFFSETS {
        if let Some(sq) = target.offset(df, dr) {
            if let Some(piece) = pos.piece_at(sq) {
                if piece.color == by && piece.kind == PieceType::King {
                    return true;
                }
            }
        }
    }

    // Sliders: walk each ray until the first piece.
    for (df, dr) in ROOK_DIRS {
        if let Some(piece) = first_piece_on_ray(pos, target, df, dr) {
            if piece.color == by
                && matches!(piece.kind, PieceType::Rook | PieceType::Queen)
            {
                return true;
            }
        }
    }
    for (df, dr) in BISHOP_DIRS {
        if let Some(piece) = first_piece_on_ray(pos, target, df, dr) {
            if piece.color == by
                && matches!(piece.kind, PieceType::Bishop | PieceType::Queen)
            {
                return true;
            }
        }
    }

    false
}

/// True when `color`'s king is currently attacked.
pub fn in_check(pos: &Position, color: Color) -> bool {
    match pos.king_square(color) {
        Some(king_sq) => is_square_attacked(pos, king_sq, !color),
        None => false,
    }
}

fn first_piece_on_ray(
    pos: &Position,
    from: Square,
    df: i8,
    dr: i8,
) -> Option<super::types::Piece> {
    let mut sq = from;
    while let Some(next) = sq.offset(df, dr) {
        sq = next;
        if let Some(piece) = pos.piece_at(sq) {
            return Some(piece);
        }
    }
    None
}
