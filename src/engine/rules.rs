//! Move legality: shape rules per piece, check safety, and the
//! has-any-legal-move scan that backs mate and stalemate detection.

use super::attacks::{in_check, is_square_attacked, path_clear, KING_OFFSETS, KNIGHT_OFFSETS};
use super::board::Position;
use super::types::{Color, Move, MoveError, PieceType, Square};

/// Full validation of a move for `mover`, in rejection order:
/// selection, shape, then check exposure. Never mutates `pos`.
pub fn validate(pos: &Position, mv: Move, mover: Color) -> Result<(), MoveError> {
    let piece = match pos.piece_at(mv.from) {
        Some(p) if p.color == mover => p,
        _ => {
            return Err(MoveError::InvalidSelection {
                from: mv.from,
                to: mv.to,
            });
        }
    };
    // A king can never actually be captured; rejecting the attempt here
    // keeps that unreachable case from slipping through the shape rules.
    if pos
        .piece_at(mv.to)
        .is_some_and(|p| p.color == mover || p.kind == PieceType::King)
    {
        return Err(MoveError::InvalidSelection {
            from: mv.from,
            to: mv.to,
        });
    }
    if !shape_ok(pos, mv, piece.color, piece.kind) {
        return Err(MoveError::IllegalShape {
            from: mv.from,
            to: mv.to,
        });
    }
    if exposes_check(pos, mv, mover) {
        return Err(MoveError::ExposesCheck {
            from: mv.from,
            to: mv.to,
        });
    }
    Ok(())
}

/// True when the move is fully legal for the piece on its source square.
pub fn is_legal(pos: &Position, mv: Move) -> bool {
    match pos.piece_at(mv.from) {
        Some(piece) => validate(pos, mv, piece.color).is_ok(),
        None => false,
    }
}

/// Shape-and-path rule for one piece kind. Assumes the destination does
/// not hold a friendly piece; check safety is the caller's concern.
fn shape_ok(pos: &Position, mv: Move, color: Color, kind: PieceType) -> bool {
    if mv.from == mv.to {
        return false;
    }
    let df = mv.to.file() as i8 - mv.from.file() as i8;
    let dr = mv.to.rank() as i8 - mv.from.rank() as i8;

    match kind {
        PieceType::Pawn => pawn_shape_ok(pos, mv, color, df, dr),
        PieceType::Knight => KNIGHT_OFFSETS.contains(&(df, dr)),
        PieceType::Bishop => df.abs() == dr.abs() && path_clear(pos, mv.from, mv.to),
        PieceType::Rook => (df == 0 || dr == 0) && path_clear(pos, mv.from, mv.to),
        PieceType::Queen => {
            (df == 0 || dr == 0 || df.abs() == dr.abs()) && path_clear(pos, mv.from, mv.to)
        }
        PieceType::King => {
            if KING_OFFSETS.contains(&(df, dr)) {
                true
            } else {
                castle_ok(pos, mv, color, df, dr)
            }
        }
    }
}

fn pawn_shape_ok(pos: &Position, mv: Move, color: Color, df: i8, dr: i8) -> bool {
    let forward = color.forward();
    let target = pos.piece_at(mv.to);

    // Single push.
    if df == 0 && dr == forward {
        return target.is_none();
    }
    // Double push from the pawn's starting rank.
    if df == 0 && dr == 2 * forward {
        let start_rank = (color.home_rank() as i8 + forward) as u8;
        if mv.from.rank() != start_rank || target.is_some() {
            return false;
        }
        let step = Square::from_file_rank(mv.from.file(), (mv.from.rank() as i8 + forward) as u8);
        return pos.piece_at(step).is_none();
    }
    // Diagonal capture, including en passant onto the empty target square.
    if df.abs() == 1 && dr == forward {
        return target.is_some() || pos.en_passant() == Some(mv.to);
    }
    false
}

/// King moving two files along its home rank: all castling conditions.
fn castle_ok(pos: &Position, mv: Move, color: Color, df: i8, dr: i8) -> bool {
    if dr != 0 || df.abs() != 2 {
        return false;
    }
    let home = color.home_rank();
    if mv.from != Square::from_file_rank(4, home) {
        return false;
    }
    let kingside = df > 0;
    let rights = if kingside {
        pos.castling().can_castle_kingside(color)
    } else {
        pos.castling().can_castle_queenside(color)
    };
    if !rights {
        return false;
    }

    // The matching rook must still stand on its corner. This also covers
    // the case where it was captured there, which the moved-flags alone
    // cannot see.
    let rook_sq = Square::from_file_rank(if kingside { 7 } else { 0 }, home);
    match pos.piece_at(rook_sq) {
        Some(p) if p.color == color && p.kind == PieceType::Rook => {}
        _ => return false,
    }

    if !path_clear(pos, mv.from, rook_sq) {
        return false;
    }

    // King may not castle out of, through, or into check.
    let enemy = !color;
    let transit = Square::from_file_rank(if kingside { 5 } else { 3 }, home);
    !is_square_attacked(pos, mv.from, enemy)
        && !is_square_attacked(pos, transit, enemy)
        && !is_square_attacked(pos, mv.to, enemy)
}

/// True when applying the move would leave the mover's own king attacked.
/// Works on a scratch copy so the caller's position is untouched.
fn exposes_check(pos: &Position, mv: Move, mover: Color) -> bool {
    let mut scratch = pos.clone();
    scratch.make_move(mv);
    in_check(&scratch, mover)
}

/// True when `color` has at least one legal move.
///
/// Scans source squares from the occupancy bitboard and cheap-rejects
/// destination squares with the shape rule before paying for the
/// clone-and-check safety test.
pub fn has_legal_move(pos: &Position, color: Color) -> bool {
    scan_legal_moves(pos, color, &mut |_| true)
}

/// All legal moves for `color`, in source-square scan order.
pub fn legal_moves(pos: &Position, color: Color) -> Vec<Move> {
    let mut moves = Vec::with_capacity(32);
    scan_legal_moves(pos, color, &mut |mv| {
        moves.push(mv);
        false
    });
    moves
}

/// Shared legal-move scan. Calls `visit` for each legal move; stops
/// early when `visit` returns true.
fn scan_legal_moves(pos: &Position, color: Color, visit: &mut dyn FnMut(Move) -> bool) -> bool {
    for from in pos.occupied(color).iter() {
        let piece = match pos.piece_at(from) {
            Some(p) => p,
            None => continue,
        };
        for to in Square::all() {
            if pos
                .piece_at(to)
                .is_some_and(|p| p.color == color || p.kind == PieceType::King)
            {
                continue;
            }
            let mv = Move::new(from, to);
            if !shape_ok(pos, mv, piece.color, piece.kind) {
                continue;
            }
            if !exposes_check(pos, mv, color) && visit(mv) {
                return true;
            }
        }
    }
    false
}
