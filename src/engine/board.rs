use super::types::{
    Bitboard, CastlingFlags, ChessError, Color, Move, Piece, PieceType, Square,
};
use std::fmt;

/// FEN for the standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A full chess position.
///
/// The mailbox `squares` array is the source of truth; the per-piece
/// bitboards are a derived cache, rebuilt whenever the board changes,
/// and are used to accelerate piece scans (king lookup, evaluation,
/// attack iteration).
#[derive(Clone)]
pub struct Position {
    squares: [Option<Piece>; 64],
    turn: Color,
    castling: CastlingFlags,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    // Derived: [color][piece type]
    bitboards: [[Bitboard; PieceType::COUNT]; 2],
    occupancy: [Bitboard; 2],
}

/// Reversal record for `make_move` / `unmake_move`.
///
/// Carries everything a move destroys: the captured piece (with its
/// square, which differs from the destination for en passant), the
/// moving piece as it was before promotion, and the scalar state the
/// move overwrites.
#[derive(Clone, Copy, Debug)]
pub struct Undo {
    moved_piece: Piece,
    captured: Option<(Square, Piece)>,
    castle_rook: Option<(Square, Square)>,
    prev_castling: CastlingFlags,
    prev_en_passant: Option<Square>,
    prev_halfmove_clock: u32,
    prev_fullmove_number: u32,
}

impl Position {
    /// The standard starting position.
    pub fn new() -> Self {
        // START_FEN is a constant known to be valid.
        Self::from_fen(START_FEN).expect("standard start position FEN is valid")
    }

    /// Parse a position from FEN notation.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(ChessError::InvalidFen(format!(
                "expected 6 fields, got {}",
                parts.len()
            )));
        }

        let mut squares = [None; 64];
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                } else {
                    let (color, kind) = PieceType::from_char(c).ok_or_else(|| {
                        ChessError::InvalidFen(format!("bad piece char '{c}'"))
                    })?;
                    if file >= 8 {
                        return Err(ChessError::InvalidFen(format!(
                            "rank {} overflows",
                            rank + 1
                        )));
                    }
                    squares[Square::from_file_rank(file, rank).0 as usize] =
                        Some(Piece::new(color, kind));
                    file += 1;
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {} has {} files",
                    rank + 1,
                    file
                )));
            }
        }

        let turn = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "bad side to move '{other}'"
                )));
            }
        };

        let castling = CastlingFlags::from_fen(parts[2])
            .ok_or_else(|| ChessError::InvalidFen(format!("bad castling field '{}'", parts[2])))?;

        let en_passant = match parts[3] {
            "-" => None,
            s => Some(
                Square::from_algebraic(s)
                    .ok_or_else(|| ChessError::InvalidSquare(s.to_string()))?,
            ),
        };

        let halfmove_clock: u32 = parts[4]
            .parse()
            .map_err(|_| ChessError::InvalidFen(format!("bad halfmove clock '{}'", parts[4])))?;
        let fullmove_number: u32 = parts[5]
            .parse()
            .map_err(|_| ChessError::InvalidFen(format!("bad fullmove number '{}'", parts[5])))?;

        let mut pos = Position {
            squares,
            turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            bitboards: [[Bitboard::EMPTY; PieceType::COUNT]; 2],
            occupancy: [Bitboard::EMPTY; 2],
        };
        pos.rebuild_bitboards();
        Ok(pos)
    }

    /// Serialize the position to FEN notation.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.squares[Square::from_file_rank(file, rank).0 as usize] {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen.push(' ');
        fen.push(match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        });
        fen.push(' ');
        fen.push_str(&self.castling.to_fen());
        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }
        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }

    // -- accessors -----------------------------------------------------------

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.0 as usize]
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn castling(&self) -> &CastlingFlags {
        &self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Bitboard of `color`'s pieces of `kind` (derived cache).
    #[inline]
    pub fn pieces(&self, color: Color, kind: PieceType) -> Bitboard {
        self.bitboards[color.index()][kind.index()]
    }

    /// Bitboard of all of `color`'s pieces.
    #[inline]
    pub fn occupied(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    /// Bitboard of all occupied squares.
    #[inline]
    pub fn all_occupied(&self) -> Bitboard {
        self.occupancy[0] | self.occupancy[1]
    }

    /// Square of `color`'s king, via the bitboard cache.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color, PieceType::King).lsb()
    }

    // -- internal board surgery ----------------------------------------------

    fn rebuild_bitboards(&mut self) {
        self.bitboards = [[Bitboard::EMPTY; PieceType::COUNT]; 2];
        self.occupancy = [Bitboard::EMPTY; 2];
        for sq in Square::all() {
            if let Some(piece) = self.squares[sq.0 as usize] {
                self.bitboards[piece.color.index()][piece.kind.index()].set(sq);
                self.occupancy[piece.color.index()].set(sq);
            }
        }
    }

    /// Verify the bitboard cache agrees with the mailbox board.
    #[cfg(debug_assertions)]
    pub fn assert_consistent(&self) {
        for sq in Square::all() {
            match self.squares[sq.0 as usize] {
                Some(piece) => {
                    debug_assert!(
                        self.bitboards[piece.color.index()][piece.kind.index()].is_set(sq),
                        "cache missing {piece} on {sq}"
                    );
                    debug_assert!(self.occupancy[piece.color.index()].is_set(sq));
                }
                None => {
                    debug_assert!(
                        !self.all_occupied().is_set(sq),
                        "cache marks empty square {sq} occupied"
                    );
                }
            }
        }
    }

    // -- make / unmake -------------------------------------------------------

    /// Apply a move, inferring its effects from the board.
    ///
    /// The move is assumed shape-legal (validated by the caller). Handles
    /// plain moves and captures, en-passant removal of the bypassed pawn,
    /// castling rook relocation, and automatic promotion to queen. Returns
    /// the `Undo` record needed to reverse it.
    pub fn make_move(&mut self, mv: Move) -> Undo {
        let piece = self.squares[mv.from.0 as usize]
            .expect("make_move called with empty source square");
        let mover = piece.color;

        let mut undo = Undo {
            moved_piece: piece,
            captured: self.squares[mv.to.0 as usize].map(|p| (mv.to, p)),
            castle_rook: None,
            prev_castling: self.castling,
            prev_en_passant: self.en_passant,
            prev_halfmove_clock: self.halfmove_clock,
            prev_fullmove_number: self.fullmove_number,
        };

        // En passant: diagonal pawn move onto the empty target square
        // captures the pawn that just passed it.
        if piece.kind == PieceType::Pawn
            && Some(mv.to) == self.en_passant
            && mv.from.file() != mv.to.file()
            && self.squares[mv.to.0 as usize].is_none()
        {
            let victim_sq = Square::from_file_rank(mv.to.file(), mv.from.rank());
            undo.captured = self.squares[victim_sq.0 as usize].map(|p| (victim_sq, p));
            self.squares[victim_sq.0 as usize] = None;
        }

        // Castling: a king moving two files also relocates the rook.
        if piece.kind == PieceType::King && mv.to.file().abs_diff(mv.from.file()) == 2 {
            let rank = mv.from.rank();
            let (rook_from, rook_to) = if mv.to.file() > mv.from.file() {
                (Square::from_file_rank(7, rank), Square::from_file_rank(5, rank))
            } else {
                (Square::from_file_rank(0, rank), Square::from_file_rank(3, rank))
            };
            self.squares[rook_to.0 as usize] = self.squares[rook_from.0 as usize].take();
            undo.castle_rook = Some((rook_from, rook_to));
        }

        // Move the piece, promoting a pawn that reaches the far rank.
        let promoted = piece.kind == PieceType::Pawn && mv.to.rank() == (!mover).home_rank();
        self.squares[mv.from.0 as usize] = None;
        self.squares[mv.to.0 as usize] = Some(if promoted {
            Piece::new(mover, PieceType::Queen)
        } else {
            piece
        });

        // Castling flags flip once and stay set.
        let home = mover.home_rank();
        let flags = self.castling.side_mut(mover);
        match piece.kind {
            PieceType::King => flags.king_moved = true,
            PieceType::Rook if mv.from == Square::from_file_rank(7, home) => {
                flags.kingside_rook_moved = true;
            }
            PieceType::Rook if mv.from == Square::from_file_rank(0, home) => {
                flags.queenside_rook_moved = true;
            }
            _ => {}
        }

        // En-passant target opens for one ply after a double pawn push.
        self.en_passant = if piece.kind == PieceType::Pawn
            && mv.to.rank().abs_diff(mv.from.rank()) == 2
        {
            Some(Square::from_file_rank(
                mv.from.file(),
                (mv.from.rank() as i8 + mover.forward()) as u8,
            ))
        } else {
            None
        };

        // Fifty-move clock resets on pawn moves and captures.
        if piece.kind == PieceType::Pawn || undo.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if mover == Color::Black {
            self.fullmove_number += 1;
        }
        self.turn = !mover;

        self.rebuild_bitboards();
        undo
    }

    /// Reverse a move applied by `make_move`.
    ///
    /// Restores every field including the castling flags; callers that
    /// must preserve flag monotonicity (applied game moves) never unmake.
    pub fn unmake_move(&mut self, mv: Move, undo: Undo) {
        self.squares[mv.to.0 as usize] = None;
        self.squares[mv.from.0 as usize] = Some(undo.moved_piece);
        if let Some((sq, piece)) = undo.captured {
            self.squares[sq.0 as usize] = Some(piece);
        }
        if let Some((rook_from, rook_to)) = undo.castle_rook {
            self.squares[rook_from.0 as usize] = self.squares[rook_to.0 as usize].take();
        }
        self.castling = undo.prev_castling;
        self.en_passant = undo.prev_en_passant;
        self.halfmove_clock = undo.prev_halfmove_clock;
        self.fullmove_number = undo.prev_fullmove_number;
        self.turn = undo.moved_piece.color;
        self.rebuild_bitboards();
    }

    // -- hashing -------------------------------------------------------------

    /// FNV-1a hash of the repetition-relevant state: piece placement,
    /// castling availability, and the en-passant target.
    pub fn hash(&self) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut h = FNV_OFFSET;
        let mut mix = |byte: u8| {
            h ^= byte as u64;
            h = h.wrapping_mul(FNV_PRIME);
        };

        for sq in Square::all() {
            match self.squares[sq.0 as usize] {
                Some(piece) => mix(piece.to_char() as u8),
                None => mix(0),
            }
        }
        for byte in self.castling.to_fen().bytes() {
            mix(byte);
        }
        mix(self.en_passant.map_or(255, |sq| sq.0));
        h
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some(piece) => write!(f, "{} ", piece.to_char())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "{} to move", self.turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn start_position_layout() {
        let pos = Position::new();
        assert_eq!(
            pos.piece_at(sq("e1")),
            Some(Piece::new(Color::White, PieceType::King))
        );
        assert_eq!(
            pos.piece_at(sq("d8")),
            Some(Piece::new(Color::Black, PieceType::Queen))
        );
        assert_eq!(
            pos.piece_at(sq("a2")),
            Some(Piece::new(Color::White, PieceType::Pawn))
        );
        assert_eq!(pos.piece_at(sq("e4")), None);
        assert_eq!(pos.turn(), Color::White);
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);
    }

    #[test]
    fn start_position_bitboard_cache() {
        let pos = Position::new();
        assert_eq!(pos.pieces(Color::White, PieceType::Pawn).pop_count(), 8);
        assert_eq!(pos.pieces(Color::Black, PieceType::Knight).pop_count(), 2);
        assert_eq!(pos.occupied(Color::White).pop_count(), 16);
        assert_eq!(pos.all_occupied().pop_count(), 32);
        assert_eq!(pos.king_square(Color::White), Some(sq("e1")));
        assert_eq!(pos.king_square(Color::Black), Some(sq("e8")));
    }

    #[test]
    fn fen_round_trip() {
        for fen in [
            START_FEN,
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "8/8/8/8/3k4/8/8/3K3R b - - 12 40",
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.to_fen(), fen);
        }
    }

    #[test]
    fn from_fen_rejects_malformed() {
        assert!(Position::from_fen("").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(Position::from_fen("9/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 x - - 0 1").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - - abc 1").is_err());
    }

    #[test]
    fn make_move_simple_push() {
        let mut pos = Position::new();
        pos.make_move(Move::new(sq("e2"), sq("e4")));
        assert_eq!(pos.piece_at(sq("e2")), None);
        assert_eq!(
            pos.piece_at(sq("e4")),
            Some(Piece::new(Color::White, PieceType::Pawn))
        );
        assert_eq!(pos.turn(), Color::Black);
        assert_eq!(pos.en_passant(), Some(sq("e3")));
        assert_eq!(pos.halfmove_clock(), 0);
    }

    #[test]
    fn make_move_updates_clocks() {
        let mut pos = Position::new();
        pos.make_move(Move::new(sq("g1"), sq("f3")));
        assert_eq!(pos.halfmove_clock(), 1);
        assert_eq!(pos.fullmove_number(), 1);
        pos.make_move(Move::new(sq("g8"), sq("f6")));
        assert_eq!(pos.halfmove_clock(), 2);
        assert_eq!(pos.fullmove_number(), 2);
    }

    #[test]
    fn make_unmake_restores_everything() {
        let mut pos =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        let before = pos.to_fen();
        let before_hash = pos.hash();

        // En-passant capture.
        let mv = Move::new(sq("e5"), sq("d6"));
        let undo = pos.make_move(mv);
        assert_eq!(pos.piece_at(sq("d5")), None, "bypassed pawn removed");
        assert_eq!(
            pos.piece_at(sq("d6")),
            Some(Piece::new(Color::White, PieceType::Pawn))
        );

        pos.unmake_move(mv, undo);
        assert_eq!(pos.to_fen(), before);
        assert_eq!(pos.hash(), before_hash);
    }

    #[test]
    fn make_move_castling_moves_rook() {
        let mut pos =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mv = Move::new(sq("e1"), sq("g1"));
        let undo = pos.make_move(mv);
        assert_eq!(
            pos.piece_at(sq("g1")),
            Some(Piece::new(Color::White, PieceType::King))
        );
        assert_eq!(
            pos.piece_at(sq("f1")),
            Some(Piece::new(Color::White, PieceType::Rook))
        );
        assert_eq!(pos.piece_at(sq("h1")), None);
        assert!(pos.castling().side(Color::White).king_moved);

        pos.unmake_move(mv, undo);
        assert_eq!(pos.to_fen(), "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    }

    #[test]
    fn make_move_queenside_castling() {
        let mut pos =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
        pos.make_move(Move::new(sq("e8"), sq("c8")));
        assert_eq!(
            pos.piece_at(sq("c8")),
            Some(Piece::new(Color::Black, PieceType::King))
        );
        assert_eq!(
            pos.piece_at(sq("d8")),
            Some(Piece::new(Color::Black, PieceType::Rook))
        );
        assert_eq!(pos.piece_at(sq("a8")), None);
    }

    #[test]
    fn make_move_auto_promotes_to_queen() {
        let mut pos = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mv = Move::new(sq("a7"), sq("a8"));
        let undo = pos.make_move(mv);
        assert_eq!(
            pos.piece_at(sq("a8")),
            Some(Piece::new(Color::White, PieceType::Queen))
        );

        pos.unmake_move(mv, undo);
        assert_eq!(
            pos.piece_at(sq("a7")),
            Some(Piece::new(Color::White, PieceType::Pawn))
        );
        assert_eq!(pos.piece_at(sq("a8")), None);
    }

    #[test]
    fn rook_move_sets_one_flag() {
        let mut pos =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        pos.make_move(Move::new(sq("a1"), sq("a4")));
        assert!(!pos.castling().can_castle_queenside(Color::White));
        assert!(pos.castling().can_castle_kingside(Color::White));
        assert!(pos.castling().can_castle_kingside(Color::Black));
    }

    #[test]
    fn capture_resets_halfmove_clock() {
        let mut pos =
            Position::from_fen("4k3/8/3p4/8/4N3/8/8/4K3 w - - 7 10").unwrap();
        pos.make_move(Move::new(sq("e4"), sq("d6")));
        assert_eq!(pos.halfmove_clock(), 0);
    }

    #[test]
    fn en_passant_window_closes() {
        let mut pos = Position::new();
        pos.make_move(Move::new(sq("e2"), sq("e4")));
        assert_eq!(pos.en_passant(), Some(sq("e3")));
        pos.make_move(Move::new(sq("g8"), sq("f6")));
        assert_eq!(pos.en_passant(), None);
    }

    #[test]
    fn hash_equal_for_repeated_position() {
        let mut pos = Position::new();
        let h0 = pos.hash();
        pos.make_move(Move::new(sq("g1"), sq("f3")));
        pos.make_move(Move::new(sq("g8"), sq("f6")));
        pos.make_move(Move::new(sq("f3"), sq("g1")));
        pos.make_move(Move::new(sq("f6"), sq("g8")));
        assert_eq!(pos.hash(), h0);
    }

    #[test]
    fn hash_differs_by_en_passant_target() {
        // Same placement, but one position still has the d6 target open.
        let a =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        let b =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3")
                .unwrap();
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn cache_stays_consistent_through_moves() {
        let mut pos = Position::new();
        for (from, to) in [("e2", "e4"), ("d7", "d5"), ("e4", "d5"), ("d8", "d5")] {
            pos.make_move(Move::new(sq(from), sq(to)));
            #[cfg(debug_assertions)]
            pos.assert_consistent();
        }
        assert_eq!(pos.pieces(Color::White, PieceType::Pawn).pop_count(), 7);
        assert_eq!(pos.pieces(Color::Black, PieceType::Pawn).pop_count(), 7);
        assert_eq!(
            pos.piece_at(sq("d5")),
            Some(Piece::new(Color::Black, PieceType::Queen))
        );
    }
}
