use std::fmt;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Index for array lookups: White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Direction pawns of this color advance in (rank delta).
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank on which this color's pieces start (0 for White, 7 for Black).
    #[inline]
    pub const fn home_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// All piece types in order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Number of piece types.
    pub const COUNT: usize = 6;

    /// Index for array lookups: Pawn=0 .. King=5.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Material value in centipawns.
    pub fn value(self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::Knight => 320,
            PieceType::Bishop => 330,
            PieceType::Rook => 500,
            PieceType::Queen => 900,
            PieceType::King => 0, // not used numerically
        }
    }

    /// Single uppercase letter for white, lowercase for black.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parse a piece character (uppercase = white, lowercase = black).
    pub fn from_char(c: char) -> Option<(Color, PieceType)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some((color, piece))
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A colored piece as stored in a board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceType,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, kind: PieceType) -> Self {
        Piece { color, kind }
    }

    /// FEN-style character ('P' white pawn, 'k' black king, ...).
    pub fn to_char(self) -> char {
        self.kind.to_char(self.color)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square on the chess board (0..63, LERF: a1=0, h8=63).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Square(pub u8);

impl Square {
    pub const NUM: usize = 64;

    #[inline]
    pub fn new(index: u8) -> Self {
        debug_assert!(index < 64, "Square index out of range: {index}");
        Square(index)
    }

    #[inline]
    pub fn file(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.0 >> 3
    }

    #[inline]
    pub fn from_file_rank(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    /// Offset by (file delta, rank delta). `None` if off the board.
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square::from_file_rank(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// Iterate over all 64 squares (a1 first).
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file < 8 && rank < 8 {
            Some(Square::from_file_rank(file, rank))
        } else {
            None
        }
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.file()) as char;
        let rank = (b'1' + self.rank()) as char;
        format!("{file}{rank}")
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

// ---------------------------------------------------------------------------
// Bitboard
// ---------------------------------------------------------------------------

/// A 64-bit bitboard — one bit per square.
///
/// Used only as a derived acceleration cache over the mailbox board;
/// never the source of truth.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    #[inline]
    pub fn from_square(sq: Square) -> Self {
        Bitboard(1u64 << sq.0)
    }

    #[inline]
    pub fn is_set(self, sq: Square) -> bool {
        self.0 & (1u64 << sq.0) != 0
    }

    #[inline]
    pub fn set(&mut self, sq: Square) {
        self.0 |= 1u64 << sq.0;
    }

    #[inline]
    pub fn pop_count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Least significant bit index (first set square).
    #[inline]
    pub fn lsb(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Some(Square(self.0.trailing_zeros() as u8))
        }
    }

    /// Pop the least significant bit, returning the square.
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            let sq = Square(self.0.trailing_zeros() as u8);
            self.0 &= self.0 - 1; // clear LSB
            Some(sq)
        }
    }

    /// Iterate over all set bit positions as `Square`s.
    #[inline]
    pub fn iter(self) -> BitboardIter {
        BitboardIter(self)
    }
}

/// Iterator over set bits in a `Bitboard`.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        self.0.pop_lsb()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.0.pop_count() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl std::ops::BitOr for Bitboard {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Bitboard(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitboard(0x{:016x})", self.0)?;
        for rank in (0..8).rev() {
            write!(f, "  {} ", rank + 1)?;
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                write!(f, "{}", if self.is_set(sq) { '1' } else { '.' })?;
                if file < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "    a b c d e f g h")
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// A move request: source and destination square.
///
/// Special effects (en-passant removal, castling rook relocation,
/// auto-promotion) are inferred from the board when the move is applied,
/// so no extra flags are carried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }

    /// Parse coordinate notation like "e2e4".
    pub fn from_coords(s: &str) -> Option<Self> {
        if s.len() != 4 {
            return None;
        }
        let from = Square::from_algebraic(s.get(..2)?)?;
        let to = Square::from_algebraic(s.get(2..)?)?;
        Some(Move { from, to })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

// ---------------------------------------------------------------------------
// CastlingFlags
// ---------------------------------------------------------------------------

/// One side's castling bookkeeping.
///
/// A flag flips false→true when the piece first leaves its home square
/// and is never cleared again by an applied move (the search's unmake
/// restores flags on its private scratch copy only).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SideFlags {
    pub king_moved: bool,
    pub kingside_rook_moved: bool,
    pub queenside_rook_moved: bool,
}

/// Both sides' castling bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CastlingFlags {
    pub white: SideFlags,
    pub black: SideFlags,
}

impl CastlingFlags {
    /// Fresh game: nothing has moved.
    pub const INITIAL: CastlingFlags = CastlingFlags {
        white: SideFlags {
            king_moved: false,
            kingside_rook_moved: false,
            queenside_rook_moved: false,
        },
        black: SideFlags {
            king_moved: false,
            kingside_rook_moved: false,
            queenside_rook_moved: false,
        },
    };

    #[inline]
    pub fn side(&self, color: Color) -> &SideFlags {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    #[inline]
    pub fn side_mut(&mut self, color: Color) -> &mut SideFlags {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Kingside castling still available for `color` (rights only; board
    /// conditions are checked separately).
    #[inline]
    pub fn can_castle_kingside(&self, color: Color) -> bool {
        let s = self.side(color);
        !s.king_moved && !s.kingside_rook_moved
    }

    /// Queenside castling still available for `color`.
    #[inline]
    pub fn can_castle_queenside(&self, color: Color) -> bool {
        let s = self.side(color);
        !s.king_moved && !s.queenside_rook_moved
    }

    /// Parse FEN castling availability ("KQkq", "Kq", "-", ...).
    pub fn from_fen(s: &str) -> Option<Self> {
        let mut wk = false;
        let mut wq = false;
        let mut bk = false;
        let mut bq = false;
        if s != "-" {
            if s.is_empty() {
                return None;
            }
            for c in s.chars() {
                match c {
                    'K' => wk = true,
                    'Q' => wq = true,
                    'k' => bk = true,
                    'q' => bq = true,
                    _ => return None,
                }
            }
        }
        Some(CastlingFlags {
            white: SideFlags {
                king_moved: !wk && !wq,
                kingside_rook_moved: !wk,
                queenside_rook_moved: !wq,
            },
            black: SideFlags {
                king_moved: !bk && !bq,
                kingside_rook_moved: !bk,
                queenside_rook_moved: !bq,
            },
        })
    }

    /// FEN castling availability string.
    pub fn to_fen(&self) -> String {
        let mut s = String::with_capacity(4);
        if self.can_castle_kingside(Color::White) {
            s.push('K');
        }
        if self.can_castle_queenside(Color::White) {
            s.push('Q');
        }
        if self.can_castle_kingside(Color::Black) {
            s.push('k');
        }
        if self.can_castle_queenside(Color::Black) {
            s.push('q');
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }
}

impl fmt::Display for CastlingFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Current status of a game, from the point of view of the side to move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
    Draw(DrawReason),
}

impl GameStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Draw(reason) => reason.as_str(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate | GameStatus::Stalemate | GameStatus::Draw(_)
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reason for a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawReason {
    FiftyMoveRule,
    ThreefoldRepetition,
}

impl DrawReason {
    pub fn as_str(&self) -> &str {
        match self {
            DrawReason::FiftyMoveRule => "fifty_move_rule",
            DrawReason::ThreefoldRepetition => "threefold_repetition",
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a move request was rejected. Rejections never mutate the game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// No piece of the side to move on the source square, or the
    /// destination holds a friendly piece.
    #[error("invalid selection: {from} -> {to}")]
    InvalidSelection { from: Square, to: Square },

    /// The piece's movement-shape rule is not satisfied or its path is
    /// blocked.
    #[error("illegal shape: {from} -> {to}")]
    IllegalShape { from: Square, to: Square },

    /// Shape-valid, but the move would leave the mover's own king attacked.
    #[error("move exposes own king to check: {from} -> {to}")]
    ExposesCheck { from: Square, to: Square },
}

/// Errors for state loading (FEN, snapshots).
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("invalid FEN string: {0}")]
    InvalidFen(String),

    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_toggle() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(!Color::Black, Color::White);
    }

    #[test]
    fn color_forward_direction() {
        assert_eq!(Color::White.forward(), 1);
        assert_eq!(Color::Black.forward(), -1);
    }

    #[test]
    fn piece_type_values() {
        assert_eq!(PieceType::Pawn.value(), 100);
        assert_eq!(PieceType::Knight.value(), 320);
        assert_eq!(PieceType::Bishop.value(), 330);
        assert_eq!(PieceType::Rook.value(), 500);
        assert_eq!(PieceType::Queen.value(), 900);
        assert_eq!(PieceType::King.value(), 0);
    }

    #[test]
    fn piece_type_char_round_trip() {
        for pt in PieceType::ALL {
            let wc = pt.to_char(Color::White);
            let bc = pt.to_char(Color::Black);
            assert!(wc.is_ascii_uppercase());
            assert!(bc.is_ascii_lowercase());
            assert_eq!(PieceType::from_char(wc), Some((Color::White, pt)));
            assert_eq!(PieceType::from_char(bc), Some((Color::Black, pt)));
        }
    }

    #[test]
    fn piece_type_from_char_invalid() {
        assert_eq!(PieceType::from_char('x'), None);
        assert_eq!(PieceType::from_char('1'), None);
    }

    #[test]
    fn square_algebraic_round_trip() {
        for i in 0..64 {
            let sq = Square(i);
            let alg = sq.to_algebraic();
            assert_eq!(Square::from_algebraic(&alg), Some(sq));
        }
    }

    #[test]
    fn square_corners() {
        assert_eq!(Square::from_algebraic("a1"), Some(Square(0)));
        assert_eq!(Square::from_algebraic("h1"), Some(Square(7)));
        assert_eq!(Square::from_algebraic("a8"), Some(Square(56)));
        assert_eq!(Square::from_algebraic("h8"), Some(Square(63)));
    }

    #[test]
    fn square_file_rank() {
        let e4 = Square::from_algebraic("e4").unwrap();
        assert_eq!(e4.file(), 4);
        assert_eq!(e4.rank(), 3);
    }

    #[test]
    fn square_offset() {
        let e4 = Square::from_algebraic("e4").unwrap();
        assert_eq!(e4.offset(1, 1), Square::from_algebraic("f5"));
        assert_eq!(e4.offset(-4, 0), Square::from_algebraic("a4"));
        assert_eq!(e4.offset(-5, 0), None);
        assert_eq!(Square(63).offset(1, 0), None);
        assert_eq!(Square(0).offset(0, -1), None);
    }

    #[test]
    fn square_from_algebraic_invalid() {
        assert_eq!(Square::from_algebraic(""), None);
        assert_eq!(Square::from_algebraic("a"), None);
        assert_eq!(Square::from_algebraic("a9"), None);
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("abc"), None);
    }

    #[test]
    fn bitboard_basic_ops() {
        let mut bb = Bitboard::EMPTY;
        assert!(bb.is_empty());
        assert_eq!(bb.pop_count(), 0);

        let e4 = Square::from_algebraic("e4").unwrap();
        bb.set(e4);
        assert!(bb.is_set(e4));
        assert_eq!(bb.pop_count(), 1);
    }

    #[test]
    fn bitboard_lsb_pop() {
        let mut bb = Bitboard::from_square(Square(0)) | Bitboard::from_square(Square(5));
        assert_eq!(bb.lsb(), Some(Square(0)));
        assert_eq!(bb.pop_lsb(), Some(Square(0)));
        assert_eq!(bb.pop_lsb(), Some(Square(5)));
        assert_eq!(bb.pop_lsb(), None);
    }

    #[test]
    fn bitboard_iter() {
        let bb = Bitboard::from_square(Square(0))
            | Bitboard::from_square(Square(10))
            | Bitboard::from_square(Square(63));
        let squares: Vec<Square> = bb.iter().collect();
        assert_eq!(squares, vec![Square(0), Square(10), Square(63)]);
    }

    #[test]
    fn move_display_and_parse() {
        let m = Move::from_coords("e2e4").unwrap();
        assert_eq!(m.from, Square::from_algebraic("e2").unwrap());
        assert_eq!(m.to, Square::from_algebraic("e4").unwrap());
        assert_eq!(m.to_string(), "e2e4");
        assert_eq!(Move::from_coords("e2"), None);
        assert_eq!(Move::from_coords("e2e9"), None);
    }

    #[test]
    fn move_parse_rejects_non_ascii() {
        // Multi-byte characters must come back as None, not split a
        // char boundary.
        assert_eq!(Move::from_coords("\u{0800}a"), None);
        assert_eq!(Move::from_coords("e2é"), None);
        assert_eq!(Move::from_coords("ée2"), None);
    }

    #[test]
    fn castling_flags_initial() {
        let cf = CastlingFlags::INITIAL;
        assert!(cf.can_castle_kingside(Color::White));
        assert!(cf.can_castle_queenside(Color::White));
        assert!(cf.can_castle_kingside(Color::Black));
        assert!(cf.can_castle_queenside(Color::Black));
    }

    #[test]
    fn castling_flags_king_move_loses_both() {
        let mut cf = CastlingFlags::INITIAL;
        cf.side_mut(Color::White).king_moved = true;
        assert!(!cf.can_castle_kingside(Color::White));
        assert!(!cf.can_castle_queenside(Color::White));
        assert!(cf.can_castle_kingside(Color::Black));
    }

    #[test]
    fn castling_flags_rook_move_loses_one_side() {
        let mut cf = CastlingFlags::INITIAL;
        cf.side_mut(Color::Black).kingside_rook_moved = true;
        assert!(!cf.can_castle_kingside(Color::Black));
        assert!(cf.can_castle_queenside(Color::Black));
    }

    #[test]
    fn castling_flags_fen_round_trip() {
        for s in ["-", "K", "Kq", "KQkq", "kq", "Q"] {
            let cf = CastlingFlags::from_fen(s).unwrap();
            assert_eq!(cf.to_fen(), s);
        }
    }

    #[test]
    fn castling_flags_from_fen_invalid() {
        assert_eq!(CastlingFlags::from_fen("X"), None);
        assert_eq!(CastlingFlags::from_fen("KZ"), None);
        assert_eq!(CastlingFlags::from_fen(""), None);
    }

    #[test]
    fn game_status_strings() {
        assert_eq!(GameStatus::Active.as_str(), "active");
        assert_eq!(GameStatus::Check.as_str(), "check");
        assert_eq!(GameStatus::Checkmate.as_str(), "checkmate");
        assert_eq!(GameStatus::Stalemate.as_str(), "stalemate");
        assert_eq!(
            GameStatus::Draw(DrawReason::FiftyMoveRule).as_str(),
            "fifty_move_rule"
        );
        assert_eq!(
            GameStatus::Draw(DrawReason::ThreefoldRepetition).as_str(),
            "threefold_repetition"
        );
    }

    #[test]
    fn game_status_is_game_over() {
        assert!(!GameStatus::Active.is_game_over());
        assert!(!GameStatus::Check.is_game_over());
        assert!(GameStatus::Checkmate.is_game_over());
        assert!(GameStatus::Stalemate.is_game_over());
        assert!(GameStatus::Draw(DrawReason::FiftyMoveRule).is_game_over());
    }

    #[test]
    fn move_error_messages() {
        let e = MoveError::ExposesCheck {
            from: Square(4),
            to: Square(12),
        };
        assert!(e.to_string().contains("e1"));
        assert!(e.to_string().contains("e2"));
    }
}
