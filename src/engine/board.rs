//! Bitboard-based chess position representation.
//!
//! `Position` stores piece placement as 12 bitboards (2 colours × 6 piece
//! types), redundant occupancy bitboards, side to move, castling rights,
//! en-passant square, and the move counters. Moves are applied with
//! `make_move`, which returns the `UndoInfo` needed to restore the exact
//! prior state with `undo_move`.

use crate::engine::attacks;
use crate::engine::types::{Bitboard, CastlingRights, ChessError, Color, Move, PieceType, Square};

/// The standard starting position.
pub const FEN_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ---------------------------------------------------------------------------
// UndoInfo — saved state for reversing a move
// ---------------------------------------------------------------------------

/// State that must be saved before making a move so it can be restored on
/// undo. The side to move is not stored; it is always the opposite of the
/// post-move side.
#[derive(Clone, Debug)]
pub struct UndoInfo {
    pub captured_piece: Option<PieceType>,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete chess position using bitboard representation.
///
/// Board layout uses the big-endian rank mapping: a8 = 0, b8 = 1, … h8 = 7,
/// a7 = 8, … h1 = 63.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Piece bitboards: `pieces[color][piece_type]`.
    pub pieces: [[Bitboard; PieceType::COUNT]; 2],

    /// Per-colour occupancy (union of all piece bitboards for that colour).
    pub occupied: [Bitboard; 2],

    /// Total occupancy (union of both colours).
    pub all_occupied: Bitboard,

    /// Whose turn it is.
    pub side_to_move: Color,

    /// Castling availability (K/Q/k/q).
    pub castling_rights: CastlingRights,

    /// En-passant target square (the square *behind* the double-pushed pawn).
    pub en_passant: Option<Square>,

    /// Half-move clock (reset on pawn move or capture).
    pub halfmove_clock: u16,

    /// Full-move number (starts at 1, incremented after Black moves).
    pub fullmove_number: u16,
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

impl Position {
    /// Create an empty board with no pieces.
    pub fn empty() -> Self {
        Position {
            pieces: [[Bitboard::EMPTY; PieceType::COUNT]; 2],
            occupied: [Bitboard::EMPTY; 2],
            all_occupied: Bitboard::EMPTY,
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_fen(FEN_STARTPOS).expect("starting FEN is always valid")
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    /// Place a piece on a square, keeping occupancy caches in sync.
    #[inline]
    pub fn put_piece(&mut self, sq: Square, color: Color, piece: PieceType) {
        let bb = Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] |= bb;
        self.occupied[color.index()] |= bb;
        self.all_occupied |= bb;
    }

    /// Remove a piece from a square, keeping occupancy caches in sync.
    #[inline]
    pub fn remove_piece(&mut self, sq: Square, color: Color, piece: PieceType) {
        let bb = Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] &= !bb;
        self.occupied[color.index()] &= !bb;
        self.all_occupied &= !bb;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a given square?
    pub fn piece_at(&self, sq: Square) -> Option<(Color, PieceType)> {
        let bb = Bitboard::from_square(sq);

        if (self.all_occupied & bb).is_empty() {
            return None;
        }

        let color = if (self.occupied[Color::White.index()] & bb).is_not_empty() {
            Color::White
        } else {
            Color::Black
        };

        for &pt in &PieceType::ALL {
            if (self.pieces[color.index()][pt.index()] & bb).is_not_empty() {
                return Some((color, pt));
            }
        }

        // Unreachable when occupancy is consistent.
        None
    }

    /// Which piece of `color` (if any) is on `sq`? Scans that colour's six
    /// bitboards only.
    #[inline]
    pub fn piece_type_on(&self, sq: Square, color: Color) -> Option<PieceType> {
        let bb = Bitboard::from_square(sq);
        if (self.occupied[color.index()] & bb).is_empty() {
            return None;
        }
        for &pt in &PieceType::ALL {
            if (self.pieces[color.index()][pt.index()] & bb).is_not_empty() {
                return Some(pt);
            }
        }
        None
    }

    /// Bitboard of all pieces of a given colour and type.
    #[inline]
    pub fn bb(&self, color: Color, piece: PieceType) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    /// Bitboard of friendly (side-to-move) pieces.
    #[inline]
    pub fn friendly(&self) -> Bitboard {
        self.occupied[self.side_to_move.index()]
    }

    /// Bitboard of enemy pieces.
    #[inline]
    pub fn enemy(&self) -> Bitboard {
        self.occupied[(!self.side_to_move).index()]
    }

    /// Find the king square for the given colour.
    #[inline]
    pub fn king_sq(&self, color: Color) -> Square {
        self.pieces[color.index()][PieceType::King.index()]
            .lsb()
            .expect("king must exist")
    }

    // -----------------------------------------------------------------------
    // Occupancy sanity check (debug builds)
    // -----------------------------------------------------------------------

    /// Verify that redundant occupancy bitboards are consistent with piece
    /// bitboards and that the twelve piece sets are pairwise disjoint.
    #[cfg(any(debug_assertions, test))]
    pub fn assert_consistent(&self) {
        for color in [Color::White, Color::Black] {
            let mut expected = Bitboard::EMPTY;
            for &pt in &PieceType::ALL {
                let bb = self.pieces[color.index()][pt.index()];
                assert!(
                    (expected & bb).is_empty(),
                    "overlapping piece bitboards for {color:?} {pt:?}",
                );
                expected |= bb;
            }
            assert_eq!(
                self.occupied[color.index()],
                expected,
                "occupancy mismatch for {color:?}",
            );
        }
        assert!(
            (self.occupied[0] & self.occupied[1]).is_empty(),
            "colour occupancies overlap",
        );
        assert_eq!(
            self.all_occupied,
            self.occupied[0] | self.occupied[1],
            "all_occupied mismatch",
        );
    }

    // -----------------------------------------------------------------------
    // Attack detection
    // -----------------------------------------------------------------------

    /// Is `sq` attacked by any piece of colour `by`?
    ///
    /// Reverse lookups throughout: compute the attack set *from* `sq` and
    /// intersect with `by`'s pieces of the matching kind. For pawns the
    /// attack set of the opposite colour is the set of squares a `by` pawn
    /// would attack `sq` from.
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let here = Bitboard::from_square(sq);
        let occ = self.all_occupied;

        if (attacks::pawn_attacks(!by, here) & self.bb(by, PieceType::Pawn)).is_not_empty() {
            return true;
        }

        if (attacks::knight_attacks(here) & self.bb(by, PieceType::Knight)).is_not_empty() {
            return true;
        }

        if (attacks::king_attacks(here) & self.bb(by, PieceType::King)).is_not_empty() {
            return true;
        }

        let rook_queen = self.bb(by, PieceType::Rook) | self.bb(by, PieceType::Queen);
        if (attacks::rook_attacks(here, occ) & rook_queen).is_not_empty() {
            return true;
        }

        let bishop_queen = self.bb(by, PieceType::Bishop) | self.bb(by, PieceType::Queen);
        if (attacks::bishop_attacks(here, occ) & bishop_queen).is_not_empty() {
            return true;
        }

        false
    }

    /// Is the side-to-move's king currently in check?
    #[inline]
    pub fn is_in_check(&self) -> bool {
        let king = self.king_sq(self.side_to_move);
        self.is_square_attacked(king, !self.side_to_move)
    }

    // -----------------------------------------------------------------------
    // Make / Undo move
    // -----------------------------------------------------------------------

    /// Apply a move to the position. Returns `UndoInfo` for reversal.
    ///
    /// The move must come from the generator for this position (its `piece`
    /// and `captured` fields are trusted). Legality is the caller's concern.
    pub fn make_move(&mut self, mv: Move) -> UndoInfo {
        let us = self.side_to_move;
        let them = !us;

        let undo = UndoInfo {
            captured_piece: mv.captured,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        };

        // ---- Halfmove clock: reset on pawn move or capture ----
        if mv.piece == PieceType::Pawn || mv.flags.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        // ---- En-passant target lapses unless re-set by a double push ----
        self.en_passant = None;

        // ---- Remove the captured piece ----
        if mv.flags.is_en_passant() {
            // The victim sits one rank behind the target square.
            let cap_sq = match us {
                Color::White => Square(mv.to.0 + 8),
                Color::Black => Square(mv.to.0 - 8),
            };
            self.remove_piece(cap_sq, them, PieceType::Pawn);
        } else if let Some(captured) = mv.captured {
            self.remove_piece(mv.to, them, captured);
        }

        // ---- Move the piece (promotions land as the promoted piece) ----
        self.remove_piece(mv.from, us, mv.piece);
        self.put_piece(mv.to, us, mv.promotion.unwrap_or(mv.piece));

        // ---- Castling: move the rook as well ----
        if mv.flags.is_castling() {
            let (rook_from, rook_to) = castling_rook_squares(mv.to);
            self.remove_piece(rook_from, us, PieceType::Rook);
            self.put_piece(rook_to, us, PieceType::Rook);
        }

        // ---- Castling rights: any move touching a king home square or rook
        //      home corner clears the affected bits ----
        self.castling_rights.0 &= CASTLING_MASK[mv.from.0 as usize];
        self.castling_rights.0 &= CASTLING_MASK[mv.to.0 as usize];

        // ---- Double pawn push → new en-passant target ----
        if mv.flags.is_double_push() {
            let ep_sq = match us {
                Color::White => Square(mv.to.0 + 8),
                Color::Black => Square(mv.to.0 - 8),
            };
            self.en_passant = Some(ep_sq);
        }

        // ---- Fullmove number ----
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        // ---- Switch side ----
        self.side_to_move = them;

        undo
    }

    /// Reverse a move previously applied with `make_move`. The position is
    /// restored bit-for-bit.
    pub fn undo_move(&mut self, mv: Move, undo: &UndoInfo) {
        let them = self.side_to_move; // after make_move, side was switched
        let us = !them;
        self.side_to_move = us;

        // ---- Put the mover back (promotions revert to the pawn) ----
        let landing_piece = mv.promotion.unwrap_or(mv.piece);
        self.remove_piece(mv.to, us, landing_piece);
        self.put_piece(mv.from, us, mv.piece);

        // ---- Restore the capture ----
        if mv.flags.is_en_passant() {
            let cap_sq = match us {
                Color::White => Square(mv.to.0 + 8),
                Color::Black => Square(mv.to.0 - 8),
            };
            self.put_piece(cap_sq, them, PieceType::Pawn);
        } else if let Some(cap_piece) = undo.captured_piece {
            self.put_piece(mv.to, them, cap_piece);
        }

        // ---- Undo castling: move the rook back ----
        if mv.flags.is_castling() {
            let (rook_from, rook_to) = castling_rook_squares(mv.to);
            self.remove_piece(rook_to, us, PieceType::Rook);
            self.put_piece(rook_from, us, PieceType::Rook);
        }

        // ---- Restore saved state ----
        self.castling_rights = undo.castling_rights;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top).
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                let ch = match self.piece_at(sq) {
                    Some((c, p)) => p.to_char(c),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

// ---------------------------------------------------------------------------
// Castling helpers (free functions)
// ---------------------------------------------------------------------------

/// For a king-destination square (after castling), return (rook_from, rook_to).
fn castling_rook_squares(king_to: Square) -> (Square, Square) {
    match king_to.0 {
        // Black kingside: king e8→g8 (4→6), rook h8→f8 (7→5).
        6 => (Square(7), Square(5)),
        // Black queenside: king e8→c8 (4→2), rook a8→d8 (0→3).
        2 => (Square(0), Square(3)),
        // White kingside: king e1→g1 (60→62), rook h1→f1 (63→61).
        62 => (Square(63), Square(61)),
        // White queenside: king e1→c1 (60→58), rook a1→d1 (56→59).
        58 => (Square(56), Square(59)),
        _ => panic!("invalid castling king destination: {king_to}"),
    }
}

/// Mask table indexed by square. When a move touches a square, AND the
/// castling rights with this mask: a rook leaving (or being captured on) its
/// home corner drops that wing's right, and the king leaving home drops both.
#[rustfmt::skip]
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    // a8 (0): remove black-queenside
    mask[0]  = 0b1111 & !CastlingRights::BLACK_QUEENSIDE;
    // e8 (4): remove both black rights
    mask[4]  = 0b1111 & !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
    // h8 (7): remove black-kingside
    mask[7]  = 0b1111 & !CastlingRights::BLACK_KINGSIDE;
    // a1 (56): remove white-queenside
    mask[56] = 0b1111 & !CastlingRights::WHITE_QUEENSIDE;
    // e1 (60): remove both white rights
    mask[60] = 0b1111 & !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
    // h1 (63): remove white-kingside
    mask[63] = 0b1111 & !CastlingRights::WHITE_KINGSIDE;
    mask
};

// ---------------------------------------------------------------------------
// FEN parsing & generation
// ---------------------------------------------------------------------------

impl Position {
    /// Parse a FEN string into a `Position`.
    ///
    /// The first four fields are required; the halfmove clock and fullmove
    /// number default to 0 and 1 when absent. A fresh `Position` is built and
    /// returned only on success, so no caller state is ever left half-parsed.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(ChessError::InvalidFen(format!(
                "expected 4 to 6 fields, got {}",
                fields.len()
            )));
        }

        let mut pos = Position::empty();

        // ----- Field 1: Piece placement (rank 8 first) -----
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (row, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - row as u8;
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidFen(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as u8;
                } else if let Some((color, piece)) = PieceType::from_char(ch) {
                    pos.put_piece(Square::from_file_rank(file, rank), color, piece);
                    file += 1;
                } else {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {} has {} squares instead of 8",
                    rank + 1,
                    file
                )));
            }
        }

        // Validate exactly one king per side and no pawns on the back ranks.
        for color in [Color::White, Color::Black] {
            let king_count = pos.pieces[color.index()][PieceType::King.index()].pop_count();
            if king_count != 1 {
                return Err(ChessError::InvalidFen(format!(
                    "{color} has {king_count} kings (expected 1)"
                )));
            }
            let back_ranks = Bitboard(attacks::RANK_1 | attacks::RANK_8);
            if (pos.bb(color, PieceType::Pawn) & back_ranks).is_not_empty() {
                return Err(ChessError::InvalidFen(format!(
                    "{color} pawn on rank 1 or 8"
                )));
            }
        }

        // ----- Field 2: Side to move -----
        pos.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        // ----- Field 3: Castling availability -----
        pos.castling_rights = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
        })?;

        // ----- Field 4: En passant target square -----
        if fields[3] != "-" {
            let ep_sq = Square::from_algebraic(fields[3]).ok_or_else(|| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            // Rank 6 when White is to move (Black just double-pushed),
            // rank 3 when Black is to move.
            let expected_rank = match pos.side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            if ep_sq.rank() != expected_rank {
                return Err(ChessError::InvalidFen(format!(
                    "en passant square {} is on the wrong rank for {} to move",
                    fields[3], pos.side_to_move
                )));
            }
            pos.en_passant = Some(ep_sq);
        }

        // ----- Field 5: Halfmove clock (optional) -----
        if let Some(half) = fields.get(4) {
            pos.halfmove_clock = half.parse::<u16>().map_err(|_| {
                ChessError::InvalidFen(format!("invalid halfmove clock: '{half}'"))
            })?;
        }

        // ----- Field 6: Fullmove number (optional) -----
        if let Some(full) = fields.get(5) {
            pos.fullmove_number = full.parse::<u16>().map_err(|_| {
                ChessError::InvalidFen(format!("invalid fullmove number: '{full}'"))
            })?;
            if pos.fullmove_number == 0 {
                return Err(ChessError::InvalidFen(
                    "fullmove number must be >= 1".to_string(),
                ));
            }
        }

        #[cfg(debug_assertions)]
        pos.assert_consistent();

        Ok(pos)
    }

    /// Export the position as a canonical FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        // ----- Field 1: Piece placement -----
        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some((color, piece)) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.to_char(color));
                    }
                    None => {
                        empty_count += 1;
                    }
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        // ----- Field 2: Side to move -----
        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        // ----- Field 3: Castling -----
        fen.push(' ');
        fen.push_str(&self.castling_rights.to_fen());

        // ----- Field 4: En passant -----
        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        // ----- Field 5: Halfmove clock -----
        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());

        // ----- Field 6: Fullmove number -----
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
