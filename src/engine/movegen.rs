//! Move generation.
//!
//! Pipeline:
//!   1. Generate pseudo-legal moves (ignoring pins / check evasion).
//!   2. Filter: make the move on a copy, verify the king is not in check.
//!
//! Emission order is deterministic and part of the API contract: pawn quiet
//! single-pushes, double-pushes, promotion pushes (Q,R,B,N), captures (west
//! then east), capture-promotions (west then east), en passant; then knights,
//! bishops, rooks, queens, king moves, and castling (king-side first). Within
//! each phase, squares are consumed LSB-up.

use crate::engine::attacks;
use crate::engine::attacks::{RANK_1, RANK_3, RANK_6, RANK_8};
use crate::engine::board::Position;
use crate::engine::types::{Bitboard, CastlingRights, Color, Move, MoveList, PieceType, Square};

// =========================================================================
// Public API
// =========================================================================

/// Generate all legal moves for the side to move.
pub fn legal_moves(pos: &Position) -> MoveList {
    let pseudo = pseudo_legal_moves(pos);

    // Filter: after each move the mover's own king must not be attacked.
    let mut legal = MoveList::new();
    for &mv in &pseudo {
        let mut copy = pos.clone();
        copy.make_move(mv);
        let mover = !copy.side_to_move;
        if !copy.is_square_attacked(copy.king_sq(mover), copy.side_to_move) {
            legal.push(mv);
        }
    }
    legal
}

/// Generate all pseudo-legal moves for the side to move. Castling already
/// checks its transit squares; everything else may leave the king in check.
pub fn pseudo_legal_moves(pos: &Position) -> MoveList {
    let mut moves = MoveList::new();
    let us = pos.side_to_move;
    generate_pawn_moves(pos, us, &mut moves);
    generate_piece_moves(pos, us, PieceType::Knight, &mut moves);
    generate_piece_moves(pos, us, PieceType::Bishop, &mut moves);
    generate_piece_moves(pos, us, PieceType::Rook, &mut moves);
    generate_piece_moves(pos, us, PieceType::Queen, &mut moves);
    generate_piece_moves(pos, us, PieceType::King, &mut moves);
    generate_castling_moves(pos, us, &mut moves);
    moves
}

// =========================================================================
// Pawn moves (set-wise: whole pawn bitboards shifted per phase)
// =========================================================================

/// Source square of a pawn move, given its destination and the signed
/// index offset back to the origin.
#[inline]
fn pawn_from(to: Square, back: i8) -> Square {
    Square((to.0 as i8 + back) as u8)
}

fn generate_pawn_moves(pos: &Position, us: Color, moves: &mut MoveList) {
    let pawns = pos.bb(us, PieceType::Pawn);
    let empty = !pos.all_occupied;
    let enemy = pos.enemy();
    let them = !us;

    // Direction-dependent machinery: the forward shift, the rank a single
    // push must cross for a double push to follow, the promotion rank, and
    // the index offsets from a destination back to its source.
    let (single, double, promo_rank, back_push, back_double, back_west, back_east): (
        Bitboard,
        Bitboard,
        u64,
        i8,
        i8,
        i8,
        i8,
    ) = match us {
        Color::White => {
            let single = attacks::north(pawns) & empty;
            let double = attacks::north(single & Bitboard(RANK_3)) & empty;
            (single, double, RANK_8, 8, 16, 9, 7)
        }
        Color::Black => {
            let single = attacks::south(pawns) & empty;
            let double = attacks::south(single & Bitboard(RANK_6)) & empty;
            (single, double, RANK_1, -8, -16, -7, -9)
        }
    };

    // --- Quiet single pushes (promotions handled separately) ---
    for to in (single & !Bitboard(promo_rank)).iter() {
        moves.push(Move::quiet(pawn_from(to, back_push), to, PieceType::Pawn));
    }

    // --- Double pushes ---
    for to in double.iter() {
        moves.push(Move::double_push(pawn_from(to, back_double), to));
    }

    // --- Promotion pushes ---
    for to in (single & Bitboard(promo_rank)).iter() {
        let from = pawn_from(to, back_push);
        for promo in PROMOTION_PIECES {
            moves.push(Move::promotion(from, to, promo, None));
        }
    }

    // --- Captures, west diagonal then east diagonal ---
    let west_hits = attacks::pawn_west_attacks(us, pawns) & enemy;
    let east_hits = attacks::pawn_east_attacks(us, pawns) & enemy;

    for to in (west_hits & !Bitboard(promo_rank)).iter() {
        let captured = captured_on(pos, to, them);
        moves.push(Move::capture(pawn_from(to, back_west), to, PieceType::Pawn, captured));
    }
    for to in (east_hits & !Bitboard(promo_rank)).iter() {
        let captured = captured_on(pos, to, them);
        moves.push(Move::capture(pawn_from(to, back_east), to, PieceType::Pawn, captured));
    }

    // --- Capture promotions, west then east ---
    for to in (west_hits & Bitboard(promo_rank)).iter() {
        let from = pawn_from(to, back_west);
        let captured = captured_on(pos, to, them);
        for promo in PROMOTION_PIECES {
            moves.push(Move::promotion(from, to, promo, Some(captured)));
        }
    }
    for to in (east_hits & Bitboard(promo_rank)).iter() {
        let from = pawn_from(to, back_east);
        let captured = captured_on(pos, to, them);
        for promo in PROMOTION_PIECES {
            moves.push(Move::promotion(from, to, promo, Some(captured)));
        }
    }

    // --- En passant, west capture then east capture ---
    if let Some(ep_sq) = pos.en_passant {
        let ep_bb = Bitboard::from_square(ep_sq);
        if (attacks::pawn_west_attacks(us, pawns) & ep_bb).is_not_empty() {
            moves.push(Move::en_passant(pawn_from(ep_sq, back_west), ep_sq));
        }
        if (attacks::pawn_east_attacks(us, pawns) & ep_bb).is_not_empty() {
            moves.push(Move::en_passant(pawn_from(ep_sq, back_east), ep_sq));
        }
    }
}

/// Promotion pieces in emission order.
const PROMOTION_PIECES: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

/// The enemy piece on a capture destination. Capture targets always hold a
/// piece by construction.
#[inline]
fn captured_on(pos: &Position, to: Square, them: Color) -> PieceType {
    pos.piece_type_on(to, them)
        .expect("capture destination must hold an enemy piece")
}

// =========================================================================
// Knight / bishop / rook / queen / king moves
// =========================================================================

fn generate_piece_moves(pos: &Position, us: Color, piece: PieceType, moves: &mut MoveList) {
    let them = !us;
    let friendly = pos.occupied[us.index()];
    let enemy = pos.enemy();
    let occ = pos.all_occupied;

    for from in pos.bb(us, piece).iter() {
        let sources = Bitboard::from_square(from);
        let attacks = match piece {
            PieceType::Knight => attacks::knight_attacks(sources),
            PieceType::Bishop => attacks::bishop_attacks(sources, occ),
            PieceType::Rook => attacks::rook_attacks(sources, occ),
            PieceType::Queen => attacks::queen_attacks(sources, occ),
            PieceType::King => attacks::king_attacks(sources),
            PieceType::Pawn => unreachable!("pawns are generated set-wise"),
        };
        let targets = attacks & !friendly;
        for to in targets.iter() {
            if (Bitboard::from_square(to) & enemy).is_not_empty() {
                moves.push(Move::capture(from, to, piece, captured_on(pos, to, them)));
            } else {
                moves.push(Move::quiet(from, to, piece));
            }
        }
    }
}

// =========================================================================
// Castling
// =========================================================================

fn generate_castling_moves(pos: &Position, us: Color, moves: &mut MoveList) {
    let them = !us;

    let (ks_right, qs_right, king_sq) = match us {
        Color::White => (
            CastlingRights::WHITE_KINGSIDE,
            CastlingRights::WHITE_QUEENSIDE,
            Square(60), // e1
        ),
        Color::Black => (
            CastlingRights::BLACK_KINGSIDE,
            CastlingRights::BLACK_QUEENSIDE,
            Square(4), // e8
        ),
    };

    // Kingside: f and g must be empty; e, f, g must be unattacked.
    if pos.castling_rights.has(ks_right) {
        let f_sq = Square(king_sq.0 + 1);
        let g_sq = Square(king_sq.0 + 2);
        if !pos.all_occupied.is_set(f_sq)
            && !pos.all_occupied.is_set(g_sq)
            && !pos.is_square_attacked(king_sq, them)
            && !pos.is_square_attacked(f_sq, them)
            && !pos.is_square_attacked(g_sq, them)
        {
            moves.push(Move::castle(king_sq, g_sq));
        }
    }

    // Queenside: b, c, d must be empty; e, d, c must be unattacked.
    if pos.castling_rights.has(qs_right) {
        let d_sq = Square(king_sq.0 - 1);
        let c_sq = Square(king_sq.0 - 2);
        let b_sq = Square(king_sq.0 - 3);
        if !pos.all_occupied.is_set(b_sq)
            && !pos.all_occupied.is_set(c_sq)
            && !pos.all_occupied.is_set(d_sq)
            && !pos.is_square_attacked(king_sq, them)
            && !pos.is_square_attacked(d_sq, them)
            && !pos.is_square_attacked(c_sq, them)
        {
            moves.push(Move::castle(king_sq, c_sq));
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
