//! Move-string codec: UCI long-algebraic form.
//!
//! Encoding is `<from><to>` plus a lowercase promotion letter when the move
//! promotes (`e2e4`, `e7e8q`). Decoding resolves the text against the current
//! position's legal move list, so the returned `Move` carries the full
//! piece/captured/flag information.

use crate::engine::board::Position;
use crate::engine::movegen::legal_moves;
use crate::engine::types::{ChessError, Move, PieceType, Square};

/// Encode a move in UCI long-algebraic form.
pub fn encode_move(mv: &Move) -> String {
    mv.to_string()
}

/// Decode a UCI long-algebraic move string against `pos`.
///
/// A promotion letter must be present exactly when the matching legal move
/// promotes, and it selects the promoted piece. Fails without touching any
/// state when the text is malformed or matches no legal move.
pub fn decode_move(pos: &Position, text: &str) -> Result<Move, ChessError> {
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(ChessError::UnknownMove(text.to_string()));
    }

    let from = Square::from_algebraic(&text[0..2])
        .ok_or_else(|| ChessError::InvalidSquare(text[0..2].to_string()))?;
    let to = Square::from_algebraic(&text[2..4])
        .ok_or_else(|| ChessError::InvalidSquare(text[2..4].to_string()))?;

    let promo = match text.as_bytes().get(4) {
        None => None,
        Some(b'q') => Some(PieceType::Queen),
        Some(b'r') => Some(PieceType::Rook),
        Some(b'b') => Some(PieceType::Bishop),
        Some(b'n') => Some(PieceType::Knight),
        Some(_) => return Err(ChessError::UnknownMove(text.to_string())),
    };

    for &mv in &legal_moves(pos) {
        if mv.from == from && mv.to == to && mv.promotion == promo {
            return Ok(mv);
        }
    }
    Err(ChessError::UnknownMove(text.to_string()))
}
