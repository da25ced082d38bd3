pub mod attacks;
pub mod board;
pub mod movegen;
pub mod notation;
pub mod perft;
pub mod types;

pub use board::{FEN_STARTPOS, Position, UndoInfo};
pub use movegen::{legal_moves, pseudo_legal_moves};
pub use notation::{decode_move, encode_move};
pub use perft::perft;
pub use types::*;
