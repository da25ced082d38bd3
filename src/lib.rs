//! ironpawn — a small UCI chess engine.
//!
//! The library is split into the engine core (`engine`: bitboards, position,
//! move generation, perft, move notation) and the search layer (`ai`:
//! material evaluation and alpha-beta negamax). The `cli` and `uci` modules
//! are thin front ends over the core.

pub mod ai;
pub mod cli;
pub mod config;
pub mod engine;
pub mod uci;
