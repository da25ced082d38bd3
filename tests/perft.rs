//! Perft (PERFormance Test) — exhaustive move-generation correctness suite.
//!
//! Each test verifies that the number of leaf nodes at a given depth matches
//! known-correct values for standard positions. If perft is wrong at any
//! depth, there is a bug in move generation, make/undo, or legality
//! filtering. The deepest counts are `#[ignore]`d for routine runs; use
//! `cargo test -- --ignored` (ideally with `--release`) to check them.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use ironpawn::engine::board::Position;
use ironpawn::engine::perft::perft;

fn perft_fen(fen: &str, depth: u32) -> u64 {
    let mut pos = Position::from_fen(fen).unwrap();
    perft(&mut pos, depth)
}

// =====================================================================
// Position 1 — Starting position
// =====================================================================

fn starting() -> Position {
    Position::starting()
}

#[test]
fn perft_start_depth_1() {
    assert_eq!(perft(&mut starting(), 1), 20);
}

#[test]
fn perft_start_depth_2() {
    assert_eq!(perft(&mut starting(), 2), 400);
}

#[test]
fn perft_start_depth_3() {
    assert_eq!(perft(&mut starting(), 3), 8_902);
}

#[test]
fn perft_start_depth_4() {
    assert_eq!(perft(&mut starting(), 4), 197_281);
}

#[test]
#[ignore = "slow: run with --ignored --release"]
fn perft_start_depth_5() {
    assert_eq!(perft(&mut starting(), 5), 4_865_609);
}

// =====================================================================
// Position 2 — "Kiwipete" (tricky: castling, EP, pins, promotions)
// =====================================================================

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

#[test]
fn perft_kiwipete_depth_1() {
    assert_eq!(perft_fen(KIWIPETE, 1), 48);
}

#[test]
fn perft_kiwipete_depth_2() {
    assert_eq!(perft_fen(KIWIPETE, 2), 2_039);
}

#[test]
fn perft_kiwipete_depth_3() {
    assert_eq!(perft_fen(KIWIPETE, 3), 97_862);
}

#[test]
#[ignore = "slow: run with --ignored --release"]
fn perft_kiwipete_depth_4() {
    assert_eq!(perft_fen(KIWIPETE, 4), 4_085_603);
}

// =====================================================================
// Position 3 — rook/pawn endgame rich in en-passant edge cases
// =====================================================================

const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

#[test]
fn perft_pos3_depth_1() {
    assert_eq!(perft_fen(POSITION_3, 1), 14);
}

#[test]
fn perft_pos3_depth_2() {
    assert_eq!(perft_fen(POSITION_3, 2), 191);
}

#[test]
fn perft_pos3_depth_3() {
    assert_eq!(perft_fen(POSITION_3, 3), 2_812);
}

#[test]
fn perft_pos3_depth_4() {
    assert_eq!(perft_fen(POSITION_3, 4), 43_238);
}

#[test]
#[ignore = "slow: run with --ignored --release"]
fn perft_pos3_depth_5() {
    assert_eq!(perft_fen(POSITION_3, 5), 674_624);
}

// =====================================================================
// Position 4 — promotion-heavy
// =====================================================================

const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";

#[test]
fn perft_pos4_depth_1() {
    assert_eq!(perft_fen(POSITION_4, 1), 6);
}

#[test]
fn perft_pos4_depth_2() {
    assert_eq!(perft_fen(POSITION_4, 2), 264);
}

#[test]
fn perft_pos4_depth_3() {
    assert_eq!(perft_fen(POSITION_4, 3), 9_467);
}

// =====================================================================
// Position 5 — underpromotion and castling interplay
// =====================================================================

const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

#[test]
fn perft_pos5_depth_1() {
    assert_eq!(perft_fen(POSITION_5, 1), 44);
}

#[test]
fn perft_pos5_depth_2() {
    assert_eq!(perft_fen(POSITION_5, 2), 1_486);
}

#[test]
fn perft_pos5_depth_3() {
    assert_eq!(perft_fen(POSITION_5, 3), 62_379);
}

// =====================================================================
// State restoration across a full perft run
// =====================================================================

#[test]
fn perft_restores_every_position() {
    for fen in [KIWIPETE, POSITION_3, POSITION_4, POSITION_5] {
        let mut pos = Position::from_fen(fen).unwrap();
        let reference = pos.clone();
        perft(&mut pos, 2);
        assert_eq!(pos, reference, "perft mutated the position for {fen}");
    }
}
