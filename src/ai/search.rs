//! Negamax search with alpha-beta pruning.
//!
//! The search is synchronous and recursive, material-only, and governed by
//! cooperative limits: maximum depth, wall-clock time, node budget, and an
//! external stop flag. Limits are polled at the top of every node and between
//! root children; once any trips, a sticky abort flag short-circuits the rest
//! of the call. An aborted depth is discarded and the result of the last
//! fully-completed depth stands.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::ai::evaluation::{INF, MATE, evaluate_relative};
use crate::engine::board::Position;
use crate::engine::movegen::legal_moves;
use crate::engine::types::Move;

/// Depth used when the caller leaves `max_depth` at 0.
pub const DEFAULT_DEPTH: u32 = 4;

// =========================================================================
// Limits and result
// =========================================================================

/// Bounds on a single search call. Zero (or `None`) means unlimited, except
/// for `max_depth`, where 0 falls back to [`DEFAULT_DEPTH`].
#[derive(Clone, Default)]
pub struct SearchLimits {
    /// Maximum iterative-deepening depth; 0 = default.
    pub max_depth: u32,
    /// Wall-clock budget in milliseconds; 0 = unlimited.
    pub time_ms: u64,
    /// Node budget; 0 = unlimited.
    pub node_limit: u64,
    /// External stop flag, writable by the embedder at any time.
    pub stop: Option<Arc<AtomicBool>>,
}

impl SearchLimits {
    /// Depth-only limits.
    pub fn depth(max_depth: u32) -> Self {
        SearchLimits {
            max_depth,
            ..Default::default()
        }
    }
}

/// Outcome of a search call.
///
/// `best_move` is `None` only when the root position has no legal moves; the
/// score is then `-MATE` (checkmated) or 0 (stalemated). When `aborted` is
/// true, `depth_reached`/`score` describe the last fully-completed depth.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub depth_reached: u32,
    pub score: i32,
    pub nodes: u64,
    pub aborted: bool,
}

// =========================================================================
// Search context — node counting and cooperative abort
// =========================================================================

struct SearchContext {
    deadline: Option<Instant>,
    node_limit: u64,
    stop: Option<Arc<AtomicBool>>,
    nodes: u64,
    aborted: bool,
}

impl SearchContext {
    fn new(limits: &SearchLimits) -> Self {
        SearchContext {
            deadline: (limits.time_ms > 0)
                .then(|| Instant::now() + Duration::from_millis(limits.time_ms)),
            node_limit: limits.node_limit,
            stop: limits.stop.clone(),
            nodes: 0,
            aborted: false,
        }
    }

    /// Poll every cancellation source. The flag is sticky: once set it stays
    /// set for the remainder of this search call.
    fn check_abort(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if self.node_limit > 0 && self.nodes >= self.node_limit {
            self.aborted = true;
        } else if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            self.aborted = true;
        } else if let Some(stop) = &self.stop
            && stop.load(Ordering::Relaxed)
        {
            self.aborted = true;
        }
        self.aborted
    }
}

// =========================================================================
// Negamax with a fail-hard alpha-beta window
// =========================================================================

/// Score `pos` from the side-to-move's perspective.
///
/// `ply` is the distance from the root, so mate scores shrink as mates get
/// deeper and the search prefers the faster mate. Aborted nodes return a
/// placeholder that the caller discards.
fn negamax(
    pos: &mut Position,
    depth: u32,
    ply: i32,
    mut alpha: i32,
    beta: i32,
    ctx: &mut SearchContext,
) -> i32 {
    if ctx.check_abort() {
        return 0;
    }
    ctx.nodes += 1;

    if depth == 0 {
        return evaluate_relative(pos);
    }

    let moves = legal_moves(pos);
    if moves.is_empty() {
        if pos.is_in_check() {
            return -MATE + ply;
        }
        return 0; // Stalemate.
    }

    for &mv in &moves {
        let undo = pos.make_move(mv);
        let score = -negamax(pos, depth - 1, ply + 1, -beta, -alpha, ctx);
        pos.undo_move(mv, &undo);

        if ctx.aborted {
            return 0;
        }
        if score >= beta {
            return beta; // Fail hard: cutoff returns the bound itself.
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

// =========================================================================
// Root search — iterative deepening
// =========================================================================

/// Search `pos` under `limits` and report the best move found.
///
/// Deepens from 1 to the depth limit, recording the result after each
/// completed depth. Root moves are tracked with strict greater-than, so ties
/// keep the earliest move in generation order.
pub fn search(pos: &mut Position, limits: &SearchLimits) -> SearchResult {
    let mut ctx = SearchContext::new(limits);
    let max_depth = if limits.max_depth == 0 {
        DEFAULT_DEPTH
    } else {
        limits.max_depth
    };

    let root_moves = legal_moves(pos);
    if root_moves.is_empty() {
        let score = if pos.is_in_check() { -MATE } else { 0 };
        return SearchResult {
            best_move: None,
            depth_reached: 0,
            score,
            nodes: 0,
            aborted: false,
        };
    }

    // A syntactically valid move is always reported, even when the very
    // first depth aborts before completing.
    let mut result = SearchResult {
        best_move: Some(root_moves[0]),
        depth_reached: 0,
        score: 0,
        nodes: 0,
        aborted: false,
    };

    for depth in 1..=max_depth {
        let mut best_move = root_moves[0];
        let mut best_score = -INF;

        for &mv in &root_moves {
            let undo = pos.make_move(mv);
            let score = -negamax(pos, depth - 1, 1, -INF, INF, &mut ctx);
            pos.undo_move(mv, &undo);

            if ctx.check_abort() {
                break;
            }
            if score > best_score {
                best_score = score;
                best_move = mv;
            }
        }

        if ctx.aborted {
            break; // Discard the partial depth.
        }

        result.best_move = Some(best_move);
        result.depth_reached = depth;
        result.score = best_score;
        tracing::debug!(depth, score = best_score, nodes = ctx.nodes, "depth completed");
    }

    result.nodes = ctx.nodes;
    result.aborted = ctx.aborted;
    result
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::evaluation::is_mate_score;
    use crate::engine::movegen::legal_moves;
    use crate::engine::types::Square;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn returns_a_legal_move_from_start() {
        let mut p = Position::starting();
        let result = search(&mut p, &SearchLimits::depth(2));
        let mv = result.best_move.expect("start position has moves");
        assert!(legal_moves(&p).contains(&mv));
        assert_eq!(result.depth_reached, 2);
        assert!(!result.aborted);
        assert!(result.nodes > 0);
    }

    #[test]
    fn search_restores_the_position() {
        let mut p = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let reference = p.clone();
        search(&mut p, &SearchLimits::depth(2));
        assert_eq!(p, reference);
    }

    #[test]
    fn finds_mate_in_one() {
        // Scholar's mate pattern: Qxf7# is available.
        let mut p =
            pos("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4");
        let result = search(&mut p, &SearchLimits::depth(3));
        let mv = result.best_move.unwrap();
        assert_eq!(mv.to, sq("f7"), "should find Qxf7#");
        assert_eq!(result.score, MATE - 1);
        assert!(is_mate_score(result.score));
    }

    #[test]
    fn captures_hanging_piece() {
        // White queen takes the undefended rook on d5.
        let mut p = pos("4k3/8/8/3r4/8/8/3Q4/4K3 w - - 0 1");
        let result = search(&mut p, &SearchLimits::depth(3));
        assert_eq!(result.best_move.unwrap().to, sq("d5"));
        assert!(result.score >= 500 - 100);
    }

    #[test]
    fn checkmated_root_reports_no_move() {
        // Fool's mate delivered: White has no legal moves and is in check.
        let mut p = pos("rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        let result = search(&mut p, &SearchLimits::depth(3));
        assert!(result.best_move.is_none());
        assert_eq!(result.score, -MATE);
        assert!(!result.aborted);
    }

    #[test]
    fn stalemated_root_reports_zero() {
        let mut p = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let result = search(&mut p, &SearchLimits::depth(3));
        assert!(result.best_move.is_none());
        assert_eq!(result.score, 0);
    }

    #[test]
    fn queen_endgame_is_not_losing() {
        // K+Q vs K at depth 3: a legal move with a clearly winning score.
        let mut p = pos("4k3/8/8/8/8/8/4Q3/4K3 w - - 0 1");
        let result = search(&mut p, &SearchLimits::depth(3));
        let mv = result.best_move.expect("white has moves");
        assert!(legal_moves(&p).contains(&mv));
        assert!(result.score >= 0, "score {} should not be losing", result.score);
    }

    #[test]
    fn depth_defaults_to_four() {
        let mut p = pos("4k3/8/8/8/8/8/4Q3/4K3 w - - 0 1");
        let result = search(&mut p, &SearchLimits::default());
        assert_eq!(result.depth_reached, DEFAULT_DEPTH);
    }

    #[test]
    fn node_limit_aborts_but_still_moves() {
        let mut p = Position::starting();
        let limits = SearchLimits {
            node_limit: 1,
            ..Default::default()
        };
        let result = search(&mut p, &limits);
        assert!(result.aborted);
        assert_eq!(result.depth_reached, 0, "no depth completed");
        assert!(result.best_move.is_some(), "a valid move is still reported");
    }

    #[test]
    fn stop_flag_aborts() {
        let stop = Arc::new(AtomicBool::new(true));
        let mut p = Position::starting();
        let limits = SearchLimits {
            max_depth: 6,
            stop: Some(stop),
            ..Default::default()
        };
        let result = search(&mut p, &limits);
        assert!(result.aborted);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn time_limit_is_honoured() {
        let mut p = Position::starting();
        let limits = SearchLimits {
            max_depth: 64,
            time_ms: 20,
            ..Default::default()
        };
        let started = Instant::now();
        let result = search(&mut p, &limits);
        // Bounded runtime with generous slack, and still a legal move.
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(result.aborted);
        let mv = result.best_move.unwrap();
        assert!(legal_moves(&p).contains(&mv));
    }

    #[test]
    fn prefers_faster_mate() {
        // Ladder mate: Rb8# now (rank 7 already covered) beats any slower mate.
        let mut p = pos("6k1/R7/8/8/8/8/1R6/6K1 w - - 0 1");
        let result = search(&mut p, &SearchLimits::depth(3));
        assert_eq!(result.score, MATE - 1, "mate in one scores MATE - 1");
        let mv = result.best_move.unwrap();
        let mut check = p.clone();
        check.make_move(mv);
        assert!(check.is_in_check(), "chosen move delivers check");
        assert!(legal_moves(&check).is_empty(), "chosen move delivers mate");
    }
}
