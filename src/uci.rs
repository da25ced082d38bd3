//! Minimal UCI shell over stdin/stdout.
//!
//! Supported commands:
//! - `uci` → id lines + `uciok`
//! - `isready` → `readyok`
//! - `ucinewgame` → reset to the start position
//! - `position startpos|fen <FEN> [moves <uci>…]`
//! - `go [depth N] [movetime MS] [nodes N]` → `bestmove <uci>` (or `0000`)
//! - `perft N` → `nodes <count>`
//! - `d` → print the board
//! - `quit`
//!
//! Unknown commands are ignored. Parsing and handlers stay explicit — no
//! async, no threads; logging goes through `tracing` (stderr), the protocol
//! itself owns stdout.

use std::io::{self, BufRead, Write};

use crate::ai::search::{SearchLimits, search};
use crate::config::EngineConfig;
use crate::engine::board::Position;
use crate::engine::notation::{decode_move, encode_move};
use crate::engine::perft::perft;

/// The UCI engine state: the current position plus advertised identity.
pub struct UciEngine {
    pos: Position,
    config: EngineConfig,
}

impl UciEngine {
    pub fn new(config: EngineConfig) -> Self {
        UciEngine {
            pos: Position::starting(),
            config,
        }
    }

    /// Main read-eval-print loop over stdin/stdout. Returns on `quit` or EOF.
    pub fn run_stdio(&mut self) {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if self.handle_line(line, &mut stdout) {
                break;
            }
        }
    }

    /// Handle a single command line. Returns true on `quit`.
    pub fn handle_line(&mut self, line: &str, out: &mut dyn Write) -> bool {
        tracing::debug!(command = %line, "uci command");
        let mut tokens = line.split_whitespace();
        let Some(cmd) = tokens.next() else {
            return false;
        };
        let rest: Vec<&str> = tokens.collect();
        match cmd {
            "uci" => {
                writeln!(out, "id name {}", self.config.name).ok();
                writeln!(out, "id author {}", self.config.author).ok();
                writeln!(out, "uciok").ok();
                out.flush().ok();
            }
            "isready" => {
                writeln!(out, "readyok").ok();
                out.flush().ok();
            }
            "ucinewgame" => {
                self.pos = Position::starting();
            }
            "position" => {
                self.handle_position(&rest);
            }
            "go" => {
                self.handle_go(&rest, out);
            }
            "perft" => {
                if let Some(depth) = rest.first().and_then(|t| t.parse::<u32>().ok()) {
                    let mut pos = self.pos.clone();
                    let nodes = perft(&mut pos, depth);
                    writeln!(out, "nodes {nodes}").ok();
                    out.flush().ok();
                }
            }
            "d" => {
                writeln!(out, "{}", self.pos.board_string()).ok();
                writeln!(out, "{} to move", self.pos.side_to_move).ok();
                out.flush().ok();
            }
            "quit" => {
                return true;
            }
            _ => {
                // Ignore anything we do not understand.
            }
        }
        false
    }

    /// `position startpos [moves ...]` or `position fen <FEN> [moves ...]`.
    fn handle_position(&mut self, tokens: &[&str]) {
        let Some(&kind) = tokens.first() else { return };

        let moves_start = match kind {
            "startpos" => {
                self.pos = Position::starting();
                1
            }
            "fen" => {
                let fen_end = tokens
                    .iter()
                    .position(|&t| t == "moves")
                    .unwrap_or(tokens.len());
                let fen = tokens[1..fen_end].join(" ");
                match Position::from_fen(&fen) {
                    Ok(pos) => self.pos = pos,
                    Err(err) => {
                        tracing::warn!(%err, "rejecting position command");
                        return;
                    }
                }
                fen_end
            }
            _ => return,
        };

        if tokens.get(moves_start) == Some(&"moves") {
            for text in &tokens[moves_start + 1..] {
                match decode_move(&self.pos, text) {
                    Ok(mv) => {
                        self.pos.make_move(mv);
                    }
                    Err(err) => {
                        tracing::warn!(%err, "stopping move replay");
                        break;
                    }
                }
            }
        }
    }

    /// `go [depth N] [movetime MS] [nodes N]`.
    fn handle_go(&mut self, tokens: &[&str], out: &mut dyn Write) {
        let mut limits = SearchLimits {
            max_depth: self.config.default_depth,
            time_ms: self.config.default_movetime_ms,
            ..Default::default()
        };

        let mut it = tokens.iter();
        while let Some(&token) = it.next() {
            match token {
                "depth" => {
                    if let Some(n) = it.next().and_then(|t| t.parse().ok()) {
                        limits.max_depth = n;
                    }
                }
                "movetime" => {
                    if let Some(ms) = it.next().and_then(|t| t.parse().ok()) {
                        limits.time_ms = ms;
                    }
                }
                "nodes" => {
                    if let Some(n) = it.next().and_then(|t| t.parse().ok()) {
                        limits.node_limit = n;
                    }
                }
                _ => {}
            }
        }

        let mut pos = self.pos.clone();
        let result = search(&mut pos, &limits);
        writeln!(
            out,
            "info depth {} score cp {} nodes {}",
            result.depth_reached, result.score, result.nodes
        )
        .ok();
        match result.best_move {
            Some(mv) => {
                writeln!(out, "bestmove {}", encode_move(&mv)).ok();
            }
            None => {
                writeln!(out, "bestmove 0000").ok();
            }
        }
        out.flush().ok();
    }
}

// =========================================================================
// Tests
// =========================================================================
