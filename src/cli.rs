//! Command-line front end.
//!
//! Flags: `--help`, `--fen "<FEN>"`, `--perft N`, `--search N`,
//! `--search-time MS`, `--uci`. Exit code 0 on success, 1 on unrecognized
//! arguments or an invalid FEN.

use std::time::Instant;

use crate::ai::search::{SearchLimits, search};
use crate::config::EngineConfig;
use crate::engine::board::Position;
use crate::engine::notation::encode_move;
use crate::engine::perft::perft;
use crate::uci::UciEngine;

const USAGE: &str = "\
ironpawn — a small UCI chess engine

Usage: ironpawn [OPTIONS]

Options:
  --fen \"<FEN>\"       position to operate on (default: start position)
  --perft <N>          count legal-move-tree leaves to depth N
  --search <N>         search for a best move at depth N
  --search-time <MS>   bound the search to MS milliseconds
  --uci                speak UCI on stdin/stdout
  --help               print this help";

/// What a parsed command line asks the engine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print usage.
    Help,
    /// Enter the UCI loop.
    Uci,
    /// Print the board for the given position.
    Show,
    /// Run perft at the given depth.
    Perft(u32),
    /// Search: depth limit (0 = default) and optional time budget.
    Search { depth: u32, time_ms: u64 },
}

/// Parsed command line: a position (when given) and one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub fen: Option<String>,
    pub command: Command,
}

/// Parse raw arguments (without the program name).
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut fen = None;
    let mut perft_depth = None;
    let mut search_depth = None;
    let mut search_time = None;
    let mut uci = false;
    let mut help = false;

    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--help" => help = true,
            "--uci" => uci = true,
            "--fen" => {
                let value = it.next().ok_or("--fen requires a FEN string")?;
                fen = Some(value.clone());
            }
            "--perft" => {
                let value = it.next().ok_or("--perft requires a depth")?;
                perft_depth =
                    Some(value.parse::<u32>().map_err(|_| {
                        format!("invalid depth for --perft: '{value}'")
                    })?);
            }
            "--search" => {
                let value = it.next().ok_or("--search requires a depth")?;
                search_depth =
                    Some(value.parse::<u32>().map_err(|_| {
                        format!("invalid depth for --search: '{value}'")
                    })?);
            }
            "--search-time" => {
                let value = it.next().ok_or("--search-time requires milliseconds")?;
                search_time = Some(value.parse::<u64>().map_err(|_| {
                    format!("invalid milliseconds for --search-time: '{value}'")
                })?);
            }
            other => return Err(format!("unrecognized argument: '{other}'")),
        }
    }

    let command = if help {
        Command::Help
    } else if uci {
        Command::Uci
    } else if let Some(depth) = perft_depth {
        Command::Perft(depth)
    } else if search_depth.is_some() || search_time.is_some() {
        Command::Search {
            depth: search_depth.unwrap_or(0),
            time_ms: search_time.unwrap_or(0),
        }
    } else if fen.is_some() {
        Command::Show
    } else {
        Command::Help
    };

    Ok(CliArgs { fen, command })
}

/// Execute a parsed command line. Returns the process exit code.
pub fn run(args: &[String], config: EngineConfig) -> i32 {
    let parsed = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            return 1;
        }
    };

    match parsed.command {
        Command::Help => {
            println!("{USAGE}");
            return 0;
        }
        Command::Uci => {
            UciEngine::new(config).run_stdio();
            return 0;
        }
        _ => {}
    }

    let mut pos = match &parsed.fen {
        Some(fen) => match Position::from_fen(fen) {
            Ok(pos) => pos,
            Err(err) => {
                eprintln!("{err}");
                return 1;
            }
        },
        None => Position::starting(),
    };

    match parsed.command {
        Command::Show => {
            println!("{}", pos.board_string());
            println!("{} to move", pos.side_to_move);
        }
        Command::Perft(depth) => {
            let start = Instant::now();
            let nodes = perft(&mut pos, depth);
            let elapsed = start.elapsed();
            let nps = (nodes as f64 / elapsed.as_secs_f64().max(1e-9)) as u64;
            println!(
                "perft {depth}: nodes {nodes} time {} ms nps {nps}",
                elapsed.as_millis()
            );
        }
        Command::Search { depth, time_ms } => {
            let limits = SearchLimits {
                max_depth: if depth == 0 { config.default_depth } else { depth },
                time_ms,
                ..Default::default()
            };
            let result = search(&mut pos, &limits);
            let best = match result.best_move {
                Some(mv) => encode_move(&mv),
                None => "0000".to_string(),
            };
            println!(
                "bestmove {best} score {} depth {} nodes {}{}",
                result.score,
                result.depth_reached,
                result.nodes,
                if result.aborted { " (aborted)" } else { "" }
            );
        }
        Command::Help | Command::Uci => unreachable!("handled above"),
    }

    0
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_args_means_help() {
        let parsed = parse_args(&[]).unwrap();
        assert_eq!(parsed.command, Command::Help);
    }

    #[test]
    fn parse_perft() {
        let parsed = parse_args(&args(&["--perft", "5"])).unwrap();
        assert_eq!(parsed.command, Command::Perft(5));
        assert_eq!(parsed.fen, None);
    }

    #[test]
    fn parse_fen_with_search() {
        let parsed =
            parse_args(&args(&["--fen", "8/8/8/8/8/8/8/K6k w - - 0 1", "--search", "3"])).unwrap();
        assert_eq!(
            parsed.command,
            Command::Search {
                depth: 3,
                time_ms: 0
            }
        );
        assert!(parsed.fen.is_some());
    }

    #[test]
    fn parse_search_time_alone() {
        let parsed = parse_args(&args(&["--search-time", "250"])).unwrap();
        assert_eq!(
            parsed.command,
            Command::Search {
                depth: 0,
                time_ms: 250
            }
        );
    }

    #[test]
    fn parse_fen_alone_shows_board() {
        let parsed = parse_args(&args(&["--fen", "4k3/8/8/8/8/8/8/4K3 w - - 0 1"])).unwrap();
        assert_eq!(parsed.command, Command::Show);
    }

    #[test]
    fn help_wins_over_everything() {
        let parsed = parse_args(&args(&["--perft", "3", "--help"])).unwrap();
        assert_eq!(parsed.command, Command::Help);
    }

    #[test]
    fn unrecognized_argument_fails() {
        assert!(parse_args(&args(&["--frobnicate"])).is_err());
        assert!(parse_args(&args(&["perft"])).is_err());
    }

    #[test]
    fn missing_values_fail() {
        assert!(parse_args(&args(&["--fen"])).is_err());
        assert!(parse_args(&args(&["--perft"])).is_err());
        assert!(parse_args(&args(&["--perft", "deep"])).is_err());
        assert!(parse_args(&args(&["--search-time", "soon"])).is_err());
    }

    #[test]
    fn run_perft_exit_codes() {
        assert_eq!(run(&args(&["--perft", "1"]), EngineConfig::default()), 0);
        assert_eq!(run(&args(&["--bogus"]), EngineConfig::default()), 1);
    }

    #[test]
    fn run_rejects_invalid_fen() {
        assert_eq!(
            run(
                &args(&["--fen", "not a fen", "--perft", "1"]),
                EngineConfig::default()
            ),
            1
        );
    }
}
