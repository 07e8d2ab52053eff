use anyhow::Result;
use clap::Parser;
use std::time::Duration;

use treebot::board::SearchBoard;
use treebot::mcts::{Budget, UctConfig, UctSearch, DEFAULT_EXPLORATION};
use treebot::search::history::HistoryTables;

#[derive(Parser, Debug)]
#[command(name = "treebot", about = "Monte-Carlo tree search chess analyzer")]
struct Args {
    /// Position to analyze (FEN); defaults to the starting position
    #[arg(long)]
    fen: Option<String>,

    /// Stop after this many descents
    #[arg(long, default_value_t = 10_000)]
    descents: u64,

    /// Stop after this many internal moves instead of descents
    #[arg(long)]
    max_moves: Option<u64>,

    /// Stop after this many milliseconds instead of descents
    #[arg(long)]
    movetime: Option<u64>,

    /// UCB exploration constant
    #[arg(long, default_value_t = DEFAULT_EXPLORATION)]
    exploration: f64,

    /// Node table capacity, rounded up to a power of two
    #[arg(long, default_value_t = 1 << 14)]
    table_slots: usize,

    /// Depth of the prior evaluation (0 runs quiescence only)
    #[arg(long, default_value_t = 0)]
    prior_depth: i32,

    /// Emit the full report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let board = match &args.fen {
        Some(fen) => SearchBoard::from_fen(fen)?.inner().clone(),
        None => SearchBoard::startpos().inner().clone(),
    };

    let budget = if let Some(ms) = args.movetime {
        Budget::Time(Duration::from_millis(ms))
    } else if let Some(n) = args.max_moves {
        Budget::Moves(n)
    } else {
        Budget::Descents(args.descents)
    };

    let config = UctConfig {
        exploration: args.exploration,
        table_capacity: args.table_slots,
        prior_depth: args.prior_depth,
        budget,
    };

    let history = HistoryTables::new();
    let mut search = UctSearch::new(&board, &history, config);
    let best = search.search();
    let report = search.report();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match best {
        Some(m) => println!("bestmove {}", m),
        None => println!("bestmove (none)"),
    }
    println!(
        "descents={} playouts={} priors={} moves={} root_visits={} elapsed_ms={}",
        report.descents,
        report.playouts,
        report.priors_computed,
        report.moves_made,
        report.root_visits,
        report.elapsed_ms
    );
    for c in report.candidates.iter().take(10) {
        println!(
            "  {} visits={} prior={:.3} mean={:.3} value_cp={}",
            c.mv, c.visits, c.prior, c.mean_action_value, c.value_cp
        );
    }
    Ok(())
}
