use pleco::{BitMove, Board};
use treebot::mcts::{best_edge_of, Budget, UctConfig, UctSearch};
use treebot::node_table::{Edge, Node};
use treebot::search::history::HistoryTables;

fn edge(prior: f64, visits: u64, action_value: f64) -> Edge {
    Edge {
        mv: BitMove::null(),
        visits,
        prior,
        action_value,
        mean_action_value: if visits > 0 { action_value / visits as f64 } else { 0.0 },
    }
}

#[test]
fn best_edge_breaks_ties_toward_the_first() {
    let mut node = Node::default();
    node.visits = 10;
    node.edges.push(edge(0.5, 2, 1.0));
    node.edges.push(edge(0.5, 2, 1.0));
    node.sons = 2;
    assert_eq!(best_edge_of(&node, 1.0), Some(0));
    assert_eq!(best_edge_of(&node, 0.0), Some(0));
}

#[test]
fn unvisited_edge_with_big_prior_wins_exploration() {
    let mut node = Node::default();
    node.visits = 100;
    node.edges.push(edge(0.1, 50, 30.0));
    node.edges.push(edge(0.9, 0, 0.0));
    node.sons = 2;
    // Large exploration favours the untried high-prior edge
    assert_eq!(best_edge_of(&node, 10.0), Some(1));
    // Pure exploitation sticks with the visited one
    assert_eq!(best_edge_of(&node, 0.0), Some(0));
}

#[test]
fn search_returns_a_legal_move() {
    let board = Board::start_pos();
    let history = HistoryTables::new();
    let config = UctConfig { budget: Budget::Descents(200), ..UctConfig::default() };
    let mut search = UctSearch::new(&board, &history, config);
    let best = search.search().expect("startpos has moves");
    assert!(board.generate_moves().iter().any(|m| *m == best));
}

#[test]
fn descent_budget_accounts_for_every_visit() {
    let board = Board::start_pos();
    let history = HistoryTables::new();
    let config = UctConfig {
        budget: Budget::Descents(50),
        table_capacity: 1 << 20,
        ..UctConfig::default()
    };
    let mut search = UctSearch::new(&board, &history, config);
    search.search();
    let root = search.root_node();
    // One visit from expansion plus one per descent
    assert_eq!(root.visits, 51);
    let edge_visits: u64 = root.edges.iter().map(|e| e.visits).sum();
    assert_eq!(edge_visits, 50);
}

#[test]
fn forced_move_is_found() {
    let board = Board::from_fen("k7/8/1K6/8/8/8/8/R7 b - - 0 1").expect("valid fen");
    let history = HistoryTables::new();
    let config = UctConfig { budget: Budget::Descents(100), ..UctConfig::default() };
    let mut search = UctSearch::new(&board, &history, config);
    let best = search.search().expect("one evasion exists");
    assert_eq!(format!("{}", best), "a8b8");
}

#[test]
fn move_budget_terminates() {
    let board = Board::start_pos();
    let history = HistoryTables::new();
    let config = UctConfig { budget: Budget::Moves(500), ..UctConfig::default() };
    let mut search = UctSearch::new(&board, &history, config);
    assert!(search.search().is_some());
    assert!(search.report().moves_made >= 500);
}

#[test]
fn report_candidates_cover_the_root() {
    let board = Board::start_pos();
    let history = HistoryTables::new();
    let config = UctConfig {
        budget: Budget::Descents(64),
        table_capacity: 1 << 20,
        ..UctConfig::default()
    };
    let mut search = UctSearch::new(&board, &history, config);
    search.search();
    let report = search.report();
    assert_eq!(report.candidates.len(), 20);
    assert_eq!(report.root_visits, 65);
    // Sorted by visits, most explored first
    for pair in report.candidates.windows(2) {
        assert!(pair[0].visits >= pair[1].visits);
    }
    assert!(report.best_move.is_some());
}
