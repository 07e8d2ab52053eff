// Move-selection core: staged picker + UCT tree search over pleco boards
pub mod board;
pub mod mcts;
pub mod node_table;
pub mod search;
