//! Upper-confidence tree search over the node table.
//!
//! Each descent walks the tree from the root by maximizing UCB, expands the
//! first unexpanded node it reaches with the staged move picker (priors from
//! a shallow evaluation of each child), and propagates the playout reward
//! back up the path, flipping it every ply.

use log::{debug, trace};
use pleco::{BitMove, Board, Piece, SQ};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::board::SearchBoard;
use crate::node_table::{Edge, Node, NodeHandle, NodeTable};
use crate::search::eval::{self, KNOWN_WIN};
use crate::search::history::{HistoryTables, PieceToHistory};
use crate::search::movepick::MovePicker;

pub type Reward = f64;

pub const DEFAULT_EXPLORATION: f64 = 10.0;
pub const MAX_PLY: usize = 128;

/// Depth handed to the move picker during expansion; deep enough that the
/// quiet-stage sort limit admits every quiet move.
const EXPANSION_DEPTH: i32 = 30;

/// Logistic slope mapping centipawns to a [0, 1] reward. Chosen so that
/// +600cp maps to 0.75.
const REWARD_K: f64 = -0.00183102048111;
const REWARD_G: f64 = 546.143_535_977_151_2;

#[inline]
pub fn value_to_reward(value_cp: f64) -> Reward {
    1.0 / (1.0 + (REWARD_K * value_cp).exp())
}

/// Inverse of `value_to_reward`, clamped: rewards near certainty map to
/// `KNOWN_WIN` rather than infinity.
#[inline]
pub fn reward_to_value(r: Reward) -> i32 {
    if r > 0.99 {
        return KNOWN_WIN;
    }
    if r < 0.01 {
        return -KNOWN_WIN;
    }
    (REWARD_G * (r / (1.0 - r)).ln()) as i32
}

/// Search effort limit.
#[derive(Debug, Clone, Copy)]
pub enum Budget {
    /// Number of root-to-leaf descents.
    Descents(u64),
    /// Total moves made on the internal board (descents plus prior
    /// evaluations).
    Moves(u64),
    /// Wall-clock limit.
    Time(Duration),
}

#[derive(Debug, Clone, Copy)]
pub struct UctConfig {
    pub exploration: f64,
    pub table_capacity: usize,
    /// Depth of the evaluation used for edge priors; 0 runs quiescence only.
    pub prior_depth: i32,
    pub budget: Budget,
}

impl Default for UctConfig {
    fn default() -> Self {
        Self {
            exploration: DEFAULT_EXPLORATION,
            table_capacity: 1 << 14,
            prior_depth: 0,
            budget: Budget::Descents(5_000),
        }
    }
}

fn ucb(edge: &Edge, parent_visits: u64, c: f64) -> f64 {
    let exploit = if edge.visits > 0 {
        edge.action_value / edge.visits as f64
    } else {
        0.0
    };
    let explore = c * edge.prior * (parent_visits as f64).sqrt() / (1.0 + edge.visits as f64);
    exploit + explore
}

/// Index of the edge maximizing UCB, first edge winning ties. `c == 0.0`
/// reduces to pure exploitation of the mean action value.
pub fn best_edge_of(node: &Node, c: f64) -> Option<usize> {
    if node.edges.is_empty() {
        return None;
    }
    let mut best = 0;
    let mut best_v = ucb(&node.edges[0], node.visits, c);
    for i in 1..node.edges.len() {
        let v = ucb(&node.edges[i], node.visits, c);
        if v > best_v {
            best = i;
            best_v = v;
        }
    }
    Some(best)
}

#[derive(Debug, Clone, Copy, Default)]
struct Frame {
    /// (moving piece, destination) of the move made at this ply, used to key
    /// continuation and counter-move tables further down the line. The move
    /// itself lives on the `SearchBoard` stack.
    cont_key: Option<(Piece, SQ)>,
    killers: [Option<BitMove>; 2],
}

pub struct UctSearch<'a> {
    board: SearchBoard,
    table: NodeTable,
    history: &'a HistoryTables,
    config: UctConfig,
    root: NodeHandle,
    /// (parent handle, edge index) at each ply of the current descent.
    path: Vec<(NodeHandle, usize)>,
    frames: Vec<Frame>,
    ply: usize,

    descents: u64,
    playouts: u64,
    priors: u64,
    moves_made: u64,
    start: Instant,
}

impl<'a> UctSearch<'a> {
    pub fn new(board: &Board, history: &'a HistoryTables, config: UctConfig) -> Self {
        let mut table = NodeTable::new(config.table_capacity);
        let sb = SearchBoard::from_board(board);
        let (k1, k2) = sb.keys();
        let root = table.lookup(k1, k2);
        Self {
            board: sb,
            table,
            history,
            config,
            root,
            path: Vec::with_capacity(MAX_PLY),
            frames: vec![Frame::default(); MAX_PLY + 2],
            ply: 0,
            descents: 0,
            playouts: 0,
            priors: 0,
            moves_made: 0,
            start: Instant::now(),
        }
    }

    /// Run descents until the budget runs out; returns the preferred root
    /// move, or `None` when the root has no legal moves.
    pub fn search(&mut self) -> Option<BitMove> {
        self.create_root();
        while self.budget_remaining() {
            self.descents += 1;
            trace!("descent {} starting", self.descents);
            let leaf = self.tree_policy();
            let reward = self.playout_policy(leaf);
            self.backup(reward);
            if self.descents % 1024 == 0 {
                let root = self.table.node(self.root);
                debug!(
                    "descents={} playouts={} priors={} root_visits={}",
                    self.descents, self.playouts, self.priors, root.visits
                );
            }
        }
        self.best_move()
    }

    pub fn best_move(&self) -> Option<BitMove> {
        let node = self.table.node(self.root);
        best_edge_of(node, 0.0).map(|i| node.edges[i].mv)
    }

    pub fn root_node(&self) -> &Node {
        self.table.node(self.root)
    }

    fn create_root(&mut self) {
        self.descents = 0;
        self.playouts = 0;
        self.priors = 0;
        self.moves_made = 0;
        self.start = Instant::now();
        self.board.rewind();
        self.ply = 0;
        self.path.clear();
        for f in &mut self.frames {
            *f = Frame::default();
        }
        let (k1, k2) = self.board.keys();
        self.root = self.table.lookup(k1, k2);
        if self.table.node(self.root).visits == 0 {
            self.expand(self.root);
        }
        debug_assert_eq!(self.ply, 0);
    }

    fn budget_remaining(&self) -> bool {
        assert_eq!(self.ply, 0, "budget checked mid-descent");
        match self.config.budget {
            Budget::Descents(n) => self.descents < n,
            Budget::Moves(n) => self.moves_made < n,
            Budget::Time(limit) => self.start.elapsed() < limit,
        }
    }

    /// Descend from the root along UCB-best edges until reaching a node that
    /// has not been expanded, a terminal node, or the ply cap.
    fn tree_policy(&mut self) -> NodeHandle {
        let mut handle = self.root;
        loop {
            let node = self.table.node(handle);
            if node.visits == 0 || node.sons == 0 || self.ply >= MAX_PLY {
                break;
            }
            let idx = match best_edge_of(node, self.config.exploration) {
                Some(i) => i,
                None => break,
            };
            let mv = node.edges[idx].mv;
            self.path.push((handle, idx));
            self.do_move(mv);
            let (k1, k2) = self.board.keys();
            handle = self.table.lookup(k1, k2);
            let child = self.table.node_mut(handle);
            if child.last_move.is_none() {
                child.last_move = Some(mv);
            }
        }
        handle
    }

    /// Reward of the leaf from its side-to-move perspective.
    fn playout_policy(&mut self, leaf: NodeHandle) -> Reward {
        self.playouts += 1;
        let (visits, sons, best_prior) = {
            let node = self.table.node(leaf);
            let bp = node.edges.first().map_or(0.0, |e| e.prior);
            (node.visits, node.sons, bp)
        };
        if visits > 0 {
            if sons == 0 {
                let r = self.terminal_reward();
                self.table.node_mut(leaf).visits += 1;
                return r;
            }
            // Ply cap: stand on the best prior instead of expanding deeper.
            return best_prior;
        }
        self.expand(leaf)
    }

    /// Generate and score all moves at the leaf, attach them as edges sorted
    /// by prior, and return the best prior as the playout reward.
    fn expand(&mut self, leaf: NodeHandle) -> Reward {
        let hist: &'a HistoryTables = self.history;
        let counter = if self.ply > 0 {
            self.frames[self.ply - 1]
                .cont_key
                .and_then(|(pc, to)| hist.counter_moves.get(pc, to))
        } else {
            None
        };
        let killers = self.frames[self.ply].killers;
        let cont = [self.cont_ref(1), self.cont_ref(2), None, self.cont_ref(4)];
        let mut picker = MovePicker::new_main(
            self.board.inner(),
            None,
            EXPANSION_DEPTH,
            &hist.butterfly,
            &hist.capture,
            cont,
            killers,
            counter,
        );
        let mut scored: Vec<(BitMove, Reward)> = Vec::new();
        while let Some(m) = picker.next(false) {
            let prior = self.calculate_prior(m);
            scored.push((m, prior));
        }
        let best_prior = {
            let node = self.table.node_mut(leaf);
            for (m, p) in scored {
                node.add_edge(m, p);
            }
            node.sort_edges_by_prior();
            node.visits = 1;
            node.expanded_sons = 0;
            node.edges.first().map(|e| e.prior)
        };
        match best_prior {
            Some(p) => p,
            None => self.terminal_reward(),
        }
    }

    /// Terminal positions are losses when in check (mate) and draws
    /// otherwise (stalemate).
    fn terminal_reward(&self) -> Reward {
        if self.board.inner().in_check() {
            0.0
        } else {
            0.5
        }
    }

    /// Prior of `m` for the side making it: evaluate the resulting position
    /// and map the (negated, opponent-relative) value to a reward.
    fn calculate_prior(&mut self, m: BitMove) -> Reward {
        self.priors += 1;
        self.moves_made += 1;
        let depth = self.config.prior_depth;
        let mut applied = self.board.play(m);
        let v = eval::evaluate(applied.inner_mut(), depth);
        drop(applied);
        value_to_reward(-v as f64)
    }

    fn cont_ref(&self, plies_back: usize) -> Option<&'a PieceToHistory> {
        if self.ply < plies_back {
            return None;
        }
        let hist: &'a HistoryTables = self.history;
        self.frames[self.ply - plies_back]
            .cont_key
            .map(|(pc, to)| hist.continuation.get(pc, to))
    }

    fn do_move(&mut self, m: BitMove) {
        let pc = self.board.inner().piece_at_sq(m.get_src());
        self.frames[self.ply].cont_key = Some((pc, m.get_dest()));
        self.board.make(m);
        self.ply += 1;
        self.moves_made += 1;
    }

    /// Walk the descent path back to the root, flipping the reward at every
    /// ply and updating node and edge statistics.
    fn backup(&mut self, mut reward: Reward) {
        while let Some((parent, idx)) = self.path.pop() {
            reward = 1.0 - reward;
            self.board.unmake();
            self.ply -= 1;
            let node = self.table.node_mut(parent);
            node.visits += 1;
            // The slot may have been recycled for another position mid-descent.
            if idx < node.edges.len() {
                if node.edges[idx].visits == 0 {
                    node.expanded_sons += 1;
                }
                let e = &mut node.edges[idx];
                e.visits += 1;
                e.action_value += reward;
                e.mean_action_value = e.action_value / e.visits as f64;
            }
        }
        assert_eq!(self.ply, 0, "backup did not return to the root");
    }

    pub fn report(&self) -> SearchReport {
        let root = self.table.node(self.root);
        let mut candidates: Vec<CandidateStat> = root
            .edges
            .iter()
            .map(|e| CandidateStat {
                mv: format!("{}", e.mv),
                visits: e.visits,
                prior: e.prior,
                mean_action_value: e.mean_action_value,
                value_cp: reward_to_value(e.mean_action_value),
            })
            .collect();
        candidates.sort_by(|a, b| b.visits.cmp(&a.visits));
        SearchReport {
            best_move: self.best_move().map(|m| format!("{}", m)),
            descents: self.descents,
            playouts: self.playouts,
            priors_computed: self.priors,
            moves_made: self.moves_made,
            root_visits: root.visits,
            elapsed_ms: self.start.elapsed().as_millis(),
            candidates,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CandidateStat {
    pub mv: String,
    pub visits: u64,
    pub prior: f64,
    pub mean_action_value: f64,
    pub value_cp: i32,
}

#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub best_move: Option<String>,
    pub descents: u64,
    pub playouts: u64,
    pub priors_computed: u64,
    pub moves_made: u64,
    pub root_visits: u64,
    pub elapsed_ms: u128,
    pub candidates: Vec<CandidateStat>,
}
