//! Staged move picker.
//!
//! Moves are produced lazily, one stage at a time, so that a search which
//! cuts off early never pays for generating and scoring the moves it would
//! not have looked at. The stage sequence depends on how the picker was
//! constructed: main search, quiescence, or probcut.

use pleco::{BitMove, Board, Piece, SQ};

use crate::search::eval::piece_value;
use crate::search::history::{
    piece_type_index, ButterflyHistory, CaptureHistory, PieceToHistory,
};
use crate::search::see::see_ge;

/// Quiescence generates quiet checks at this depth and above.
pub const DEPTH_QS_CHECKS: i32 = 0;
/// At or below this depth quiescence only considers recaptures.
pub const DEPTH_QS_RECAPTURES: i32 = -5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    MainTt,
    CaptureInit,
    GoodCapture,
    Killer0,
    Killer1,
    CounterMove,
    QuietInit,
    Quiet,
    BadCapture,

    EvasionTt,
    EvasionInit,
    Evasion,

    ProbcutTt,
    ProbcutInit,
    Probcut,

    QsearchTt,
    QcaptureInit,
    Qcapture,
    QcheckInit,
    Qcheck,

    Done,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredMove {
    pub mv: BitMove,
    pub score: i32,
}

/// Moves scoring at least `limit` are insertion-sorted (descending) to the
/// front; the rest keep their relative order behind them.
pub fn partial_insertion_sort(v: &mut [ScoredMove], limit: i32) {
    let mut sorted_end = 0;
    for p in 1..v.len() {
        if v[p].score >= limit {
            let tmp = v[p];
            sorted_end += 1;
            v[p] = v[sorted_end];
            let mut q = sorted_end;
            while q > 0 && v[q - 1].score < tmp.score {
                v[q] = v[q - 1];
                q -= 1;
            }
            v[q] = tmp;
        }
    }
}

pub struct MovePicker<'a> {
    board: Board,
    legal: Vec<BitMove>,

    tt_move: Option<BitMove>,
    killers: [Option<BitMove>; 2],
    counter: Option<BitMove>,

    butterfly: Option<&'a ButterflyHistory>,
    capture_history: Option<&'a CaptureHistory>,
    cont: [Option<&'a PieceToHistory>; 4],

    depth: i32,
    threshold: i32,
    recapture_sq: Option<SQ>,

    stage: Stage,
    moves: Vec<ScoredMove>,
    cur: usize,
    bad_captures: Vec<BitMove>,
    bad_cur: usize,
}

impl<'a> MovePicker<'a> {
    /// Picker for the main search. Emits the hash move, then winning
    /// captures, killers and the counter-move, sorted quiets, and finally
    /// the captures that lost the exchange. Switches to the evasion stages
    /// when the side to move is in check.
    pub fn new_main(
        board: &Board,
        tt_move: Option<BitMove>,
        depth: i32,
        butterfly: &'a ButterflyHistory,
        capture_history: &'a CaptureHistory,
        cont: [Option<&'a PieceToHistory>; 4],
        killers: [Option<BitMove>; 2],
        counter: Option<BitMove>,
    ) -> Self {
        debug_assert!(depth > 0);
        let legal: Vec<BitMove> = board.generate_moves().iter().copied().collect();
        let tt_move = tt_move.filter(|m| legal.contains(m));
        let stage = if board.in_check() { Stage::EvasionTt } else { Stage::MainTt };
        Self {
            board: board.clone(),
            legal,
            tt_move,
            killers,
            counter,
            butterfly: Some(butterfly),
            capture_history: Some(capture_history),
            cont,
            depth,
            threshold: 0,
            recapture_sq: None,
            stage,
            moves: Vec::new(),
            cur: 0,
            bad_captures: Vec::new(),
            bad_cur: 0,
        }
    }

    /// Picker for quiescence. At depth 0 it also emits quiet checks; at or
    /// below `DEPTH_QS_RECAPTURES` it only considers recaptures on
    /// `recapture_sq`.
    pub fn new_quiescence(
        board: &Board,
        tt_move: Option<BitMove>,
        depth: i32,
        recapture_sq: SQ,
        butterfly: &'a ButterflyHistory,
        capture_history: &'a CaptureHistory,
    ) -> Self {
        debug_assert!(depth <= 0);
        let legal: Vec<BitMove> = board.generate_moves().iter().copied().collect();
        let tt_move = tt_move
            .filter(|m| legal.contains(m))
            .filter(|m| depth > DEPTH_QS_RECAPTURES || m.get_dest() == recapture_sq);
        let stage = if board.in_check() { Stage::EvasionTt } else { Stage::QsearchTt };
        Self {
            board: board.clone(),
            legal,
            tt_move,
            killers: [None; 2],
            counter: None,
            butterfly: Some(butterfly),
            capture_history: Some(capture_history),
            cont: [None; 4],
            depth,
            threshold: 0,
            recapture_sq: Some(recapture_sq),
            stage,
            moves: Vec::new(),
            cur: 0,
            bad_captures: Vec::new(),
            bad_cur: 0,
        }
    }

    /// Picker for probcut: only captures whose exchange clears `threshold`.
    pub fn new_probcut(
        board: &Board,
        tt_move: Option<BitMove>,
        threshold: i32,
        capture_history: &'a CaptureHistory,
    ) -> Self {
        debug_assert!(!board.in_check());
        let legal: Vec<BitMove> = board.generate_moves().iter().copied().collect();
        let tt_move = tt_move
            .filter(|m| legal.contains(m))
            .filter(|m| m.is_capture() && see_ge(board, *m, threshold));
        Self {
            board: board.clone(),
            legal,
            tt_move,
            killers: [None; 2],
            counter: None,
            butterfly: None,
            capture_history: Some(capture_history),
            cont: [None; 4],
            depth: 0,
            threshold,
            recapture_sq: None,
            stage: Stage::ProbcutTt,
            moves: Vec::new(),
            cur: 0,
            bad_captures: Vec::new(),
            bad_cur: 0,
        }
    }

    #[inline]
    fn is_tt(&self, m: BitMove) -> bool {
        self.tt_move == Some(m)
    }

    fn capture_score(&self, m: BitMove) -> i32 {
        let to = m.get_dest();
        let victim = self.board.piece_at_sq(to);
        let moved = self.board.piece_at_sq(m.get_src());
        let mut score = if victim != Piece::None { piece_value(victim.type_of()) } else { 0 };
        if let Some(ch) = self.capture_history {
            let vt = if victim != Piece::None { victim.type_of() } else { pleco::PieceType::None };
            score += ch.get(moved, to, vt);
        }
        score
    }

    fn quiet_score(&self, m: BitMove) -> i32 {
        let from = m.get_src();
        let to = m.get_dest();
        let moved = self.board.piece_at_sq(from);
        let mut score = 0;
        if let Some(bf) = self.butterfly {
            score += bf.get(self.board.turn(), from, to);
        }
        for slot in [0, 1, 3] {
            if let Some(pt) = self.cont[slot] {
                score += pt.get(moved, to);
            }
        }
        score
    }

    fn evasion_score(&self, m: BitMove) -> i32 {
        if m.is_capture() {
            let victim = self.board.piece_at_sq(m.get_dest());
            let moved = self.board.piece_at_sq(m.get_src());
            let v = if victim != Piece::None { piece_value(victim.type_of()) } else { 0 };
            v - piece_type_index(moved.type_of()) as i32
        } else {
            let mut score = 0;
            if let Some(bf) = self.butterfly {
                score += bf.get(self.board.turn(), m.get_src(), m.get_dest());
            }
            if let Some(pt) = self.cont[0] {
                score += pt.get(self.board.piece_at_sq(m.get_src()), m.get_dest());
            }
            score - (1 << 28)
        }
    }

    fn init_captures(&mut self) {
        self.moves = self
            .legal
            .iter()
            .copied()
            .filter(|m| m.is_capture())
            .map(|mv| ScoredMove { mv, score: 0 })
            .collect();
        for i in 0..self.moves.len() {
            let s = self.capture_score(self.moves[i].mv);
            self.moves[i].score = s;
        }
        self.cur = 0;
    }

    /// Swap the highest-scored remaining move to the cursor and return it.
    /// Strict comparison keeps the earliest move on ties.
    fn pick_best(&mut self) -> Option<ScoredMove> {
        if self.cur >= self.moves.len() {
            return None;
        }
        let mut best = self.cur;
        for i in self.cur + 1..self.moves.len() {
            if self.moves[i].score > self.moves[best].score {
                best = i;
            }
        }
        self.moves.swap(self.cur, best);
        let sm = self.moves[self.cur];
        self.cur += 1;
        Some(sm)
    }

    /// Next move in ordering priority, or `None` when exhausted. Passing
    /// `skip_quiets` suppresses the quiet stage (the hash move, killers and
    /// counter-move are still emitted).
    pub fn next(&mut self, skip_quiets: bool) -> Option<BitMove> {
        loop {
            match self.stage {
                Stage::MainTt => {
                    self.stage = Stage::CaptureInit;
                    if let Some(m) = self.tt_move {
                        return Some(m);
                    }
                }
                Stage::CaptureInit => {
                    self.init_captures();
                    self.stage = Stage::GoodCapture;
                }
                Stage::GoodCapture => {
                    while let Some(sm) = self.pick_best() {
                        if self.is_tt(sm.mv) {
                            continue;
                        }
                        if see_ge(&self.board, sm.mv, -55 * sm.score / 1024) {
                            return Some(sm.mv);
                        }
                        self.bad_captures.push(sm.mv);
                    }
                    self.stage = Stage::Killer0;
                }
                Stage::Killer0 => {
                    self.stage = Stage::Killer1;
                    if let Some(k) = self.killers[0] {
                        if !self.is_tt(k) && !k.is_capture() && self.legal.contains(&k) {
                            return Some(k);
                        }
                    }
                }
                Stage::Killer1 => {
                    self.stage = Stage::CounterMove;
                    if let Some(k) = self.killers[1] {
                        if !self.is_tt(k)
                            && self.killers[0] != Some(k)
                            && !k.is_capture()
                            && self.legal.contains(&k)
                        {
                            return Some(k);
                        }
                    }
                }
                Stage::CounterMove => {
                    self.stage = Stage::QuietInit;
                    if let Some(c) = self.counter {
                        if !self.is_tt(c)
                            && self.killers[0] != Some(c)
                            && self.killers[1] != Some(c)
                            && !c.is_capture()
                            && self.legal.contains(&c)
                        {
                            return Some(c);
                        }
                    }
                }
                Stage::QuietInit => {
                    self.moves = self
                        .legal
                        .iter()
                        .copied()
                        .filter(|m| !m.is_capture())
                        .map(|mv| ScoredMove { mv, score: 0 })
                        .collect();
                    for i in 0..self.moves.len() {
                        let s = self.quiet_score(self.moves[i].mv);
                        self.moves[i].score = s;
                    }
                    partial_insertion_sort(&mut self.moves, -4000 * self.depth);
                    self.cur = 0;
                    self.stage = Stage::Quiet;
                }
                Stage::Quiet => {
                    if !skip_quiets {
                        while self.cur < self.moves.len() {
                            let m = self.moves[self.cur].mv;
                            self.cur += 1;
                            if self.is_tt(m)
                                || self.killers[0] == Some(m)
                                || self.killers[1] == Some(m)
                                || self.counter == Some(m)
                            {
                                continue;
                            }
                            return Some(m);
                        }
                    }
                    self.stage = Stage::BadCapture;
                    self.bad_cur = 0;
                }
                Stage::BadCapture => {
                    while self.bad_cur < self.bad_captures.len() {
                        let m = self.bad_captures[self.bad_cur];
                        self.bad_cur += 1;
                        if !self.is_tt(m) {
                            return Some(m);
                        }
                    }
                    self.stage = Stage::Done;
                }

                Stage::EvasionTt => {
                    self.stage = Stage::EvasionInit;
                    if let Some(m) = self.tt_move {
                        return Some(m);
                    }
                }
                Stage::EvasionInit => {
                    self.moves = self
                        .legal
                        .iter()
                        .copied()
                        .map(|mv| ScoredMove { mv, score: 0 })
                        .collect();
                    for i in 0..self.moves.len() {
                        let s = self.evasion_score(self.moves[i].mv);
                        self.moves[i].score = s;
                    }
                    self.cur = 0;
                    self.stage = Stage::Evasion;
                }
                Stage::Evasion => {
                    while let Some(sm) = self.pick_best() {
                        if !self.is_tt(sm.mv) {
                            return Some(sm.mv);
                        }
                    }
                    self.stage = Stage::Done;
                }

                Stage::ProbcutTt => {
                    self.stage = Stage::ProbcutInit;
                    if let Some(m) = self.tt_move {
                        return Some(m);
                    }
                }
                Stage::ProbcutInit => {
                    self.init_captures();
                    self.stage = Stage::Probcut;
                }
                Stage::Probcut => {
                    while let Some(sm) = self.pick_best() {
                        if self.is_tt(sm.mv) {
                            continue;
                        }
                        if see_ge(&self.board, sm.mv, self.threshold) {
                            return Some(sm.mv);
                        }
                    }
                    self.stage = Stage::Done;
                }

                Stage::QsearchTt => {
                    self.stage = Stage::QcaptureInit;
                    if let Some(m) = self.tt_move {
                        return Some(m);
                    }
                }
                Stage::QcaptureInit => {
                    self.init_captures();
                    self.stage = Stage::Qcapture;
                }
                Stage::Qcapture => {
                    while let Some(sm) = self.pick_best() {
                        if self.is_tt(sm.mv) {
                            continue;
                        }
                        if self.depth > DEPTH_QS_RECAPTURES
                            || Some(sm.mv.get_dest()) == self.recapture_sq
                        {
                            return Some(sm.mv);
                        }
                    }
                    if self.depth == DEPTH_QS_CHECKS {
                        self.stage = Stage::QcheckInit;
                    } else {
                        self.stage = Stage::Done;
                    }
                }
                Stage::QcheckInit => {
                    let board = &self.board;
                    self.moves = self
                        .legal
                        .iter()
                        .copied()
                        .filter(|m| !m.is_capture())
                        .filter(|&m| {
                            let mut b = board.clone();
                            b.apply_move(m);
                            b.in_check()
                        })
                        .map(|mv| ScoredMove { mv, score: 0 })
                        .collect();
                    self.cur = 0;
                    self.stage = Stage::Qcheck;
                }
                Stage::Qcheck => {
                    while self.cur < self.moves.len() {
                        let m = self.moves[self.cur].mv;
                        self.cur += 1;
                        if !self.is_tt(m) {
                            return Some(m);
                        }
                    }
                    self.stage = Stage::Done;
                }

                Stage::Done => return None,
            }
        }
    }
}
