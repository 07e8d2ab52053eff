//! Heuristic history tables consumed by move ordering.
//!
//! These are read-only inputs from the move picker's point of view: the
//! enclosing search populates them (beta cutoffs, counter-move replies) and
//! the picker only reads. Setters exist for that enclosing search and for
//! tests.

use pleco::{BitMove, Piece, PieceType, Player, SQ};

pub const PIECE_NB: usize = 13; // none + 6 white + 6 black
pub const PIECE_TYPE_NB: usize = 7; // none + 6
const SQUARE_NB: usize = 64;

#[inline]
pub fn piece_index(p: Piece) -> usize {
    match p {
        Piece::WhitePawn => 1,
        Piece::WhiteKnight => 2,
        Piece::WhiteBishop => 3,
        Piece::WhiteRook => 4,
        Piece::WhiteQueen => 5,
        Piece::WhiteKing => 6,
        Piece::BlackPawn => 7,
        Piece::BlackKnight => 8,
        Piece::BlackBishop => 9,
        Piece::BlackRook => 10,
        Piece::BlackQueen => 11,
        Piece::BlackKing => 12,
        _ => 0,
    }
}

#[inline]
pub fn piece_type_index(pt: PieceType) -> usize {
    match pt {
        PieceType::P => 1,
        PieceType::N => 2,
        PieceType::B => 3,
        PieceType::R => 4,
        PieceType::Q => 5,
        PieceType::K => 6,
        _ => 0,
    }
}

#[inline]
fn side_index(side: Player) -> usize {
    match side {
        Player::White => 0,
        Player::Black => 1,
    }
}

/// History indexed by (side to move, from square, to square).
pub struct ButterflyHistory {
    table: Vec<i32>,
}

impl ButterflyHistory {
    pub fn new() -> Self {
        Self { table: vec![0; 2 * SQUARE_NB * SQUARE_NB] }
    }

    #[inline]
    fn index(side: Player, from: SQ, to: SQ) -> usize {
        (side_index(side) * SQUARE_NB + from.0 as usize) * SQUARE_NB + to.0 as usize
    }

    #[inline]
    pub fn get(&self, side: Player, from: SQ, to: SQ) -> i32 {
        self.table[Self::index(side, from, to)]
    }

    pub fn set(&mut self, side: Player, from: SQ, to: SQ, value: i32) {
        self.table[Self::index(side, from, to)] = value;
    }
}

impl Default for ButterflyHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// History indexed by (moving piece, destination, captured piece type).
pub struct CaptureHistory {
    table: Vec<i32>,
}

impl CaptureHistory {
    pub fn new() -> Self {
        Self { table: vec![0; PIECE_NB * SQUARE_NB * PIECE_TYPE_NB] }
    }

    #[inline]
    fn index(pc: Piece, to: SQ, captured: PieceType) -> usize {
        (piece_index(pc) * SQUARE_NB + to.0 as usize) * PIECE_TYPE_NB + piece_type_index(captured)
    }

    #[inline]
    pub fn get(&self, pc: Piece, to: SQ, captured: PieceType) -> i32 {
        self.table[Self::index(pc, to, captured)]
    }

    pub fn set(&mut self, pc: Piece, to: SQ, captured: PieceType, value: i32) {
        self.table[Self::index(pc, to, captured)] = value;
    }
}

impl Default for CaptureHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// History indexed by (moving piece, destination). One of these exists per
/// continuation slot, keyed by an earlier move on the current line.
pub struct PieceToHistory {
    table: Vec<i32>,
}

impl PieceToHistory {
    pub fn new() -> Self {
        Self { table: vec![0; PIECE_NB * SQUARE_NB] }
    }

    #[inline]
    fn index(pc: Piece, to: SQ) -> usize {
        piece_index(pc) * SQUARE_NB + to.0 as usize
    }

    #[inline]
    pub fn get(&self, pc: Piece, to: SQ) -> i32 {
        self.table[Self::index(pc, to)]
    }

    pub fn set(&mut self, pc: Piece, to: SQ, value: i32) {
        self.table[Self::index(pc, to)] = value;
    }
}

impl Default for PieceToHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-level continuation history: the move made j plies back, identified by
/// its (piece, destination), selects a `PieceToHistory` used to score the
/// moves that follow it.
pub struct ContinuationHistory {
    entries: Vec<PieceToHistory>,
}

impl ContinuationHistory {
    pub fn new() -> Self {
        let mut entries = Vec::with_capacity(PIECE_NB * SQUARE_NB);
        for _ in 0..PIECE_NB * SQUARE_NB {
            entries.push(PieceToHistory::new());
        }
        Self { entries }
    }

    #[inline]
    pub fn get(&self, pc: Piece, to: SQ) -> &PieceToHistory {
        &self.entries[PieceToHistory::index(pc, to)]
    }

    pub fn get_mut(&mut self, pc: Piece, to: SQ) -> &mut PieceToHistory {
        &mut self.entries[PieceToHistory::index(pc, to)]
    }
}

impl Default for ContinuationHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Best known reply to the move that just landed (piece, destination).
pub struct CounterMoveTable {
    table: Vec<Option<BitMove>>,
}

impl CounterMoveTable {
    pub fn new() -> Self {
        Self { table: vec![None; PIECE_NB * SQUARE_NB] }
    }

    #[inline]
    pub fn get(&self, pc: Piece, to: SQ) -> Option<BitMove> {
        self.table[PieceToHistory::index(pc, to)]
    }

    pub fn set(&mut self, pc: Piece, to: SQ, m: Option<BitMove>) {
        self.table[PieceToHistory::index(pc, to)] = m;
    }
}

impl Default for CounterMoveTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Bundle owned by whoever drives a search; the picker and the tree-search
/// driver borrow from it.
pub struct HistoryTables {
    pub butterfly: ButterflyHistory,
    pub capture: CaptureHistory,
    pub continuation: ContinuationHistory,
    pub counter_moves: CounterMoveTable,
}

impl HistoryTables {
    pub fn new() -> Self {
        Self {
            butterfly: ButterflyHistory::new(),
            capture: CaptureHistory::new(),
            continuation: ContinuationHistory::new(),
            counter_moves: CounterMoveTable::new(),
        }
    }
}

impl Default for HistoryTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn butterfly_round_trip() {
        let mut h = ButterflyHistory::new();
        assert_eq!(h.get(Player::White, SQ(12), SQ(28)), 0);
        h.set(Player::White, SQ(12), SQ(28), 77);
        assert_eq!(h.get(Player::White, SQ(12), SQ(28)), 77);
        assert_eq!(h.get(Player::Black, SQ(12), SQ(28)), 0);
    }

    #[test]
    fn continuation_slots_are_independent() {
        let mut c = ContinuationHistory::new();
        c.get_mut(Piece::WhiteKnight, SQ(21)).set(Piece::BlackPawn, SQ(35), 9);
        assert_eq!(c.get(Piece::WhiteKnight, SQ(21)).get(Piece::BlackPawn, SQ(35)), 9);
        assert_eq!(c.get(Piece::WhiteKnight, SQ(22)).get(Piece::BlackPawn, SQ(35)), 0);
    }
}
