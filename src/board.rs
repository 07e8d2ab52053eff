//! Board wrapper that tracks its own move stack so a search can rewind to
//! the root between descents.

use pleco::{BitMove, Board};
use std::ops::{Deref, DerefMut};
use thiserror::Error;

use crate::search::zobrist::pawn_key;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("invalid FEN '{0}'")]
    InvalidFen(String),
}

pub struct SearchBoard {
    board: Board,
    stack: Vec<BitMove>,
}

impl SearchBoard {
    pub fn startpos() -> Self {
        Self { board: Board::start_pos(), stack: Vec::new() }
    }

    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let board = Board::from_fen(fen).map_err(|_| BoardError::InvalidFen(fen.to_string()))?;
        Ok(Self { board, stack: Vec::new() })
    }

    pub fn from_board(board: &Board) -> Self {
        Self { board: board.clone(), stack: Vec::new() }
    }

    #[inline]
    pub fn inner(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn inner_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Plies played since this wrapper was created (or last rewound).
    pub fn ply(&self) -> usize {
        self.stack.len()
    }

    pub fn make(&mut self, m: BitMove) {
        self.board.apply_move(m);
        self.stack.push(m);
    }

    pub fn unmake(&mut self) -> Option<BitMove> {
        let m = self.stack.pop()?;
        self.board.undo_move();
        Some(m)
    }

    pub fn rewind(&mut self) {
        while self.unmake().is_some() {}
    }

    /// Identity of the current position: full hash plus pawn-structure hash.
    pub fn keys(&self) -> (u64, u64) {
        (self.board.zobrist(), pawn_key(&self.board))
    }

    pub fn is_legal(&self, m: BitMove) -> bool {
        self.board.generate_moves().iter().any(|lm| *lm == m)
    }

    /// Make a move that is undone when the returned guard drops.
    pub fn play(&mut self, m: BitMove) -> AppliedMove<'_> {
        self.make(m);
        AppliedMove { inner: self }
    }
}

pub struct AppliedMove<'a> {
    inner: &'a mut SearchBoard,
}

impl Deref for AppliedMove<'_> {
    type Target = SearchBoard;

    fn deref(&self) -> &SearchBoard {
        self.inner
    }
}

impl DerefMut for AppliedMove<'_> {
    fn deref_mut(&mut self) -> &mut SearchBoard {
        self.inner
    }
}

impl Drop for AppliedMove<'_> {
    fn drop(&mut self) {
        self.inner.unmake();
    }
}
