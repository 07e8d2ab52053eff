pub mod eval;
pub mod history;
pub mod movepick;
pub mod see;
pub mod zobrist;
