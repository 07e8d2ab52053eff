use pleco::{Board, Piece, SQ};
use std::sync::OnceLock;

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// One key per (color, square) for pawns only.
static TABLE: OnceLock<[u64; 2 * 64]> = OnceLock::new();

fn init_table() -> &'static [u64; 2 * 64] {
    TABLE.get_or_init(|| {
        let mut t = [0u64; 2 * 64];
        let mut seed = 0xF00D_F00D_DEAD_BEEF;
        for v in &mut t {
            seed = splitmix64(seed);
            *v = seed;
        }
        t
    })
}

/// Hash of the pawn structure only. Used as the secondary identity of a
/// search-tree node: two positions sharing a primary zobrist slot are
/// considered the same only if their pawn keys also agree.
pub fn pawn_key(board: &Board) -> u64 {
    let table = init_table();
    let mut key = 0u64;
    for idx in 0..64u8 {
        match board.piece_at_sq(SQ(idx)) {
            Piece::WhitePawn => key ^= table[idx as usize],
            Piece::BlackPawn => key ^= table[64 + idx as usize],
            _ => {}
        }
    }
    key
}
