use pleco::{BitMove, Board, Piece, PieceType, Player};

use crate::search::eval::piece_value;

/// Static exchange evaluation via the swap list on the target square.
/// Returns net material gain from the side-to-move perspective in centipawns,
/// or `None` when the move is not a capture.
pub fn see_gain_cp(board: &Board, m: BitMove) -> Option<i32> {
    if !m.is_capture() {
        return None;
    }

    let to = m.get_dest();
    let from = m.get_src();

    let victim_piece = board.piece_at_sq(to);
    // En passant: the destination is empty but a pawn comes off the board
    let victim_val = if victim_piece == Piece::None {
        piece_value(PieceType::P)
    } else {
        piece_value(victim_piece.type_of())
    };

    let attacker_piece = board.piece_at_sq(from);
    if attacker_piece == Piece::None {
        return None;
    }
    let mut gains: Vec<i32> = vec![victim_val];

    // Work on a clone so we can play out the exchange safely
    let mut cur = board.clone();
    cur.apply_move(m);
    let mut side = match board.turn() {
        Player::White => Player::Black,
        Player::Black => Player::White,
    };
    let mut current_occ_val = piece_value(attacker_piece.type_of());

    // Keep capturing back with the least valuable legal attacker onto 'to'
    loop {
        let moves = cur.generate_moves();
        let mut best_mv: Option<BitMove> = None;
        let mut best_attacker_val = i32::MAX;
        for mv in moves.iter() {
            if mv.get_dest() == to && mv.is_capture() {
                let src = mv.get_src();
                let p = cur.piece_at_sq(src);
                if p != Piece::None && cur.turn() == side {
                    let val = piece_value(p.type_of());
                    if val < best_attacker_val {
                        best_attacker_val = val;
                        best_mv = Some(*mv);
                    }
                }
            }
        }
        if let Some(mv2) = best_mv {
            // Next gain equals the value of the piece standing on 'to' minus
            // the previous gain
            let next_gain = current_occ_val - *gains.last().unwrap();
            gains.push(next_gain);
            cur.apply_move(mv2);
            side = match side {
                Player::White => Player::Black,
                Player::Black => Player::White,
            };
            current_occ_val = best_attacker_val;
        } else {
            break;
        }
    }

    // Each side may decline to recapture, so the speculative gains collapse
    // from the deep end: gains[i] = min(gains[i], -gains[i + 1])
    for i in (0..gains.len().saturating_sub(1)).rev() {
        let alt = -gains[i + 1];
        if alt < gains[i] {
            gains[i] = alt;
        }
    }
    Some(gains[0])
}

/// True when the exchange initiated by `m` nets at least `threshold`
/// centipawns. Non-captures stand pat at zero gain.
pub fn see_ge(board: &Board, m: BitMove, threshold: i32) -> bool {
    match see_gain_cp(board, m) {
        Some(gain) => gain >= threshold,
        None => 0 >= threshold,
    }
}
