use pleco::{BitMove, Board, Piece, PieceType, Player};

pub const MATE_SCORE: i32 = 30_000;
pub const DRAW_SCORE: i32 = 0;
// Sentinel returned when a reward is clamped at the extremes; anything at or
// above this magnitude is treated as a decided position.
pub const KNOWN_WIN: i32 = 10_000;

#[inline]
pub fn piece_value(pt: PieceType) -> i32 {
    match pt {
        PieceType::P => 100,
        PieceType::N => 320,
        PieceType::B => 330,
        PieceType::R => 500,
        PieceType::Q => 900,
        PieceType::K => 20_000,
        _ => 0,
    }
}

/// Material count in centipawns from the side-to-move perspective
/// (negamax-friendly).
pub fn material_eval_cp(board: &Board) -> i32 {
    let mut score = 0i32;
    for &(p, v) in &[
        (PieceType::P, 100),
        (PieceType::N, 320),
        (PieceType::B, 330),
        (PieceType::R, 500),
        (PieceType::Q, 900),
    ] {
        score += board.count_piece(Player::White, p) as i32 * v;
        score -= board.count_piece(Player::Black, p) as i32 * v;
    }
    if board.turn() == Player::White {
        score
    } else {
        -score
    }
}

#[inline]
pub fn mvv_lva(board: &Board, m: BitMove) -> i32 {
    let to = m.get_dest();
    let from = m.get_src();
    let v_piece = board.piece_at_sq(to);
    let a_piece = board.piece_at_sq(from);
    let v = if v_piece != Piece::None { piece_value(v_piece.type_of()) } else { 0 };
    let a = if a_piece != Piece::None { piece_value(a_piece.type_of()) } else { 0 };
    v * 10 - a
}

/// Scalar value of the current position from the side-to-move perspective.
/// Depth 0 resolves captures with a quiescence search; positive depths run a
/// plain fixed-depth negamax with quiescence leaves.
pub fn evaluate(board: &mut Board, depth: i32) -> i32 {
    if depth <= 0 {
        qsearch(board, -MATE_SCORE, MATE_SCORE)
    } else {
        minimax(board, depth, -MATE_SCORE, MATE_SCORE)
    }
}

pub fn qsearch(board: &mut Board, mut alpha: i32, beta: i32) -> i32 {
    let stand = material_eval_cp(board);
    if stand >= beta {
        return beta;
    }
    if stand > alpha {
        alpha = stand;
    }
    let mut caps: Vec<BitMove> = board
        .generate_moves()
        .iter()
        .copied()
        .filter(|m| m.is_capture())
        .collect();
    caps.sort_by_key(|&m| -mvv_lva(board, m));
    for m in caps {
        board.apply_move(m);
        let sc = -qsearch(board, -beta, -alpha);
        board.undo_move();
        if sc >= beta {
            return beta;
        }
        if sc > alpha {
            alpha = sc;
        }
    }
    alpha
}

fn minimax(board: &mut Board, depth: i32, mut alpha: i32, beta: i32) -> i32 {
    if depth == 0 {
        return qsearch(board, alpha, beta);
    }
    let moves: Vec<BitMove> = board.generate_moves().iter().copied().collect();
    if moves.is_empty() {
        return if board.in_check() { -MATE_SCORE } else { DRAW_SCORE };
    }
    let mut best = -MATE_SCORE;
    for m in moves {
        board.apply_move(m);
        let sc = -minimax(board, depth - 1, -beta, -alpha);
        board.undo_move();
        if sc > best {
            best = sc;
        }
        if sc > alpha {
            alpha = sc;
        }
        if alpha >= beta {
            break;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_balanced() {
        let mut b = Board::start_pos();
        assert_eq!(material_eval_cp(&b), 0);
        assert_eq!(evaluate(&mut b, 0), 0);
    }

    #[test]
    fn qsearch_resolves_hanging_piece() {
        // White queen attacks an undefended black rook
        let mut b = Board::from_fen("4k3/8/3r4/8/3Q4/8/8/4K3 w - - 0 1").expect("valid fen");
        let v = evaluate(&mut b, 0);
        assert!(v >= 900, "should win at least the rook swing: {}", v);
    }

    #[test]
    fn qsearch_leaves_board_unchanged() {
        let mut b = Board::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/3PP3/8/PPP2PPP/RNBQKBNR b KQkq - 0 3")
            .expect("valid fen");
        let key = b.zobrist();
        let _ = evaluate(&mut b, 0);
        assert_eq!(b.zobrist(), key);
        let _ = evaluate(&mut b, 2);
        assert_eq!(b.zobrist(), key);
    }
}
