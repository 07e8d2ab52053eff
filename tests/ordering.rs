use pleco::{BitMove, Board};
use pretty_assertions::assert_eq;
use treebot::search::history::HistoryTables;
use treebot::search::movepick::MovePicker;

fn find_move(board: &Board, uci: &str) -> BitMove {
    board
        .generate_moves()
        .iter()
        .copied()
        .find(|m| format!("{}", m) == uci)
        .unwrap_or_else(|| panic!("move {} not legal", uci))
}

fn drain(picker: &mut MovePicker, skip_quiets: bool) -> Vec<String> {
    let mut out = Vec::new();
    while let Some(m) = picker.next(skip_quiets) {
        out.push(format!("{}", m));
    }
    out
}

#[test]
fn startpos_yields_every_move_once() {
    let board = Board::start_pos();
    let h = HistoryTables::new();
    let mut mp = MovePicker::new_main(
        &board, None, 2, &h.butterfly, &h.capture, [None; 4], [None; 2], None,
    );
    let moves = drain(&mut mp, false);
    assert_eq!(moves.len(), 20);
    let mut dedup = moves.clone();
    dedup.sort();
    dedup.dedup();
    assert_eq!(dedup.len(), 20, "duplicate move emitted: {:?}", moves);
}

#[test]
fn bigger_victim_comes_first() {
    // The e4 pawn can take either an undefended rook or an undefended pawn
    let board = Board::from_fen("4k3/8/8/3r1p2/4P3/8/8/4K3 w - - 0 1").expect("valid fen");
    let h = HistoryTables::new();
    let mut mp = MovePicker::new_main(
        &board, None, 2, &h.butterfly, &h.capture, [None; 4], [None; 2], None,
    );
    let moves = drain(&mut mp, false);
    assert_eq!(moves[0], "e4d5");
    assert_eq!(moves[1], "e4f5");
}

#[test]
fn good_captures_extract_in_score_order() {
    // Queen on d3 can take an undefended rook (a3), knight (h7) or pawn (d7)
    let board = Board::from_fen("1k6/3p3n/8/8/8/r2Q4/8/4K3 w - - 0 1").expect("valid fen");

    // Plain victim values: rook, knight, pawn
    let h = HistoryTables::new();
    let mut mp = MovePicker::new_main(
        &board, None, 2, &h.butterfly, &h.capture, [None; 4], [None; 2], None,
    );
    let moves = drain(&mut mp, false);
    assert_eq!(&moves[..3], &["d3a3", "d3h7", "d3d7"]);

    // A capture-history bonus on the knight capture outweighs the rook
    let mut h = HistoryTables::new();
    h.capture.set(pleco::Piece::WhiteQueen, pleco::SQ(55), pleco::PieceType::N, 400);
    let mut mp = MovePicker::new_main(
        &board, None, 2, &h.butterfly, &h.capture, [None; 4], [None; 2], None,
    );
    let moves = drain(&mut mp, false);
    assert_eq!(&moves[..3], &["d3h7", "d3a3", "d3d7"]);
}

#[test]
fn single_evasion_then_exhausted() {
    // Black king in check on the a-file, only b8 escapes
    let board = Board::from_fen("k7/8/1K6/8/8/8/8/R7 b - - 0 1").expect("valid fen");
    let h = HistoryTables::new();
    let mut mp = MovePicker::new_main(
        &board, None, 2, &h.butterfly, &h.capture, [None; 4], [None; 2], None,
    );
    assert_eq!(mp.next(false).map(|m| format!("{}", m)), Some("a8b8".to_string()));
    assert_eq!(mp.next(false), None);
    assert_eq!(mp.next(false), None);
}

#[test]
fn hash_move_leads_and_is_not_repeated() {
    let board = Board::start_pos();
    let tt = find_move(&board, "d2d4");
    let h = HistoryTables::new();
    let mut mp = MovePicker::new_main(
        &board, Some(tt), 2, &h.butterfly, &h.capture, [None; 4], [None; 2], None,
    );
    let moves = drain(&mut mp, false);
    assert_eq!(moves[0], "d2d4");
    assert_eq!(moves.len(), 20);
    assert_eq!(moves.iter().filter(|m| *m == "d2d4").count(), 1);
}

#[test]
fn illegal_hash_move_is_dropped() {
    // a1a8 is not legal at the start position
    let other = Board::from_fen("k7/8/1K6/8/8/8/8/R7 w - - 0 1").expect("valid fen");
    let bogus = find_move(&other, "a1a8");
    let board = Board::start_pos();
    let h = HistoryTables::new();
    let mut mp = MovePicker::new_main(
        &board, Some(bogus), 2, &h.butterfly, &h.capture, [None; 4], [None; 2], None,
    );
    let moves = drain(&mut mp, false);
    assert_eq!(moves.len(), 20);
    assert!(!moves.contains(&"a1a8".to_string()));
}

#[test]
fn killers_and_counter_precede_quiets_without_repeats() {
    let board = Board::start_pos();
    let k0 = find_move(&board, "e2e4");
    let k1 = find_move(&board, "g1f3");
    let h = HistoryTables::new();
    // Counter-move equal to a killer must be suppressed
    let mut mp = MovePicker::new_main(
        &board,
        None,
        2,
        &h.butterfly,
        &h.capture,
        [None; 4],
        [Some(k0), Some(k1)],
        Some(k1),
    );
    let moves = drain(&mut mp, false);
    assert_eq!(moves[0], "e2e4");
    assert_eq!(moves[1], "g1f3");
    assert_eq!(moves.len(), 20);
    assert_eq!(moves.iter().filter(|m| *m == "e2e4").count(), 1);
    assert_eq!(moves.iter().filter(|m| *m == "g1f3").count(), 1);
}

#[test]
fn skip_quiets_still_emits_killers() {
    let board = Board::start_pos();
    let k0 = find_move(&board, "e2e4");
    let h = HistoryTables::new();
    let mut mp = MovePicker::new_main(
        &board,
        None,
        2,
        &h.butterfly,
        &h.capture,
        [None; 4],
        [Some(k0), None],
        None,
    );
    assert_eq!(mp.next(true).map(|m| format!("{}", m)), Some("e2e4".to_string()));
    assert_eq!(mp.next(true), None);
}

#[test]
fn skip_quiets_suppresses_everything_quiet_at_startpos() {
    let board = Board::start_pos();
    let h = HistoryTables::new();
    let mut mp = MovePicker::new_main(
        &board, None, 2, &h.butterfly, &h.capture, [None; 4], [None; 2], None,
    );
    assert_eq!(mp.next(true), None);
}
