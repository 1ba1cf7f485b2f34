//! alpha_beta / qsearch のテスト（ノード単位）

use super::{new_worker, with_stack};
use crate::movegen::parse_uci_move;
use crate::position::Position;
use crate::search::SearchConfig;
use crate::types::{Bound, Value};

fn full_window() -> (Value, Value) {
    (-Value::MATE, Value::MATE)
}

#[test]
fn test_checkmated_node_returns_mated_score() {
    with_stack(|| {
        let mut worker = new_worker(SearchConfig::plain());
        let mut pos = Position::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let (alpha, beta) = full_window();
        let value = worker.search_node(&mut pos, 2, alpha, beta, 0, true, true);
        assert_eq!(value, Value::mated_in(0));
    });
}

#[test]
fn test_stalemate_node_is_draw() {
    with_stack(|| {
        let mut worker = new_worker(SearchConfig::default());
        let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let (alpha, beta) = full_window();
        let value = worker.search_node(&mut pos, 3, alpha, beta, 0, true, true);
        assert_eq!(value, Value::DRAW);
    });
}

#[test]
fn test_repetition_is_draw() {
    with_stack(|| {
        let mut worker = new_worker(SearchConfig::default());
        let mut pos = Position::startpos();
        for s in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let mv = parse_uci_move(&mut pos, s).unwrap();
            pos.make_move(mv);
        }
        assert!(pos.is_repetition());
        let (alpha, beta) = full_window();
        let value = worker.search_node(&mut pos, 3, alpha, beta, 1, true, true);
        assert_eq!(value, Value::DRAW);
    });
}

#[test]
fn test_fifty_move_rule_is_draw() {
    with_stack(|| {
        let mut worker = new_worker(SearchConfig::default());
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 100 80").unwrap();
        let (alpha, beta) = full_window();
        assert_eq!(worker.search_node(&mut pos, 2, alpha, beta, 1, true, true), Value::DRAW);
        assert_eq!(worker.quiescence(&mut pos, 0, alpha, beta, 1, true, true), Value::DRAW);
    });
}

#[test]
fn test_mate_in_one_found_with_and_without_pruning() {
    with_stack(|| {
        let fen = "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1";
        for config in [SearchConfig::plain(), SearchConfig::default()] {
            let mut worker = new_worker(config);
            let mut pos = Position::from_fen(fen).unwrap();
            let (alpha, beta) = full_window();
            let value = worker.search_node(&mut pos, 3, alpha, beta, 0, true, true);
            assert_eq!(value, Value::mate_in(1));
            let best = parse_uci_move(&mut pos, "a1a8").unwrap();
            assert_eq!(worker.pv.first(0), Some(best));
        }
    });
}

#[test]
fn test_quiescence_stand_pat_in_quiet_position() {
    with_stack(|| {
        let mut worker = new_worker(SearchConfig::plain());
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/3P4/4K3 w - - 0 1").unwrap();
        let eval = worker.evaluator.evaluate(&pos);
        let (alpha, beta) = full_window();
        let value = worker.quiescence(&mut pos, 0, alpha, beta, 0, true, true);
        assert_eq!(value, eval);
    });
}

#[test]
fn test_quiescence_wins_hanging_queen() {
    with_stack(|| {
        let mut worker = new_worker(SearchConfig::plain());
        let mut pos = Position::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        let stand_pat = worker.evaluator.evaluate(&pos);
        let (alpha, beta) = full_window();
        let value = worker.quiescence(&mut pos, 0, alpha, beta, 0, true, true);
        assert!(stand_pat < Value::DRAW);
        assert!(value > Value::new(300), "value = {}", value.raw());
    });
}

#[test]
fn test_quiescence_in_check_without_evasion_is_mated() {
    with_stack(|| {
        let mut worker = new_worker(SearchConfig::plain());
        let mut pos = Position::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let (alpha, beta) = full_window();
        let value = worker.quiescence(&mut pos, 0, alpha, beta, 3, true, true);
        assert_eq!(value, Value::mated_in(3));
    });
}

#[test]
fn test_root_entry_matches_search_result() {
    with_stack(|| {
        let mut worker = new_worker(SearchConfig::default());
        let mut pos = Position::startpos();
        let (alpha, beta) = full_window();
        let value = worker.search_node(&mut pos, 3, alpha, beta, 0, true, true);

        let entry = worker.tt.get(pos.key()).unwrap();
        assert_eq!(entry.depth(), 3);
        assert_eq!(entry.bound(), Bound::Exact);
        assert_eq!(entry.value(0), value);
        assert!(entry.mv().is_some());
        assert_eq!(worker.pv.first(0), Some(entry.mv()));
    });
}

#[test]
fn test_search_restores_position() {
    with_stack(|| {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut worker = new_worker(SearchConfig::default());
        let mut pos = Position::from_fen(fen).unwrap();
        let key = pos.key();
        let (alpha, beta) = full_window();
        worker.search_node(&mut pos, 3, alpha, beta, 0, true, true);
        assert_eq!(pos.key(), key);
        assert_eq!(pos.to_fen(), fen);
    });
}

#[test]
fn test_iid_finds_move_for_node_without_hash_move() {
    with_stack(|| {
        let mut worker = new_worker(SearchConfig::default());
        let mut pos = Position::startpos();
        assert!(worker.tt.get(pos.key()).is_none());

        let mv = worker.internal_iterative_deepening(&mut pos, 4, 0).unwrap();
        assert_eq!(pos.to_fen(), Position::startpos().to_fen());

        // 最後の浅い探索（深さ3）の結果が置換表に残る
        let entry = worker.tt.get(pos.key()).unwrap();
        assert_eq!(entry.depth(), 3);
        assert_eq!(entry.bound(), Bound::Exact);
        assert_eq!(entry.mv(), mv);
        assert!(worker.pv.first(0).is_none());
    });
}

#[test]
fn test_iid_keeps_mating_move_inside_window() {
    with_stack(|| {
        let mut worker = new_worker(SearchConfig::default());
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let expected = parse_uci_move(&mut pos, "a1a8").unwrap();
        assert_eq!(worker.internal_iterative_deepening(&mut pos, 3, 0), Some(expected));
    });
}

#[test]
fn test_iid_gives_up_when_aborted() {
    with_stack(|| {
        let mut worker = new_worker(SearchConfig::default());
        worker.signals.request_stop();
        worker.signals.allow_stop();
        let mut pos = Position::startpos();
        assert_eq!(worker.internal_iterative_deepening(&mut pos, 4, 0), None);
    });
}
