//! 既知の局面の perft 値で指し手生成と make/undo を検証する
//!
//! 深い値は時間がかかるため `--ignored` で実行する。

use rflux_core::movegen::perft;
use rflux_core::position::{Position, STARTPOS_FEN};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

fn check(fen: &str, expected: &[u64]) {
    let mut pos = Position::from_fen(fen).unwrap();
    let key = pos.key();
    for (i, &nodes) in expected.iter().enumerate() {
        let depth = i as u32 + 1;
        assert_eq!(perft(&mut pos, depth), nodes, "{fen} depth {depth}");
        assert_eq!(pos.key(), key);
    }
    assert_eq!(pos.to_fen(), fen);
}

#[test]
fn test_perft_startpos() {
    check(STARTPOS_FEN, &[20, 400, 8902, 197_281]);
}

#[test]
fn test_perft_kiwipete() {
    check(KIWIPETE, &[48, 2039]);
}

#[test]
#[ignore]
fn test_perft_kiwipete_deep() {
    check(KIWIPETE, &[48, 2039, 97_862]);
}

#[test]
fn test_perft_position_3() {
    check(POSITION_3, &[14, 191, 2812, 43_238]);
}

#[test]
fn test_perft_position_4() {
    check(POSITION_4, &[6, 264, 9467]);
}

#[test]
fn test_perft_position_5() {
    check(POSITION_5, &[44, 1486]);
}

#[test]
#[ignore]
fn test_perft_position_5_deep() {
    check(POSITION_5, &[44, 1486, 62_379]);
}
