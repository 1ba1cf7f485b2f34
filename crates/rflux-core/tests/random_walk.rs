//! ランダムな手順で make/undo を繰り返しても局面が壊れないことを確かめる

use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rflux_core::movegen::generate_legal;
use rflux_core::position::Position;
use rflux_core::types::Move;

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]

    #[test]
    fn prop_random_walk_restores_position(seed in any::<u64>(), plies in 1usize..80) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut pos = Position::startpos();
        let start_fen = pos.to_fen();
        let start_key = pos.key();
        let mut played: Vec<Move> = Vec::new();

        for _ in 0..plies {
            let moves = generate_legal(&mut pos);
            if moves.is_empty() {
                break;
            }
            let mv = moves.at(rng.random_range(0..moves.len()));
            pos.make_move(mv);
            played.push(mv);

            // 差分更新したハッシュは作り直した値と一致する
            prop_assert_eq!(pos.key(), pos.compute_key());
            prop_assert_eq!(pos.pawn_key(), pos.compute_pawn_key());

            // FEN を経由しても同じ局面になる
            let reparsed = Position::from_fen(&pos.to_fen()).unwrap();
            prop_assert_eq!(reparsed.key(), pos.key());
        }

        while let Some(mv) = played.pop() {
            pos.undo_move(mv);
        }
        prop_assert_eq!(pos.key(), start_key);
        prop_assert_eq!(pos.to_fen(), start_fen);
    }
}
