//! 指し手生成器
//!
//! 駒取り・成り（tactical）と静かな手（quiet）は擬似合法手として生成し、
//! 自玉を取られる手の除外は `Position::is_legal` に任せる。
//! 王手回避手だけは生成時点で合法手になっている。

use crate::position::{Attack, Position, BISHOP_DELTAS, KNIGHT_DELTAS, QUEEN_DELTAS, ROOK_DELTAS};
use crate::types::{CastlingRights, Color, Move, MoveKind, Piece, PieceType, Square};

use super::movelist::MoveList;

#[derive(Clone, Copy, PartialEq, Eq)]
enum GenType {
    /// 駒取り（成りを含む）
    Tactical,
    /// 駒取りでも成りでもない手
    Quiet,
}

const PIECE_TYPES: [PieceType; 5] = [
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Rook,
    PieceType::Queen,
    PieceType::King,
];

#[inline]
fn piece_deltas(pt: PieceType) -> &'static [i32] {
    match pt {
        PieceType::Knight => &KNIGHT_DELTAS,
        PieceType::Bishop => &BISHOP_DELTAS,
        PieceType::Rook => &ROOK_DELTAS,
        _ => &QUEEN_DELTAS,
    }
}

/// 歩の移動（最終段なら4種類の成りに展開する）
fn add_pawn_move(list: &mut MoveList, us: Color, from: Square, to: Square, captured: Piece) {
    let pawn = Piece::new(us, PieceType::Pawn);
    if to.relative_rank(us) == 7 {
        for pt in PieceType::PROMOTIONS {
            list.push(Move::new(MoveKind::Promotion, from, to, pawn, captured, Some(pt)));
        }
    } else {
        list.push(Move::normal(from, to, pawn, captured));
    }
}

/// 歩以外の駒の移動
fn generate_piece_moves(pos: &Position, kind: GenType, list: &mut MoveList) {
    let us = pos.side_to_move();
    for pt in PIECE_TYPES {
        let piece = Piece::new(us, pt);
        for from in pos.pieces(us, pt).iter() {
            for &delta in piece_deltas(pt) {
                let mut cur = from.offset(delta);
                while let Some(to) = cur {
                    let target = pos.piece_on(to);
                    if target.is_none() {
                        if kind == GenType::Quiet {
                            list.push(Move::normal(from, to, piece, Piece::NONE));
                        }
                        if !pt.is_slider() {
                            break;
                        }
                        cur = to.offset(delta);
                        continue;
                    }
                    if kind == GenType::Tactical
                        && target.color() != us
                        && target.piece_type() != Some(PieceType::King)
                    {
                        list.push(Move::normal(from, to, piece, target));
                    }
                    break;
                }
            }
        }
    }
}

/// 駒取り・成り・アンパッサンを生成
pub fn generate_tactical(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let push = us.pawn_push();

    for from in pos.pieces(us, PieceType::Pawn).iter() {
        for side in [-1, 1] {
            if let Some(to) = from.offset(push + side) {
                let target = pos.piece_on(to);
                if target.is_some()
                    && target.color() != us
                    && target.piece_type() != Some(PieceType::King)
                {
                    add_pawn_move(list, us, from, to, target);
                }
            }
        }
        if from.relative_rank(us) == 6 {
            if let Some(to) = from.offset(push) {
                if pos.piece_on(to).is_none() {
                    add_pawn_move(list, us, from, to, Piece::NONE);
                }
            }
        }
    }

    if let Some(ep) = pos.ep_square() {
        let pawn = Piece::new(us, PieceType::Pawn);
        let victim = Piece::new(!us, PieceType::Pawn);
        for side in [-1, 1] {
            if let Some(from) = ep.offset(-push + side) {
                if pos.piece_on(from) == pawn {
                    list.push(Move::new(MoveKind::EnPassant, from, ep, pawn, victim, None));
                }
            }
        }
    }

    generate_piece_moves(pos, GenType::Tactical, list);
}

/// 静かな手（歩の前進・駒の移動・キャスリング）を生成
pub fn generate_quiet(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let push = us.pawn_push();
    let pawn = Piece::new(us, PieceType::Pawn);

    for from in pos.pieces(us, PieceType::Pawn).iter() {
        let Some(to) = from.offset(push) else {
            continue;
        };
        if pos.piece_on(to).is_some() || to.relative_rank(us) == 7 {
            continue;
        }
        list.push(Move::normal(from, to, pawn, Piece::NONE));
        if from.relative_rank(us) == 1 {
            if let Some(to2) = to.offset(push) {
                if pos.piece_on(to2).is_none() {
                    list.push(Move::new(MoveKind::PawnDouble, from, to2, pawn, Piece::NONE, None));
                }
            }
        }
    }

    generate_piece_moves(pos, GenType::Quiet, list);
    generate_castling(pos, list);
}

/// キャスリング
///
/// 権利があり、間の升が空いていて、キングが通過する升に利きがない場合のみ生成する。
/// 移動先の升は `is_legal` で確かめる。
fn generate_castling(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let rights = pos.castling_rights();
    let kingside = CastlingRights::kingside(us);
    let queenside = CastlingRights::queenside(us);
    if !rights.contains(kingside) && !rights.contains(queenside) {
        return;
    }

    let them = !us;
    let king = pos.king_square(us);
    if pos.is_attacked(king, them) {
        return;
    }
    let king_piece = Piece::new(us, PieceType::King);
    let (b, c, d, f, g) = match us {
        Color::White => (Square::B1, Square::C1, Square::D1, Square::F1, Square::G1),
        Color::Black => (Square::B8, Square::C8, Square::D8, Square::F8, Square::G8),
    };
    let empty = |sq: Square| pos.piece_on(sq).is_none();

    if rights.contains(kingside) && empty(f) && empty(g) && !pos.is_attacked(f, them) {
        list.push(Move::new(MoveKind::Castling, king, g, king_piece, Piece::NONE, None));
    }
    if rights.contains(queenside)
        && empty(b)
        && empty(c)
        && empty(d)
        && !pos.is_attacked(d, them)
    {
        list.push(Move::new(MoveKind::Castling, king, c, king_piece, Piece::NONE, None));
    }
}

/// 王手回避手を生成（すべて合法手）
///
/// キングの移動、王手駒の捕獲、飛び駒の王手への合駒。両王手ならキングの移動のみ。
pub fn generate_evasions(pos: &mut Position, attack: &Attack, list: &mut MoveList) {
    debug_assert!(attack.is_check());
    let us = pos.side_to_move();
    let them = !us;
    let king = pos.king_square(us);
    let king_piece = Piece::new(us, PieceType::King);

    // キングの移動
    'king: for &delta in &QUEEN_DELTAS {
        let Some(to) = king.offset(delta) else {
            continue;
        };
        let target = pos.piece_on(to);
        if target.is_some() && target.color() == us {
            continue;
        }
        // 飛び駒の王手の延長線上には逃げられない
        for i in 0..attack.count() {
            let checker = pos.piece_on(attack.square(i));
            if checker.piece_type().is_some_and(PieceType::is_slider) && attack.delta(i) == delta {
                continue 'king;
            }
        }
        if !pos.is_attacked(to, them) {
            list.push(Move::normal(king, to, king_piece, target));
        }
    }

    if attack.count() >= 2 {
        return;
    }

    let checker_sq = attack.square(0);
    let checker = pos.piece_on(checker_sq);
    let push = us.pawn_push();
    let pawn = Piece::new(us, PieceType::Pawn);

    // 王手駒を取る
    for side in [-1, 1] {
        if let Some(from) = checker_sq.offset(-push + side) {
            if pos.piece_on(from) == pawn && !pos.is_pinned(from, us) {
                add_pawn_move(list, us, from, checker_sq, checker);
            }
        }
    }
    if checker.piece_type() == Some(PieceType::Pawn) {
        if let Some(ep) = pos.ep_square() {
            if checker_sq.offset(push) == Some(ep) {
                for side in [-1, 1] {
                    let Some(from) = checker_sq.offset(side) else {
                        continue;
                    };
                    if pos.piece_on(from) != pawn {
                        continue;
                    }
                    let mv = Move::new(MoveKind::EnPassant, from, ep, pawn, checker, None);
                    // 同じ段から2つの歩が消えるので、ピンも含めて実際に指して確かめる
                    pos.make_move(mv);
                    let legal = !pos.is_attacked(king, them);
                    pos.undo_move(mv);
                    if legal {
                        list.push(mv);
                    }
                }
            }
        }
    }
    for pt in [PieceType::Knight, PieceType::Bishop, PieceType::Rook, PieceType::Queen] {
        let piece = Piece::new(us, pt);
        for from in pos.pieces(us, pt).iter() {
            if pos.can_attack(pt, us, from, checker_sq) && !pos.is_pinned(from, us) {
                list.push(Move::normal(from, checker_sq, piece, checker));
            }
        }
    }

    // 合駒
    if !checker.piece_type().is_some_and(PieceType::is_slider) {
        return;
    }
    let delta = attack.delta(0);
    let mut cur = checker_sq.offset(delta);
    while let Some(block) = cur {
        if block == king {
            break;
        }

        if let Some(from) = block.offset(-push) {
            if pos.piece_on(from) == pawn {
                if !pos.is_pinned(from, us) {
                    add_pawn_move(list, us, from, block, Piece::NONE);
                }
            } else if pos.piece_on(from).is_none() && block.relative_rank(us) == 3 {
                if let Some(from2) = from.offset(-push) {
                    if pos.piece_on(from2) == pawn && !pos.is_pinned(from2, us) {
                        list.push(Move::new(
                            MoveKind::PawnDouble,
                            from2,
                            block,
                            pawn,
                            Piece::NONE,
                            None,
                        ));
                    }
                }
            }
        }

        for pt in [PieceType::Knight, PieceType::Bishop, PieceType::Rook, PieceType::Queen] {
            let piece = Piece::new(us, pt);
            for from in pos.pieces(us, pt).iter() {
                if pos.can_attack(pt, us, from, block) && !pos.is_pinned(from, us) {
                    list.push(Move::normal(from, block, piece, Piece::NONE));
                }
            }
        }

        cur = block.offset(delta);
    }
}

/// 王手になる静かな手を生成（擬似合法手）
pub fn generate_quiet_checks(pos: &mut Position, list: &mut MoveList) {
    let mut quiets = MoveList::new();
    generate_quiet(pos, &mut quiets);
    for ext in quiets.iter() {
        if pos.is_checking_move(ext.mv) {
            list.push(ext.mv);
        }
    }
}

/// 合法手をすべて生成
pub fn generate_legal(pos: &mut Position) -> MoveList {
    let mut list = MoveList::new();
    let attack = pos.attack(pos.side_to_move());
    if attack.is_check() {
        generate_evasions(pos, &attack, &mut list);
        return list;
    }

    let mut pseudo = MoveList::new();
    generate_tactical(pos, &mut pseudo);
    generate_quiet(pos, &mut pseudo);
    for ext in pseudo.iter() {
        if pos.is_legal(ext.mv) {
            list.push(ext.mv);
        }
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uci_moves(list: &MoveList) -> Vec<String> {
        let mut moves: Vec<String> = list.iter().map(|ext| ext.mv.to_uci()).collect();
        moves.sort();
        moves
    }

    #[test]
    fn test_startpos_move_split() {
        let pos = Position::startpos();
        let mut tactical = MoveList::new();
        generate_tactical(&pos, &mut tactical);
        assert!(tactical.is_empty());

        let mut quiet = MoveList::new();
        generate_quiet(&pos, &mut quiet);
        assert_eq!(quiet.len(), 20);
    }

    #[test]
    fn test_promotions_expand_to_four_pieces() {
        let pos = Position::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut tactical = MoveList::new();
        generate_tactical(&pos, &mut tactical);
        assert_eq!(uci_moves(&tactical), vec!["b7b8b", "b7b8n", "b7b8q", "b7b8r"]);
    }

    #[test]
    fn test_en_passant_generated() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let mut tactical = MoveList::new();
        generate_tactical(&pos, &mut tactical);
        let ep: Vec<_> = tactical
            .iter()
            .filter(|ext| ext.mv.kind() == MoveKind::EnPassant)
            .map(|ext| ext.mv.to_uci())
            .collect();
        assert_eq!(ep, vec!["e5f6"]);
    }

    #[test]
    fn test_castling_blocked_by_attack() {
        // f1 に黒ビショップが利いているのでキング側キャスリング不可
        let pos = Position::from_fen("4k3/8/8/8/8/8/6b1/R3K2R w KQ - 0 1").unwrap();
        let mut quiet = MoveList::new();
        generate_quiet(&pos, &mut quiet);
        let castles: Vec<_> = quiet
            .iter()
            .filter(|ext| ext.mv.kind() == MoveKind::Castling)
            .map(|ext| ext.mv.to_uci())
            .collect();
        assert_eq!(castles, vec!["e1c1"]);
    }

    #[test]
    fn test_double_check_only_king_moves() {
        // ルークとナイトの両王手
        let mut pos = Position::from_fen("4r1k1/8/8/8/8/3n4/8/R3K3 w - - 0 1").unwrap();
        let moves = generate_legal(&mut pos);
        assert!(!moves.is_empty());
        assert!(moves
            .iter()
            .all(|ext| ext.mv.piece_type() == Some(PieceType::King)));
    }

    #[test]
    fn test_evasions_block_and_capture() {
        // e8 のルークによる王手
        let mut pos = Position::from_fen("4r1k1/8/8/8/8/8/3B4/R3K3 w - - 0 1").unwrap();
        let moves = uci_moves(&generate_legal(&mut pos));
        // ビショップの合駒 d2-e3
        assert!(moves.contains(&"d2e3".to_string()));
        // キングは e ファイル上には逃げられない
        assert!(!moves.contains(&"e1e2".to_string()));
        assert!(moves.contains(&"e1d1".to_string()));
        // a1 のルークは王手駒にも e ファイルにも届かない
        assert!(!moves.iter().any(|m| m.starts_with("a1")));
    }

    #[test]
    fn test_pinned_piece_cannot_evade() {
        // e2 のナイトは e8 のルークにピンされているので、
        // h4 のビショップからの王手を g3 で遮ることはできない
        let mut pos = Position::from_fen("4r1k1/8/8/8/7b/8/4N3/4K3 w - - 0 1").unwrap();
        let moves = uci_moves(&generate_legal(&mut pos));
        assert!(moves.iter().all(|m| !m.starts_with("e2")));
    }

    #[test]
    fn test_quiet_checks() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let mut checks = MoveList::new();
        generate_quiet_checks(&mut pos, &mut checks);
        let moves = uci_moves(&checks);
        assert_eq!(moves, vec!["a1a8"]);
    }
}
