//! 探索ヘルパー群
//!
//! - ノード数の計上と定期チェック（停止・ponderhit・状況通知）
//! - 延長の判定
//! - 危険な手の判定（枝刈りの除外条件）
//! - β カットを起こした静かな手の記録

use crate::position::Position;
use crate::types::{Depth, Move, MoveKind, PieceType};

use super::alpha_beta::SearchWorker;
use super::stats::inc_stat;

/// 停止・ponderhit・状況通知を確認するノード間隔（2のべき乗 - 1 のマスク）
const POLL_MASK: u64 = 1023;

/// 7段目（相対）への歩の移動を延長する
const PAWN_EXTENSION_RANK: u8 = 6;

/// 相手の7段目以上へ進む歩、またはクイーンを取る手
///
/// futility / LMR / delta pruning の対象から外す。
#[inline]
pub(super) fn is_dangerous_move(pos: &Position, mv: Move) -> bool {
    let pawn_push = mv.piece_type() == Some(PieceType::Pawn)
        && mv.to().relative_rank(pos.side_to_move()) >= PAWN_EXTENSION_RANK;
    pawn_push || mv.captured().piece_type() == Some(PieceType::Queen)
}

impl SearchWorker {
    /// 1ノード訪問ごとに呼ぶ
    ///
    /// ノード数制限に達したら停止フラグを立てる。停止に従うかは `may_stop` 次第。
    #[inline]
    pub(super) fn update_search(&mut self, ply: usize) {
        self.reporter.count_node(ply);
        let nodes = self.reporter.nodes();
        if self.node_limit > 0 && nodes >= self.node_limit {
            self.signals.request_stop();
        }
        if nodes & POLL_MASK == 0 {
            self.poll();
        }
    }

    /// 定期チェック（ponderhit の反映と状況通知）
    pub(super) fn poll(&mut self) {
        if self.signals.take_ponderhit() {
            self.on_ponderhit();
        }
        if self.reporter.status_due() {
            let hashfull = self.tt.hashfull();
            self.reporter.send_status(hashfull);
        }
    }

    /// 停止要求があり、かつ従ってよいか
    #[inline]
    pub(super) fn aborted(&self) -> bool {
        self.signals.aborted()
    }

    /// 延長を加えた子ノードの深さ
    ///
    /// 取り返し > 王手 > 7段目への歩 > 唯一の回避手 > 詰めろ の順に、最初に当てはまる1つだけ。
    /// それとは別に、相手の最後の大駒を取って歩だけの終盤に入る手はさらに1手延長する。
    pub(super) fn new_depth(
        &mut self,
        pos: &mut Position,
        depth: Depth,
        mv: Move,
        single_reply: bool,
        mate_threat: bool,
    ) -> Depth {
        let mut new_depth = depth - 1;
        let us = pos.side_to_move();

        let extended = if self.config.use_recapture_extension
            && pos.capture_square() == Some(mv.to())
            && pos.see(mv) >= 0
        {
            true
        } else if self.config.use_check_extension && pos.is_checking_move(mv) {
            true
        } else if self.config.use_pawn_extension
            && mv.piece_type() == Some(PieceType::Pawn)
            && mv.to().relative_rank(us) == PAWN_EXTENSION_RANK
        {
            true
        } else if self.config.use_single_reply_extension && single_reply {
            true
        } else {
            self.config.use_mate_threat_extension && mate_threat
        };
        if extended {
            new_depth += 1;
            inc_stat!(self, extensions);
        }

        let captured = mv.captured().piece_type();
        if pos.material_count(us) == 0
            && pos.material_count(!us) == 1
            && captured.is_some()
            && captured != Some(PieceType::Pawn)
        {
            new_depth += 1;
        }

        new_depth
    }

    /// β カット（または最善）を起こした静かな手を killer / history に記録する
    pub(super) fn update_quiet_stats(&mut self, mv: Move, depth: Depth, ply: usize) {
        if mv.is_capture() || mv.is_promotion() || mv.kind() == MoveKind::Null {
            return;
        }
        self.killers.add(ply, mv);
        self.history.add(mv, depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::parse_uci_move;

    #[test]
    fn test_dangerous_pawn_push() {
        let mut pos = Position::from_fen("4k3/8/1P6/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mv = parse_uci_move(&mut pos, "b6b7").unwrap();
        assert!(is_dangerous_move(&pos, mv));

        let mut pos = Position::from_fen("4k3/8/8/1P6/8/8/8/4K3 w - - 0 1").unwrap();
        let mv = parse_uci_move(&mut pos, "b5b6").unwrap();
        assert!(!is_dangerous_move(&pos, mv));
    }

    #[test]
    fn test_dangerous_queen_capture() {
        let mut pos = Position::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap();
        let mv = parse_uci_move(&mut pos, "d1d5").unwrap();
        assert!(is_dangerous_move(&pos, mv));
    }

    #[test]
    fn test_dangerous_black_pawn() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/6p1/8/4K3 b - - 0 1").unwrap();
        let mv = parse_uci_move(&mut pos, "g3g2").unwrap();
        assert!(is_dangerous_move(&pos, mv));
    }
}
