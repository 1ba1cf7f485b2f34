//! History統計
//!
//! β カットを起こした静かな手を [piece][to] 単位で記録し、
//! 静かな手の順序付けに利用する。

use crate::types::{Depth, Move, Piece, Square};

/// いずれかのエントリがこの値に達したら全体を半分にする
pub const HISTORY_MAX: i32 = 65536;

/// History テーブル: [piece][to] -> score
pub struct HistoryTable {
    table: Box<[[i32; Square::NUM]; Piece::NUM]>,
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            table: Box::new([[0; Square::NUM]; Piece::NUM]),
        }
    }

    pub fn clear(&mut self) {
        for row in self.table.iter_mut() {
            row.fill(0);
        }
    }

    /// 値を取得
    #[inline]
    pub fn get(&self, piece: Piece, to: Square) -> i32 {
        self.table[piece.index()][to.index()]
    }

    /// カットを起こした手を記録（深さを加算、飽和したら全体を半減）
    pub fn add(&mut self, mv: Move, depth: Depth) {
        let entry = &mut self.table[mv.piece().index()][mv.to().index()];
        *entry += depth;
        if *entry >= HISTORY_MAX {
            self.halve();
        }
    }

    fn halve(&mut self) {
        for row in self.table.iter_mut() {
            for v in row.iter_mut() {
                *v /= 2;
            }
        }
    }
}
