//! Killer テーブル
//!
//! 探索高さごとに、直近で β カットを起こした静かな手を2つ保持する。

use crate::types::{Move, MAX_PLY};

/// 1高さあたりの killer 数
pub const KILLER_SLOTS: usize = 2;

pub struct KillerTable {
    table: Box<[[Move; KILLER_SLOTS]; MAX_PLY]>,
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            table: Box::new([[Move::NONE; KILLER_SLOTS]; MAX_PLY]),
        }
    }

    pub fn clear(&mut self) {
        self.table.fill([Move::NONE; KILLER_SLOTS]);
    }

    #[inline]
    pub fn get(&self, ply: usize) -> [Move; KILLER_SLOTS] {
        self.table.get(ply).copied().unwrap_or([Move::NONE; KILLER_SLOTS])
    }

    /// 先頭に追加（既に先頭にあれば何もしない）
    pub fn add(&mut self, ply: usize, mv: Move) {
        let Some(slots) = self.table.get_mut(ply) else {
            return;
        };
        if slots[0] != mv {
            slots[1] = slots[0];
            slots[0] = mv;
        }
    }
}
