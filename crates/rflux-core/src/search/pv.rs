//! 三角PVテーブル
//!
//! 高さ `ply` の読み筋は「その高さで選んだ手 + 高さ `ply + 1` の読み筋」。

use crate::types::{Move, MAX_PLY};

/// 高さ MAX_PLY のノードも読み筋を持てるよう1つ余分に確保する
const PV_LINES: usize = MAX_PLY + 1;

#[derive(Clone)]
struct PvLine {
    moves: [Move; PV_LINES],
    len: usize,
}

impl PvLine {
    const EMPTY: PvLine = PvLine {
        moves: [Move::NONE; PV_LINES],
        len: 0,
    };
}

pub struct PvTable {
    lines: Box<[PvLine]>,
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PvTable {
    pub fn new() -> Self {
        Self {
            lines: vec![PvLine::EMPTY; PV_LINES].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn clear(&mut self, ply: usize) {
        if let Some(line) = self.lines.get_mut(ply) {
            line.len = 0;
        }
    }

    pub fn clear_all(&mut self) {
        for line in self.lines.iter_mut() {
            line.len = 0;
        }
    }

    /// 高さ `ply` の読み筋を `mv` + 子の読み筋で置き換える
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply + 1 >= PV_LINES {
            return;
        }
        let (head, tail) = self.lines.split_at_mut(ply + 1);
        let line = &mut head[ply];
        let child = &tail[0];
        let len = (child.len + 1).min(PV_LINES);
        line.moves[0] = mv;
        line.moves[1..len].copy_from_slice(&child.moves[..len - 1]);
        line.len = len;
    }

    #[inline]
    pub fn line(&self, ply: usize) -> &[Move] {
        match self.lines.get(ply) {
            Some(line) => &line.moves[..line.len],
            None => &[],
        }
    }

    #[inline]
    pub fn first(&self, ply: usize) -> Option<Move> {
        self.line(ply).first().copied()
    }
}
