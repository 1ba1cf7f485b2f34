//! 歩の形の評価と、そのキャッシュ（PawnTable）
//!
//! 歩の形は局面が進んでもあまり変わらないので、歩だけのハッシュ（`pawn_key`）で引く。

use crate::position::Position;
use crate::types::{Color, PieceType};

/// PawnTable のエントリ数（2のべき乗）
pub const PAWN_TABLE_SIZE: usize = 1 << 12;

/// 二歩（同じ筋の歩）1枚あたりの減点
pub const DOUBLED_PAWN_PENALTY: i32 = 10;
/// 孤立歩の減点
pub const ISOLATED_PAWN_PENALTY: i32 = 15;
/// パスポーンの加点（相対段ごと）
pub const PASSED_PAWN_BONUS: [i32; 8] = [0, 5, 10, 20, 35, 60, 100, 0];

#[derive(Debug, Clone, Copy, Default)]
struct PawnEntry {
    key: u64,
    /// 白から見た評価値
    score: i32,
    valid: bool,
}

/// 歩の形評価のキャッシュ
pub struct PawnTable {
    entries: Box<[PawnEntry]>,
}

impl Default for PawnTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PawnTable {
    pub fn new() -> Self {
        Self {
            entries: vec![PawnEntry::default(); PAWN_TABLE_SIZE].into_boxed_slice(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.fill(PawnEntry::default());
    }

    /// 白から見た歩の形の評価値
    pub fn probe(&mut self, pos: &Position) -> i32 {
        let key = pos.pawn_key();
        let index = (key as usize) & (PAWN_TABLE_SIZE - 1);
        let entry = &mut self.entries[index];
        if entry.valid && entry.key == key {
            return entry.score;
        }
        let score = evaluate_pawns(pos, Color::White) - evaluate_pawns(pos, Color::Black);
        *entry = PawnEntry {
            key,
            score,
            valid: true,
        };
        score
    }
}

/// `color` 側の歩の形
pub fn evaluate_pawns(pos: &Position, color: Color) -> i32 {
    let ours = pos.pieces(color, PieceType::Pawn);
    let theirs = pos.pieces(!color, PieceType::Pawn);

    let mut files = [0i32; 8];
    for sq in ours.iter() {
        files[sq.file() as usize] += 1;
    }

    let mut score = 0;
    for count in files {
        if count > 1 {
            score -= DOUBLED_PAWN_PENALTY * (count - 1);
        }
    }

    for sq in ours.iter() {
        let file = sq.file() as usize;
        let left = file.checked_sub(1).map_or(0, |f| files[f]);
        let right = files.get(file + 1).copied().unwrap_or(0);
        if left == 0 && right == 0 {
            score -= ISOLATED_PAWN_PENALTY;
        }

        let rank = sq.relative_rank(color);
        let blocked = theirs.iter().any(|enemy| {
            (enemy.file() as i32 - file as i32).abs() <= 1 && enemy.relative_rank(color) > rank
        });
        if !blocked {
            score += PASSED_PAWN_BONUS[rank as usize];
        }
    }
    score
}
