//! 利き（攻撃）判定
//!
//! 0x88 では2升の差 `to - from` が方向と距離を一意に表すので、
//! 差ごとに「その差で利きうる駒種」と「1歩の方向」を表引きできる。
//! 表は `to - from + 127` でインデックスする。

use crate::types::{Color, Piece, PieceType, Square};

use super::Position;

// =============================================================================
// 利きベクトル表
// =============================================================================

const WHITE_PAWN_BIT: u8 = 1 << 0;
const BLACK_PAWN_BIT: u8 = 1 << 1;
const KNIGHT_BIT: u8 = 1 << 2;
const BISHOP_BIT: u8 = 1 << 3;
const ROOK_BIT: u8 = 1 << 4;
const QUEEN_BIT: u8 = 1 << 5;
const KING_BIT: u8 = 1 << 6;

/// ナイトの移動差分
pub const KNIGHT_DELTAS: [i32; 8] = [-33, -31, -18, -14, 14, 18, 31, 33];
/// ビショップの方向
pub const BISHOP_DELTAS: [i32; 4] = [-17, -15, 15, 17];
/// ルークの方向
pub const ROOK_DELTAS: [i32; 4] = [-16, -1, 1, 16];
/// クイーン・キングの方向
pub const QUEEN_DELTAS: [i32; 8] = [-17, -16, -15, -1, 1, 15, 16, 17];

const TABLE_SIZE: usize = 256;

struct VectorTables {
    mask: [u8; TABLE_SIZE],
    delta: [i8; TABLE_SIZE],
}

const fn build_vector_tables() -> VectorTables {
    let mut mask = [0u8; TABLE_SIZE];
    let mut delta = [0i8; TABLE_SIZE];

    let mut i = 0;
    while i < KNIGHT_DELTAS.len() {
        let d = KNIGHT_DELTAS[i];
        let idx = (d + 127) as usize;
        mask[idx] |= KNIGHT_BIT;
        delta[idx] = d as i8;
        i += 1;
    }

    let mut i = 0;
    while i < QUEEN_DELTAS.len() {
        let d = QUEEN_DELTAS[i];
        let diagonal = d == -17 || d == -15 || d == 15 || d == 17;
        let slider = if diagonal { BISHOP_BIT } else { ROOK_BIT } | QUEEN_BIT;

        let near = (d + 127) as usize;
        mask[near] |= KING_BIT;
        if d == 15 || d == 17 {
            mask[near] |= WHITE_PAWN_BIT;
        }
        if d == -15 || d == -17 {
            mask[near] |= BLACK_PAWN_BIT;
        }

        let mut distance = 1;
        while distance < 8 {
            let idx = (d * distance + 127) as usize;
            mask[idx] |= slider;
            delta[idx] = d as i8;
            distance += 1;
        }
        i += 1;
    }

    VectorTables { mask, delta }
}

static VECTORS: VectorTables = build_vector_tables();

#[inline]
const fn vector_index(from: Square, to: Square) -> usize {
    (to.raw() as i32 - from.raw() as i32 + 127) as usize
}

/// `from` から `to` へ向かう1歩の差分（同一直線上・ナイト跳びでなければ 0）
#[inline]
pub fn attack_delta(from: Square, to: Square) -> i32 {
    VECTORS.delta[vector_index(from, to)] as i32
}

#[inline]
const fn piece_bit(pt: PieceType, color: Color) -> u8 {
    match pt {
        PieceType::Pawn => match color {
            Color::White => WHITE_PAWN_BIT,
            Color::Black => BLACK_PAWN_BIT,
        },
        PieceType::Knight => KNIGHT_BIT,
        PieceType::Bishop => BISHOP_BIT,
        PieceType::Rook => ROOK_BIT,
        PieceType::Queen => QUEEN_BIT,
        PieceType::King => KING_BIT,
    }
}

/// 盤上の障害物を無視して、`from` の駒が `to` に利きうるか
#[inline]
pub fn can_pseudo_attack(pt: PieceType, color: Color, from: Square, to: Square) -> bool {
    VECTORS.mask[vector_index(from, to)] & piece_bit(pt, color) != 0
}

// =============================================================================
// 王手情報
// =============================================================================

/// キングに利いている駒の最大記録数
pub const MAX_ATTACKERS: usize = 16;

/// キングへの利き
///
/// 王手している駒の升と、その駒からキングへ向かう1歩の差分を記録する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attack {
    count: usize,
    squares: [Square; MAX_ATTACKERS],
    deltas: [i32; MAX_ATTACKERS],
}

impl Default for Attack {
    fn default() -> Self {
        Self {
            count: 0,
            squares: [Square::A1; MAX_ATTACKERS],
            deltas: [0; MAX_ATTACKERS],
        }
    }
}

impl Attack {
    #[inline]
    pub fn is_check(&self) -> bool {
        self.count > 0
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// `i` 番目の王手駒の升
    #[inline]
    pub fn square(&self, i: usize) -> Square {
        debug_assert!(i < self.count);
        self.squares[i]
    }

    /// `i` 番目の王手駒からキングへの1歩の差分
    #[inline]
    pub fn delta(&self, i: usize) -> i32 {
        debug_assert!(i < self.count);
        self.deltas[i]
    }

    fn push(&mut self, sq: Square, delta: i32) {
        debug_assert!(self.count < MAX_ATTACKERS);
        if self.count < MAX_ATTACKERS {
            self.squares[self.count] = sq;
            self.deltas[self.count] = delta;
            self.count += 1;
        }
    }
}

impl Position {
    /// 障害物を考慮して、`from` の駒が `to` に利いているか
    pub fn can_attack(&self, pt: PieceType, color: Color, from: Square, to: Square) -> bool {
        if !can_pseudo_attack(pt, color, from, to) {
            return false;
        }
        if pt.is_slider() {
            let delta = attack_delta(from, to);
            let mut sq = from.raw() as i32 + delta;
            while sq != to.raw() as i32 {
                if self.board[sq as usize].is_some() {
                    return false;
                }
                sq += delta;
            }
        }
        true
    }

    /// `by` 側の駒が `target` に利いているか
    pub fn is_attacked(&self, target: Square, by: Color) -> bool {
        // 歩は利く位置が決まっているので直接見る
        let pawn = Piece::new(by, PieceType::Pawn);
        let back = -by.pawn_push();
        for side in [-1, 1] {
            if target.offset(back + side).is_some_and(|sq| self.board[sq.index()] == pawn) {
                return true;
            }
        }

        for pt in [
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
            PieceType::King,
        ] {
            for sq in self.pieces[by.index()][pt.index()].iter() {
                if self.can_attack(pt, by, sq, target) {
                    return true;
                }
            }
        }
        false
    }

    /// `color` のキングに利いている相手の駒を集める
    pub(super) fn compute_attack(&self, color: Color) -> Attack {
        let mut attack = Attack::default();
        let king = self.king_square(color);
        let them = !color;

        let pawn = Piece::new(them, PieceType::Pawn);
        let back = -them.pawn_push();
        for side in [-1, 1] {
            if let Some(sq) = king.offset(back + side) {
                if self.board[sq.index()] == pawn {
                    attack.push(sq, king.raw() as i32 - sq.raw() as i32);
                }
            }
        }

        for pt in [
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
            PieceType::King,
        ] {
            for sq in self.pieces[them.index()][pt.index()].iter() {
                if self.can_attack(pt, them, sq, king) {
                    attack.push(sq, attack_delta(sq, king));
                }
            }
        }
        attack
    }

    /// `sq` の駒が `king_color` のキングに対してピンされているか
    ///
    /// `sq` の駒を取り除くと、相手の飛び駒がキングに利く場合に true。
    /// `sq` の駒の色は問わないので、開き王手の判定にも使える。
    pub fn is_pinned(&self, sq: Square, king_color: Color) -> bool {
        let king = self.king_square(king_color);
        let delta = attack_delta(sq, king);
        if delta == 0 || !can_pseudo_attack(PieceType::Queen, king_color, sq, king) {
            return false;
        }

        // キング側に障害物がないこと
        let mut cur = sq.raw() as i32 + delta;
        while cur != king.raw() as i32 {
            if self.board[cur as usize].is_some() {
                return false;
            }
            cur += delta;
        }

        // 反対側の最初の駒が相手の飛び駒か
        let mut cur = sq.raw() as i32 - delta;
        while Square::is_on_board(cur) {
            let piece = self.board[cur as usize];
            if let Some(pt) = piece.piece_type() {
                let diagonal = matches!(delta.abs(), 15 | 17);
                return piece.color() != king_color
                    && match pt {
                        PieceType::Queen => true,
                        PieceType::Bishop => diagonal,
                        PieceType::Rook => !diagonal,
                        _ => false,
                    };
            }
            cur -= delta;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_tables() {
        assert!(can_pseudo_attack(PieceType::Knight, Color::White, Square::G1, Square::new(5, 2)));
        assert!(!can_pseudo_attack(PieceType::Knight, Color::White, Square::G1, Square::G2));
        assert!(can_pseudo_attack(PieceType::Bishop, Color::White, Square::A1, Square::H8));
        assert!(!can_pseudo_attack(PieceType::Rook, Color::White, Square::A1, Square::H8));
        assert!(can_pseudo_attack(PieceType::Rook, Color::Black, Square::A1, Square::A8));
        assert!(can_pseudo_attack(PieceType::Queen, Color::Black, Square::H1, Square::A8));

        // 白歩は上向き斜めにだけ利く
        let e4 = Square::new(4, 3);
        let d5 = Square::new(3, 4);
        assert!(can_pseudo_attack(PieceType::Pawn, Color::White, e4, d5));
        assert!(!can_pseudo_attack(PieceType::Pawn, Color::Black, e4, d5));
        assert!(can_pseudo_attack(PieceType::Pawn, Color::Black, d5, e4));
    }

    #[test]
    fn test_attack_delta_direction() {
        assert_eq!(attack_delta(Square::A1, Square::H8), 17);
        assert_eq!(attack_delta(Square::H8, Square::A1), -17);
        assert_eq!(attack_delta(Square::A1, Square::A8), 16);
        assert_eq!(attack_delta(Square::H1, Square::A1), -1);
        assert_eq!(attack_delta(Square::A1, Square::B8), 0);
    }
}
