//! 静的交換評価（SEE）
//!
//! 移動先の升に利いている駒を両陣営とも安い順に並べ、交互に取り合った結果の
//! 駒得を求める。取った駒の後ろに隠れていた飛び駒（x-ray）も順次加える。

use crate::types::{Color, Move, MoveKind, Piece, PieceType, Square};

use super::attack::{attack_delta, can_pseudo_attack};
use super::Position;

/// 1陣営が1升に利かせうる駒の最大数
const SEE_LIST_CAPACITY: usize = 32;

/// 升に利いている駒（安い順）
struct SeeList {
    pieces: [Piece; SEE_LIST_CAPACITY],
    squares: [Square; SEE_LIST_CAPACITY],
    head: usize,
    len: usize,
}

impl SeeList {
    fn new() -> Self {
        Self {
            pieces: [Piece::NONE; SEE_LIST_CAPACITY],
            squares: [Square::A1; SEE_LIST_CAPACITY],
            head: 0,
            len: 0,
        }
    }

    fn push_back(&mut self, piece: Piece, sq: Square) {
        debug_assert!(self.len < SEE_LIST_CAPACITY);
        if self.len < SEE_LIST_CAPACITY {
            self.pieces[self.len] = piece;
            self.squares[self.len] = sq;
            self.len += 1;
        }
    }

    /// 価値順を保って挿入する
    ///
    /// 後ろに別の飛び駒が控えている駒は、同価値の駒より先に使う。
    fn insert(&mut self, piece: Piece, sq: Square, has_hidden: bool) {
        if self.len >= SEE_LIST_CAPACITY {
            debug_assert!(false, "see list overflow");
            return;
        }
        let value = piece.value();
        let mut at = self.len;
        for i in self.head..self.len {
            let other = self.pieces[i].value();
            if (!has_hidden && other > value) || (has_hidden && other >= value) {
                at = i;
                break;
            }
        }
        self.pieces.copy_within(at..self.len, at + 1);
        self.squares.copy_within(at..self.len, at + 1);
        self.pieces[at] = piece;
        self.squares[at] = sq;
        self.len += 1;
    }

    fn pop_front(&mut self) -> Option<(Piece, Square)> {
        if self.head == self.len {
            return None;
        }
        let front = (self.pieces[self.head], self.squares[self.head]);
        self.head += 1;
        Some(front)
    }

    fn remove_square(&mut self, sq: Square) {
        if let Some(i) = (self.head..self.len).find(|&i| self.squares[i] == sq) {
            self.pieces.copy_within(i + 1..self.len, i);
            self.squares.copy_within(i + 1..self.len, i);
            self.len -= 1;
        }
    }
}

struct Exchange<'a> {
    pos: &'a Position,
    lists: [SeeList; Color::NUM],
}

impl Exchange<'_> {
    fn add_all_attackers(&mut self, target: Square, color: Color) {
        let pos = self.pos;
        let list = &mut self.lists[color.index()];

        let pawn = Piece::new(color, PieceType::Pawn);
        let back = -color.pawn_push();
        for side in [-1, 1] {
            if let Some(sq) = target.offset(back + side) {
                if pos.board[sq.index()] == pawn {
                    list.push_back(pawn, sq);
                }
            }
        }

        for sq in pos.pieces(color, PieceType::Knight).iter() {
            if pos.can_attack(PieceType::Knight, color, sq, target) {
                list.push_back(pos.board[sq.index()], sq);
            }
        }

        for pt in [PieceType::Bishop, PieceType::Rook, PieceType::Queen] {
            for sq in pos.pieces(color, pt).iter() {
                if pos.can_attack(pt, color, sq, target) {
                    let has_hidden = self.has_hidden_attacker(sq, target);
                    self.lists[color.index()].insert(pos.board[sq.index()], sq, has_hidden);
                }
            }
        }

        let king = pos.king_square(color);
        if pos.can_attack(PieceType::King, color, king, target) {
            self.lists[color.index()].push_back(pos.board[king.index()], king);
        }
    }

    /// `sq` の駒の背後で `target` を狙う飛び駒を探す
    fn find_hidden_attacker(&self, sq: Square, target: Square) -> Option<(Piece, Square)> {
        let toward = attack_delta(sq, target);
        if toward == 0 || !can_pseudo_attack(PieceType::Queen, Color::White, sq, target) {
            return None;
        }
        let delta = -toward;
        let mut cur = sq.offset(delta);
        while let Some(s) = cur {
            let piece = self.pos.board[s.index()];
            if let Some(pt) = piece.piece_type() {
                if pt.is_slider() && can_pseudo_attack(pt, piece.color(), s, target) {
                    return Some((piece, s));
                }
                return None;
            }
            cur = s.offset(delta);
        }
        None
    }

    fn has_hidden_attacker(&self, sq: Square, target: Square) -> bool {
        self.find_hidden_attacker(sq, target).is_some()
    }

    fn add_hidden_attacker(&mut self, sq: Square, target: Square) {
        if let Some((piece, at)) = self.find_hidden_attacker(sq, target) {
            let has_hidden = self.has_hidden_attacker(at, target);
            self.lists[piece.color().index()].insert(piece, at, has_hidden);
        }
    }

    /// `color` が `target` の駒（価値 `target_value`）を取りにいった時の損得
    ///
    /// 取ると損なら取らない（0）。
    fn make_capture(&mut self, target: Square, color: Color, target_value: i32) -> i32 {
        let Some((attacker, from)) = self.lists[color.index()].pop_front() else {
            return 0;
        };

        let mut value = target_value;
        if value == PieceType::King.value() {
            return value;
        }

        let attacker_value = if attacker.piece_type() == Some(PieceType::Pawn)
            && target.relative_rank(color) == 7
        {
            value += PieceType::Queen.value() - PieceType::Pawn.value();
            PieceType::Queen.value()
        } else {
            attacker.value()
        };

        self.add_hidden_attacker(from, target);
        value -= self.make_capture(target, !color, attacker_value);
        value.max(0)
    }
}

impl Position {
    /// 手番側が `mv` を指した時の交換の損得（センチポーン）
    ///
    /// 0以上なら、直ちに駒損する手ではない。
    pub fn see(&self, mv: Move) -> i32 {
        let us = self.side_to_move;
        let (from, to) = (mv.from(), mv.to());

        let mut exchange = Exchange {
            pos: self,
            lists: [SeeList::new(), SeeList::new()],
        };

        let mut value = mv.captured().value();
        let attacker_value = match mv.promotion() {
            Some(promotion) => {
                value += promotion.value() - PieceType::Pawn.value();
                promotion.value()
            }
            None => mv.piece().value(),
        };

        exchange.add_all_attackers(to, us);
        exchange.add_all_attackers(to, !us);

        if mv.kind() == MoveKind::EnPassant {
            if let Some(victim) = to.offset(-us.pawn_push()) {
                exchange.add_hidden_attacker(victim, to);
            }
        }

        exchange.lists[us.index()].remove_square(from);
        exchange.add_hidden_attacker(from, to);

        value - exchange.make_capture(to, !us, attacker_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_move(pos: &Position, from: &str, to: &str) -> Move {
        let from = Square::parse(from).unwrap();
        let to = Square::parse(to).unwrap();
        crate::movegen::generate_legal(&mut pos.clone())
            .iter()
            .map(|m| m.mv)
            .find(|m| m.from() == from && m.to() == to)
            .unwrap()
    }

    #[test]
    fn test_see_unopposed_capture() {
        let pos = Position::from_fen("4k3/8/8/3r4/8/8/8/3RK3 w - - 0 1").unwrap();
        let mv = find_move(&pos, "d1", "d5");
        assert_eq!(pos.see(mv), PieceType::Rook.value());
    }

    #[test]
    fn test_see_outgunned_capture_is_negative() {
        // ルークで、歩に守られた歩を取る
        let pos = Position::from_fen("4k3/8/2p5/3p4/8/8/8/3RK3 w - - 0 1").unwrap();
        let mv = find_move(&pos, "d1", "d5");
        assert_eq!(
            pos.see(mv),
            PieceType::Pawn.value() - PieceType::Rook.value()
        );
        assert!(pos.see(mv) < 0);
    }

    #[test]
    fn test_see_pawn_takes_defended_rook() {
        let pos = Position::from_fen("4k3/8/2p5/3r4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mv = find_move(&pos, "e4", "d5");
        assert_eq!(
            pos.see(mv),
            PieceType::Rook.value() - PieceType::Pawn.value()
        );
    }

    #[test]
    fn test_see_xray_recapture() {
        // 重ねたルークで守られている: Rxd5 cxd5 Rxd5
        let pos = Position::from_fen("4k3/8/2p5/3n4/8/8/3R4/3RK3 w - - 0 1").unwrap();
        let mv = find_move(&pos, "d2", "d5");
        // N(325) - R(500) + P(100)
        assert_eq!(pos.see(mv), 325 - 500 + 100);
    }

    #[test]
    fn test_see_declined_recapture() {
        // クイーンで守られた歩をナイトで取っても、クイーンは取り返さないほうが得な場合がある
        let pos = Position::from_fen("3qk3/8/8/3p4/8/4N3/8/3RK3 w - - 0 1").unwrap();
        let mv = find_move(&pos, "e3", "d5");
        // NxP QxN RxQ : 100 - 325 + 975 → 黒は取り返さない
        assert_eq!(pos.see(mv), PieceType::Pawn.value());
    }
}
