//! perft（合法手数の全数検査）

use crate::position::Position;
use crate::types::Move;

use super::generator::generate_legal;

/// `depth` 手先までの末端局面数
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate_legal(pos);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for ext in moves.iter() {
        pos.make_move(ext.mv);
        nodes += perft(pos, depth - 1);
        pos.undo_move(ext.mv);
    }
    nodes
}

/// ルートの手ごとの perft
pub fn perft_divide(pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    let moves = generate_legal(pos);
    let mut result = Vec::with_capacity(moves.len());
    for ext in moves.iter() {
        pos.make_move(ext.mv);
        let nodes = perft(pos, depth - 1);
        pos.undo_move(ext.mv);
        result.push((ext.mv, nodes));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perft_startpos_shallow() {
        let mut pos = Position::startpos();
        assert_eq!(perft(&mut pos, 1), 20);
        assert_eq!(perft(&mut pos, 2), 400);
        assert_eq!(pos, Position::startpos());
    }

    #[test]
    fn test_perft_divide_sums() {
        let mut pos = Position::startpos();
        let divide = perft_divide(&mut pos, 2);
        assert_eq!(divide.len(), 20);
        assert_eq!(divide.iter().map(|(_, n)| n).sum::<u64>(), 400);
    }
}
