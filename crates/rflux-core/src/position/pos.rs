//! 局面（Position）

use std::fmt;

use crate::eval::psqt;
use crate::types::{CastlingRights, Color, Move, MoveKind, Piece, PieceType, Square};

use super::attack::{attack_delta, Attack};
use super::piece_list::PieceList;
use super::repetition::RepetitionTable;
use super::state::StateInfo;
use super::zobrist::{zobrist_castling, zobrist_en_passant, zobrist_psq, ZOBRIST};

/// 序盤判定の駒価値下限（K + Q + 2R + 2B + 2N）
pub const GAME_PHASE_OPENING_VALUE: i32 = PieceType::King.value()
    + PieceType::Queen.value()
    + 2 * PieceType::Rook.value()
    + 2 * PieceType::Bishop.value()
    + 2 * PieceType::Knight.value();

/// 終盤判定の駒価値上限（K + 2R）
pub const GAME_PHASE_ENDGAME_VALUE: i32 = PieceType::King.value() + 2 * PieceType::Rook.value();

/// 終盤判定の駒数上限（歩・キング以外）
pub const GAME_PHASE_ENDGAME_COUNT: i32 = 2;

/// 局面の進行度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Opening,
    Middle,
    Endgame,
}

/// 局面
///
/// 盤面配列・駒リスト・駒価値の集計・Zobristキーは
/// `put_piece` / `remove_piece` / `move_piece` を通じてのみ更新し、常に整合させる。
#[derive(Clone)]
pub struct Position {
    pub(super) board: [Piece; Square::NUM],
    /// [Color][PieceType]
    pub(super) pieces: [[PieceList; PieceType::NUM]; Color::NUM],
    pub(super) side_to_move: Color,
    pub(super) castling: CastlingRights,
    pub(super) ep_square: Option<Square>,
    pub(super) half_move_clock: i32,
    /// 開始局面からの手数（half move）
    pub(super) game_ply: i32,
    pub(super) capture_square: Option<Square>,
    pub(super) key: u64,
    pub(super) pawn_key: u64,
    /// 駒価値の合計（キングを含む）
    pub(super) material_value: [i32; Color::NUM],
    /// 歩・キング以外の駒数
    pub(super) material_count: [i32; Color::NUM],
    /// キング以外の駒数
    pub(super) material_count_all: [i32; Color::NUM],
    pub(super) positional_opening: [i32; Color::NUM],
    pub(super) positional_endgame: [i32; Color::NUM],
    pub(super) stack: Vec<StateInfo>,
    pub(super) repetition: RepetitionTable,
    /// 手数ごとの王手情報キャッシュ（`stack` と同じ深さで伸縮する）
    pub(super) attack_cache: Vec<[Option<Attack>; Color::NUM]>,
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl PartialEq for Position {
    /// 盤面と局面状態を比較する（巻き戻し情報とキャッシュは比較しない）
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.pieces == other.pieces
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.ep_square == other.ep_square
            && self.half_move_clock == other.half_move_clock
            && self.game_ply == other.game_ply
            && self.capture_square == other.capture_square
            && self.key == other.key
            && self.pawn_key == other.pawn_key
            && self.material_value == other.material_value
            && self.material_count == other.material_count
            && self.material_count_all == other.material_count_all
            && self.positional_opening == other.positional_opening
            && self.positional_endgame == other.positional_endgame
    }
}

impl Eq for Position {}

impl Position {
    /// 駒のない空の局面（FEN 解析の土台）
    pub(super) fn empty() -> Self {
        Self {
            board: [Piece::NONE; Square::NUM],
            pieces: [[PieceList::new(); PieceType::NUM]; Color::NUM],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            ep_square: None,
            half_move_clock: 0,
            game_ply: 0,
            capture_square: None,
            key: 0,
            pawn_key: 0,
            material_value: [0; Color::NUM],
            material_count: [0; Color::NUM],
            material_count_all: [0; Color::NUM],
            positional_opening: [0; Color::NUM],
            positional_endgame: [0; Color::NUM],
            stack: Vec::with_capacity(crate::types::MAX_PLY),
            repetition: RepetitionTable::new(),
            attack_cache: vec![[None, None]],
        }
    }

    // =========================================================================
    // アクセサ
    // =========================================================================

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Piece {
        self.board[sq.index()]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline]
    pub fn half_move_clock(&self) -> i32 {
        self.half_move_clock
    }

    #[inline]
    pub fn game_ply(&self) -> i32 {
        self.game_ply
    }

    /// FEN の手数（1始まり、黒が指すたびに増える）
    #[inline]
    pub fn full_move_number(&self) -> i32 {
        self.game_ply / 2 + 1
    }

    /// 直前の手で駒が取られた升
    #[inline]
    pub fn capture_square(&self) -> Option<Square> {
        self.capture_square
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    #[inline]
    pub fn pawn_key(&self) -> u64 {
        self.pawn_key
    }

    #[inline]
    pub fn pieces(&self, color: Color, pt: PieceType) -> &PieceList {
        &self.pieces[color.index()][pt.index()]
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        let list = self.pieces(color, PieceType::King);
        debug_assert_eq!(list.len(), 1, "exactly one king per color");
        list.first().unwrap_or(Square::A1)
    }

    #[inline]
    pub fn material_value(&self, color: Color) -> i32 {
        self.material_value[color.index()]
    }

    /// 歩・キング以外の駒数
    #[inline]
    pub fn material_count(&self, color: Color) -> i32 {
        self.material_count[color.index()]
    }

    /// キング以外の駒数
    #[inline]
    pub fn material_count_all(&self, color: Color) -> i32 {
        self.material_count_all[color.index()]
    }

    #[inline]
    pub fn positional_opening(&self, color: Color) -> i32 {
        self.positional_opening[color.index()]
    }

    #[inline]
    pub fn positional_endgame(&self, color: Color) -> i32 {
        self.positional_endgame[color.index()]
    }

    /// make/undo スタックの深さ
    #[inline]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn game_phase(&self) -> GamePhase {
        let [white, black] = self.material_value;
        let [white_count, black_count] = self.material_count;
        if white >= GAME_PHASE_OPENING_VALUE && black >= GAME_PHASE_OPENING_VALUE {
            GamePhase::Opening
        } else if white <= GAME_PHASE_ENDGAME_VALUE
            || black <= GAME_PHASE_ENDGAME_VALUE
            || white_count <= GAME_PHASE_ENDGAME_COUNT
            || black_count <= GAME_PHASE_ENDGAME_COUNT
        {
            GamePhase::Endgame
        } else {
            GamePhase::Middle
        }
    }

    /// 現局面が同じ手順中に既に現れているか
    #[inline]
    pub fn is_repetition(&self) -> bool {
        self.repetition.exists(self.key)
    }

    // =========================================================================
    // 駒の配置（内部用）
    // =========================================================================

    pub(super) fn put_piece(&mut self, sq: Square, piece: Piece, update: bool) {
        let Some(pt) = piece.piece_type() else {
            debug_assert!(false, "put_piece with empty piece");
            return;
        };
        debug_assert!(self.board[sq.index()].is_none());
        let c = piece.color().index();

        self.board[sq.index()] = piece;
        self.pieces[c][pt.index()].insert(sq);
        self.material_value[c] += pt.value();
        if pt != PieceType::King {
            self.material_count_all[c] += 1;
            if pt != PieceType::Pawn {
                self.material_count[c] += 1;
            }
        }

        if update {
            self.key ^= zobrist_psq(piece, sq);
            if pt == PieceType::Pawn {
                self.pawn_key ^= zobrist_psq(piece, sq);
            }
            let (opening, endgame) = psqt::value(piece, sq);
            self.positional_opening[c] += opening;
            self.positional_endgame[c] += endgame;
        }
    }

    pub(super) fn remove_piece(&mut self, sq: Square, update: bool) -> Piece {
        let piece = self.board[sq.index()];
        let Some(pt) = piece.piece_type() else {
            debug_assert!(false, "remove_piece from empty square {sq}");
            return piece;
        };
        let c = piece.color().index();

        self.board[sq.index()] = Piece::NONE;
        self.pieces[c][pt.index()].remove(sq);
        self.material_value[c] -= pt.value();
        if pt != PieceType::King {
            self.material_count_all[c] -= 1;
            if pt != PieceType::Pawn {
                self.material_count[c] -= 1;
            }
        }

        if update {
            self.key ^= zobrist_psq(piece, sq);
            if pt == PieceType::Pawn {
                self.pawn_key ^= zobrist_psq(piece, sq);
            }
            let (opening, endgame) = psqt::value(piece, sq);
            self.positional_opening[c] -= opening;
            self.positional_endgame[c] -= endgame;
        }
        piece
    }

    pub(super) fn move_piece(&mut self, from: Square, to: Square, update: bool) -> Piece {
        let piece = self.board[from.index()];
        let Some(pt) = piece.piece_type() else {
            debug_assert!(false, "move_piece from empty square {from}");
            return piece;
        };
        debug_assert!(self.board[to.index()].is_none());
        let c = piece.color().index();

        self.board[from.index()] = Piece::NONE;
        self.board[to.index()] = piece;
        let list = &mut self.pieces[c][pt.index()];
        list.remove(from);
        list.insert(to);

        if update {
            let diff = zobrist_psq(piece, from) ^ zobrist_psq(piece, to);
            self.key ^= diff;
            if pt == PieceType::Pawn {
                self.pawn_key ^= diff;
            }
            let (from_opening, from_endgame) = psqt::value(piece, from);
            let (to_opening, to_endgame) = psqt::value(piece, to);
            self.positional_opening[c] += to_opening - from_opening;
            self.positional_endgame[c] += to_endgame - from_endgame;
        }
        piece
    }

    fn set_castling(&mut self, rights: CastlingRights) {
        if rights != self.castling {
            self.key ^= zobrist_castling(self.castling) ^ zobrist_castling(rights);
            self.castling = rights;
        }
    }

    /// `sq` から駒が動いた、または `sq` の駒が取られた時のキャスリング権更新
    fn clear_castling_by(&mut self, sq: Square) {
        let lost = CastlingRights::lost_by(sq);
        if !lost.is_empty() {
            self.set_castling(self.castling.remove(lost));
        }
    }

    fn set_ep_square(&mut self, sq: Option<Square>) {
        if let Some(old) = self.ep_square {
            self.key ^= zobrist_en_passant(old);
        }
        if let Some(new) = sq {
            self.key ^= zobrist_en_passant(new);
        }
        self.ep_square = sq;
    }

    // =========================================================================
    // make / undo
    // =========================================================================

    /// 指し手を実行する
    ///
    /// 合法性は検査しない（擬似合法手であることが前提）。
    pub fn make_move(&mut self, mv: Move) {
        self.stack.push(StateInfo {
            key: self.key,
            pawn_key: self.pawn_key,
            castling: self.castling,
            ep_square: self.ep_square,
            half_move_clock: self.half_move_clock,
            capture_square: self.capture_square,
            positional_opening: self.positional_opening,
            positional_endgame: self.positional_endgame,
        });

        if !mv.is_null() {
            self.repetition.put(self.key);
        }
        self.set_ep_square(None);

        let us = self.side_to_move;
        match mv.kind() {
            MoveKind::Normal => self.make_normal(mv),
            MoveKind::PawnDouble => {
                self.move_piece(mv.from(), mv.to(), true);
                self.capture_square = None;
                self.set_ep_square(mv.to().offset(-us.pawn_push()));
                self.half_move_clock = 0;
            }
            MoveKind::Promotion => {
                let to = mv.to();
                if self.board[to.index()].is_some() {
                    self.remove_piece(to, true);
                    self.clear_castling_by(to);
                    self.capture_square = Some(to);
                } else {
                    self.capture_square = None;
                }
                self.remove_piece(mv.from(), true);
                let promoted = mv.promotion().unwrap_or(PieceType::Queen);
                self.put_piece(to, Piece::new(us, promoted), true);
                self.half_move_clock = 0;
            }
            MoveKind::EnPassant => {
                if let Some(victim) = mv.to().offset(-us.pawn_push()) {
                    self.remove_piece(victim, true);
                }
                self.move_piece(mv.from(), mv.to(), true);
                self.capture_square = Some(mv.to());
                self.half_move_clock = 0;
            }
            MoveKind::Castling => {
                let (rook_from, rook_to) = castling_rook_squares(mv.to());
                self.move_piece(mv.from(), mv.to(), true);
                self.move_piece(rook_from, rook_to, true);
                self.clear_castling_by(mv.from());
                self.capture_square = None;
                self.half_move_clock += 1;
            }
            MoveKind::Null => {
                self.capture_square = None;
                self.half_move_clock += 1;
            }
        }

        self.side_to_move = !us;
        self.key ^= ZOBRIST.side;
        self.pawn_key ^= ZOBRIST.side;
        self.game_ply += 1;
        self.attack_cache.push([None, None]);
    }

    fn make_normal(&mut self, mv: Move) {
        let (from, to) = (mv.from(), mv.to());
        if self.board[to.index()].is_some() {
            self.remove_piece(to, true);
            self.clear_castling_by(to);
            self.capture_square = Some(to);
            self.half_move_clock = 0;
        } else {
            self.capture_square = None;
            self.half_move_clock += 1;
        }
        let piece = self.move_piece(from, to, true);
        self.clear_castling_by(from);
        if piece.piece_type() == Some(PieceType::Pawn) {
            self.half_move_clock = 0;
        }
    }

    /// 直前の `make_move` を取り消す
    pub fn undo_move(&mut self, mv: Move) {
        let state = self
            .stack
            .pop()
            .expect("undo_move called without a matching make_move");
        self.attack_cache.pop();
        self.game_ply -= 1;
        self.side_to_move = !self.side_to_move;
        let us = self.side_to_move;

        match mv.kind() {
            MoveKind::Normal => {
                self.move_piece(mv.to(), mv.from(), false);
                if mv.captured().is_some() {
                    self.put_piece(mv.to(), mv.captured(), false);
                }
            }
            MoveKind::PawnDouble => {
                self.move_piece(mv.to(), mv.from(), false);
            }
            MoveKind::Promotion => {
                self.remove_piece(mv.to(), false);
                self.put_piece(mv.from(), Piece::new(us, PieceType::Pawn), false);
                if mv.captured().is_some() {
                    self.put_piece(mv.to(), mv.captured(), false);
                }
            }
            MoveKind::EnPassant => {
                self.move_piece(mv.to(), mv.from(), false);
                if let Some(victim) = mv.to().offset(-us.pawn_push()) {
                    self.put_piece(victim, Piece::new(!us, PieceType::Pawn), false);
                }
            }
            MoveKind::Castling => {
                let (rook_from, rook_to) = castling_rook_squares(mv.to());
                self.move_piece(rook_to, rook_from, false);
                self.move_piece(mv.to(), mv.from(), false);
            }
            MoveKind::Null => {}
        }

        self.key = state.key;
        self.pawn_key = state.pawn_key;
        self.castling = state.castling;
        self.ep_square = state.ep_square;
        self.half_move_clock = state.half_move_clock;
        self.capture_square = state.capture_square;
        self.positional_opening = state.positional_opening;
        self.positional_endgame = state.positional_endgame;

        if !mv.is_null() {
            self.repetition.remove(self.key);
        }
    }

    // =========================================================================
    // 王手・合法性
    // =========================================================================

    /// `color` のキングへの利き（同一手数内ではキャッシュを返す）
    pub fn attack(&mut self, color: Color) -> Attack {
        let ply = self.attack_cache.len() - 1;
        if let Some(attack) = self.attack_cache[ply][color.index()] {
            return attack;
        }
        let attack = self.compute_attack(color);
        self.attack_cache[ply][color.index()] = Some(attack);
        attack
    }

    /// 手番側が王手されているか
    #[inline]
    pub fn in_check(&self) -> bool {
        let us = self.side_to_move;
        self.is_attacked(self.king_square(us), !us)
    }

    /// 指し手が相手に王手をかけるか
    ///
    /// 通常の移動は利きの幾何で判定し、成り・アンパッサン・キャスリングは
    /// 実際に指して確かめる。
    pub fn is_checking_move(&mut self, mv: Move) -> bool {
        let us = self.side_to_move;
        let enemy_king = self.king_square(!us);
        match mv.kind() {
            MoveKind::Normal | MoveKind::PawnDouble => {
                let Some(pt) = mv.piece_type() else {
                    return false;
                };
                if pt != PieceType::King && self.can_attack(pt, us, mv.to(), enemy_king) {
                    return true;
                }
                // 開き王手
                self.is_pinned(mv.from(), !us)
                    && attack_delta(mv.from(), enemy_king) != attack_delta(mv.to(), enemy_king)
            }
            MoveKind::Promotion | MoveKind::EnPassant | MoveKind::Castling => {
                self.make_move(mv);
                let check = self.is_attacked(enemy_king, us);
                self.undo_move(mv);
                check
            }
            MoveKind::Null => false,
        }
    }

    /// 王手されていない局面で、擬似合法手が自玉を取られる手でないか
    ///
    /// 王手回避手は生成時点で合法なので、ここでは扱わない。
    pub fn is_legal(&mut self, mv: Move) -> bool {
        let us = self.side_to_move;
        match mv.kind() {
            MoveKind::EnPassant => {
                self.make_move(mv);
                let legal = !self.is_attacked(self.king_square(us), !us);
                self.undo_move(mv);
                legal
            }
            MoveKind::Castling => !self.is_attacked(mv.to(), !us),
            MoveKind::Null => false,
            _ if mv.piece_type() == Some(PieceType::King) => {
                // 自玉が利きを遮っている飛び駒の方向へ逃げないよう、キングを外して判定する
                let king = mv.from();
                let piece = self.board[king.index()];
                self.board[king.index()] = Piece::NONE;
                let attacked = self.is_attacked(mv.to(), !us);
                self.board[king.index()] = piece;
                !attacked
            }
            _ => {
                if !self.is_pinned(mv.from(), us) {
                    return true;
                }
                let king = self.king_square(us);
                attack_delta(mv.from(), king) == attack_delta(mv.to(), king)
            }
        }
    }

    /// 任意の指し手（置換表・キラー由来）が現局面で擬似合法か
    pub fn is_pseudo_legal(&self, mv: Move) -> bool {
        if mv.is_none() || mv.is_null() {
            return false;
        }
        let us = self.side_to_move;
        let (from, to) = (mv.from(), mv.to());
        let piece = mv.piece();
        let Some(pt) = piece.piece_type() else {
            return false;
        };
        if piece.color() != us || self.board[from.index()] != piece {
            return false;
        }

        let target = self.board[to.index()];
        match mv.kind() {
            MoveKind::Normal | MoveKind::Promotion => {
                if target != mv.captured() {
                    return false;
                }
                if target.is_some()
                    && (target.color() == us || target.piece_type() == Some(PieceType::King))
                {
                    return false;
                }
                let last_rank = to.relative_rank(us) == 7;
                if pt == PieceType::Pawn {
                    if last_rank != (mv.kind() == MoveKind::Promotion) {
                        return false;
                    }
                    if target.is_some() {
                        can_pseudo_attack_pawn(us, from, to)
                    } else {
                        from.offset(us.pawn_push()) == Some(to)
                    }
                } else {
                    mv.kind() == MoveKind::Normal && self.can_attack(pt, us, from, to)
                }
            }
            MoveKind::PawnDouble => {
                pt == PieceType::Pawn
                    && from.relative_rank(us) == 1
                    && from.offset(2 * us.pawn_push()) == Some(to)
                    && target.is_none()
                    && from
                        .offset(us.pawn_push())
                        .is_some_and(|mid| self.board[mid.index()].is_none())
            }
            MoveKind::EnPassant => {
                pt == PieceType::Pawn
                    && self.ep_square == Some(to)
                    && target.is_none()
                    && can_pseudo_attack_pawn(us, from, to)
            }
            MoveKind::Castling => {
                if pt != PieceType::King || self.in_check() {
                    return false;
                }
                let (right, path, passing): (CastlingRights, &[Square], Square) = match (us, to) {
                    (Color::White, Square::G1) => {
                        (CastlingRights::WHITE_KINGSIDE, &[Square::F1, Square::G1], Square::F1)
                    }
                    (Color::White, Square::C1) => (
                        CastlingRights::WHITE_QUEENSIDE,
                        &[Square::B1, Square::C1, Square::D1],
                        Square::D1,
                    ),
                    (Color::Black, Square::G8) => {
                        (CastlingRights::BLACK_KINGSIDE, &[Square::F8, Square::G8], Square::F8)
                    }
                    (Color::Black, Square::C8) => (
                        CastlingRights::BLACK_QUEENSIDE,
                        &[Square::B8, Square::C8, Square::D8],
                        Square::D8,
                    ),
                    _ => return false,
                };
                self.castling.contains(right)
                    && path.iter().all(|sq| self.board[sq.index()].is_none())
                    && !self.is_attacked(passing, !us)
            }
            MoveKind::Null => false,
        }
    }

    // =========================================================================
    // ハッシュ再計算（検証用）
    // =========================================================================

    /// 盤面からハッシュを計算し直す（差分更新の検証用）
    pub fn compute_key(&self) -> u64 {
        let mut key = 0;
        for sq in Square::all() {
            let piece = self.board[sq.index()];
            if piece.is_some() {
                key ^= zobrist_psq(piece, sq);
            }
        }
        if self.side_to_move == Color::Black {
            key ^= ZOBRIST.side;
        }
        key ^= zobrist_castling(self.castling);
        if let Some(ep) = self.ep_square {
            key ^= zobrist_en_passant(ep);
        }
        key
    }

    /// 歩の配置と手番からハッシュを計算し直す
    pub fn compute_pawn_key(&self) -> u64 {
        let mut key = 0;
        for color in Color::ALL {
            let pawn = Piece::new(color, PieceType::Pawn);
            for sq in self.pieces(color, PieceType::Pawn).iter() {
                key ^= zobrist_psq(pawn, sq);
            }
        }
        if self.side_to_move == Color::Black {
            key ^= ZOBRIST.side;
        }
        key
    }
}

/// キングの移動先からルークの移動元・移動先を得る
#[inline]
pub(super) fn castling_rook_squares(king_to: Square) -> (Square, Square) {
    match king_to {
        Square::G1 => (Square::H1, Square::F1),
        Square::C1 => (Square::A1, Square::D1),
        Square::G8 => (Square::H8, Square::F8),
        _ => (Square::A8, Square::D8),
    }
}

#[inline]
fn can_pseudo_attack_pawn(us: Color, from: Square, to: Square) -> bool {
    super::attack::can_pseudo_attack(PieceType::Pawn, us, from, to)
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let piece = self.board[Square::new(file, rank).index()];
                let c = if piece.is_some() { piece.to_char() } else { '.' };
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        write!(f, "{}", self.to_fen())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.to_fen())
            .field("key", &format_args!("{:016x}", self.key))
            .field("stack_depth", &self.stack.len())
            .finish()
    }
}
