//! 探索情報の通知
//!
//! 探索スレッドから呼び出し側へ、進行状況（深さ・ノード数・NPS・置換表使用率・
//! 現在の手・読み筋）と最終結果を `SearchEvent` として送る。
//! 頻繁に発生する状況通知は `REPORT_INTERVAL_MS` ごとに間引く。

use std::time::Instant;

use crate::types::{Bound, Depth, Move, Value};

/// 状況通知の最小間隔（ミリ秒）
pub const REPORT_INTERVAL_MS: u64 = 1000;

// =============================================================================
// SearchInfo - 読み筋
// =============================================================================

/// 読み筋1本分の情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchInfo {
    /// 探索深さ
    pub depth: Depth,
    /// 選択的深さ
    pub sel_depth: i32,
    /// MultiPV番号（1-indexed）
    pub multi_pv: usize,
    /// スコア
    pub value: Value,
    /// スコアの種類（fail-low なら Upper、fail-high なら Lower）
    pub bound: Bound,
    /// 探索ノード数
    pub nodes: u64,
    /// 経過時間（ミリ秒）
    pub time_ms: u64,
    /// NPS (nodes per second)
    pub nps: u64,
    /// 置換表使用率（千分率）
    pub hashfull: i32,
    /// Principal Variation
    pub pv: Vec<Move>,
}

impl SearchInfo {
    /// 詰みスコアなら手数（負値は詰まされる側）
    pub fn mate_moves(&self) -> Option<i32> {
        self.value.mate_moves()
    }

    /// info文字列を生成
    pub fn to_uci_string(&self) -> String {
        let score = match self.mate_moves() {
            Some(moves) => format!("mate {moves}"),
            None => format!("cp {}", self.value.raw()),
        };
        let bound = match self.bound {
            Bound::Lower => " lowerbound",
            Bound::Upper => " upperbound",
            _ => "",
        };

        let mut s = format!(
            "info depth {} seldepth {} multipv {} score {score}{bound} nodes {} time {} nps {} hashfull {}",
            self.depth, self.sel_depth, self.multi_pv, self.nodes, self.time_ms, self.nps, self.hashfull
        );
        if !self.pv.is_empty() {
            s.push_str(" pv");
            for m in &self.pv {
                s.push(' ');
                s.push_str(&m.to_uci());
            }
        }
        s
    }
}

// =============================================================================
// SearchStatus - 状況
// =============================================================================

/// 探索の進行状況
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStatus {
    pub depth: Depth,
    pub sel_depth: i32,
    pub nodes: u64,
    pub time_ms: u64,
    pub nps: u64,
    pub hashfull: i32,
    /// 探索中のルートの手と、その手番号（1-indexed）
    pub current_move: Option<(Move, usize)>,
}

impl SearchStatus {
    pub fn to_uci_string(&self) -> String {
        let mut s = format!(
            "info depth {} seldepth {} nodes {} time {} nps {} hashfull {}",
            self.depth, self.sel_depth, self.nodes, self.time_ms, self.nps, self.hashfull
        );
        if let Some((mv, number)) = self.current_move {
            s.push_str(&format!(" currmove {mv} currmovenumber {number}"));
        }
        s
    }
}

// =============================================================================
// SearchEvent
// =============================================================================

/// 探索スレッドから送られるイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// 新しい反復の開始
    Depth { depth: Depth, sel_depth: i32 },
    /// ルートで探索を始めた手
    CurrentMove { mv: Move, number: usize },
    /// 定期的な状況通知
    Status(SearchStatus),
    /// 読み筋
    Pv(SearchInfo),
    /// 探索終了時の集計
    Summary(SearchStatus),
    /// 最終結果（合法手がなければ best は None）
    BestMove {
        best: Option<Move>,
        ponder: Option<Move>,
    },
}

impl SearchEvent {
    pub fn to_uci_string(&self) -> String {
        match self {
            SearchEvent::Depth { depth, sel_depth } => {
                format!("info depth {depth} seldepth {sel_depth}")
            }
            SearchEvent::CurrentMove { mv, number } => {
                format!("info currmove {mv} currmovenumber {number}")
            }
            SearchEvent::Status(status) | SearchEvent::Summary(status) => status.to_uci_string(),
            SearchEvent::Pv(info) => info.to_uci_string(),
            SearchEvent::BestMove { best, ponder } => {
                let best = best.map_or_else(|| "0000".to_string(), |m| m.to_uci());
                match ponder {
                    Some(p) => format!("bestmove {best} ponder {p}"),
                    None => format!("bestmove {best}"),
                }
            }
        }
    }
}

// =============================================================================
// InfoSink
// =============================================================================

/// 探索イベントの受け取り先
///
/// 探索スレッドから呼ばれるため `Send` が必要。
pub trait InfoSink: Send {
    fn send(&mut self, event: SearchEvent);
}

impl<F> InfoSink for F
where
    F: FnMut(SearchEvent) + Send,
{
    fn send(&mut self, event: SearchEvent) {
        self(event)
    }
}

/// すべてのイベントを捨てる
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl InfoSink for NullSink {
    fn send(&mut self, _event: SearchEvent) {}
}

// =============================================================================
// Reporter - 間引き付きの通知
// =============================================================================

/// ノード数・選択的深さを数え、イベントを間引いて送る
pub(super) struct Reporter {
    sink: Box<dyn InfoSink>,
    start: Instant,
    last_status: Instant,
    depth: Depth,
    sel_depth: i32,
    nodes: u64,
    current_move: Option<(Move, usize)>,
}

impl Reporter {
    pub(super) fn new(sink: Box<dyn InfoSink>) -> Self {
        let now = Instant::now();
        Self {
            sink,
            start: now,
            last_status: now,
            depth: 0,
            sel_depth: 0,
            nodes: 0,
            current_move: None,
        }
    }

    #[inline]
    pub(super) fn nodes(&self) -> u64 {
        self.nodes
    }

    #[inline]
    pub(super) fn depth(&self) -> Depth {
        self.depth
    }

    pub(super) fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub(super) fn nps(&self) -> u64 {
        let elapsed = self.elapsed_ms();
        if elapsed == 0 {
            0
        } else {
            self.nodes * 1000 / elapsed
        }
    }

    /// 1ノード訪問を記録
    #[inline]
    pub(super) fn count_node(&mut self, ply: usize) {
        self.nodes += 1;
        if ply as i32 > self.sel_depth {
            self.sel_depth = ply as i32;
        }
    }

    /// 新しい反復の開始（開始から1秒以降のみ通知）
    pub(super) fn start_iteration(&mut self, depth: Depth) {
        self.depth = depth;
        self.sel_depth = depth;
        if self.elapsed_ms() >= REPORT_INTERVAL_MS {
            self.sink.send(SearchEvent::Depth {
                depth,
                sel_depth: self.sel_depth,
            });
        }
    }

    /// ルートで新しい手を探索し始めた（開始から1秒以降のみ通知）
    pub(super) fn current_move(&mut self, mv: Move, number: usize) {
        self.current_move = Some((mv, number));
        if self.elapsed_ms() >= REPORT_INTERVAL_MS {
            self.sink.send(SearchEvent::CurrentMove { mv, number });
        }
    }

    /// 前回の通知から間隔が空いたか
    #[inline]
    pub(super) fn status_due(&self) -> bool {
        self.last_status.elapsed().as_millis() as u64 >= REPORT_INTERVAL_MS
    }

    fn status(&self, hashfull: i32) -> SearchStatus {
        SearchStatus {
            depth: self.depth,
            sel_depth: self.sel_depth,
            nodes: self.nodes,
            time_ms: self.elapsed_ms(),
            nps: self.nps(),
            hashfull,
            current_move: self.current_move,
        }
    }

    pub(super) fn send_status(&mut self, hashfull: i32) {
        let status = self.status(hashfull);
        self.sink.send(SearchEvent::Status(status));
        self.last_status = Instant::now();
    }

    pub(super) fn send_summary(&mut self, hashfull: i32) {
        let status = SearchStatus {
            current_move: None,
            ..self.status(hashfull)
        };
        self.sink.send(SearchEvent::Summary(status));
        self.last_status = Instant::now();
    }

    /// 現在の計測値で読み筋情報を作る
    pub(super) fn make_info(
        &self,
        multi_pv: usize,
        value: Value,
        bound: Bound,
        pv: Vec<Move>,
        hashfull: i32,
    ) -> SearchInfo {
        SearchInfo {
            depth: self.depth,
            sel_depth: self.sel_depth,
            multi_pv,
            value,
            bound,
            nodes: self.nodes,
            time_ms: self.elapsed_ms(),
            nps: self.nps(),
            hashfull,
            pv,
        }
    }

    pub(super) fn send_pv(&mut self, info: SearchInfo) {
        self.sink.send(SearchEvent::Pv(info));
        self.last_status = Instant::now();
    }

    pub(super) fn send_best_move(&mut self, best: Option<Move>, ponder: Option<Move>) {
        self.sink.send(SearchEvent::BestMove { best, ponder });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Piece, Square};
    use std::sync::{Arc, Mutex};

    fn e2e4() -> Move {
        Move::normal(Square::E2, Square::new(4, 3), Piece::W_PAWN, Piece::NONE)
    }

    fn sample_info(value: Value, bound: Bound) -> SearchInfo {
        SearchInfo {
            depth: 5,
            sel_depth: 9,
            multi_pv: 1,
            value,
            bound,
            nodes: 1234,
            time_ms: 56,
            nps: 22035,
            hashfull: 3,
            pv: vec![e2e4()],
        }
    }

    #[test]
    fn test_info_centipawns() {
        let s = sample_info(Value::new(35), Bound::Exact).to_uci_string();
        assert_eq!(
            s,
            "info depth 5 seldepth 9 multipv 1 score cp 35 nodes 1234 time 56 nps 22035 hashfull 3 pv e2e4"
        );
    }

    #[test]
    fn test_info_bounds_and_mate() {
        let s = sample_info(Value::new(-20), Bound::Upper).to_uci_string();
        assert!(s.contains("score cp -20 upperbound"));

        let s = sample_info(Value::mate_in(3), Bound::Lower).to_uci_string();
        assert!(s.contains("score mate 2 lowerbound"));

        let s = sample_info(Value::mated_in(2), Bound::Exact).to_uci_string();
        assert!(s.contains("score mate -1 nodes"));
    }

    #[test]
    fn test_best_move_string() {
        let event = SearchEvent::BestMove {
            best: Some(e2e4()),
            ponder: None,
        };
        assert_eq!(event.to_uci_string(), "bestmove e2e4");

        let event = SearchEvent::BestMove {
            best: None,
            ponder: None,
        };
        assert_eq!(event.to_uci_string(), "bestmove 0000");
    }

    #[test]
    fn test_closure_sink() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let collected = Arc::clone(&events);
        let mut reporter = Reporter::new(Box::new(move |e: SearchEvent| {
            collected.lock().unwrap().push(e);
        }));

        reporter.count_node(3);
        reporter.count_node(1);
        assert_eq!(reporter.nodes(), 2);
        assert_eq!(reporter.sel_depth, 3);

        // 開始直後の深さ・現在手の通知は間引かれる
        reporter.start_iteration(1);
        reporter.current_move(e2e4(), 1);
        assert!(events.lock().unwrap().is_empty());

        reporter.send_best_move(Some(e2e4()), None);
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], SearchEvent::BestMove { .. }));
    }
}
