//! 局面解析ツール
//!
//! 局面（FEN + 指し手列）を探索し、info 行と最善手を標準出力に書く。
//! 探索設定と時間管理オプションは TOML ファイルで上書きできる。
//!
//! ```toml
//! [search]
//! hash_mb = 64
//! multi_pv = 3
//!
//! [time]
//! overhead = 50
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};
use rflux_core::movegen::parse_uci_move;
use rflux_core::position::{Position, STARTPOS_FEN};
use rflux_core::search::{
    Search, SearchConfig, SearchEvent, SearchLimits, SearchOutcome, TimeOptions,
};
use serde::Deserialize;

/// 制限を何も指定しなかったときの深さ
const DEFAULT_DEPTH: i32 = 8;

#[derive(Parser, Debug)]
#[command(name = "analyze")]
#[command(about = "局面を探索して読み筋と最善手を表示する")]
struct Cli {
    /// 局面（省略時は初期局面）
    #[arg(long, default_value = STARTPOS_FEN)]
    fen: String,

    /// 局面から指す手（座標形式、例: e2e4 e7e5）
    #[arg(long, num_args = 1..)]
    moves: Vec<String>,

    /// 探索深さ
    #[arg(short, long)]
    depth: Option<i32>,

    /// 思考時間（ミリ秒）
    #[arg(long)]
    movetime: Option<i64>,

    /// 探索ノード数
    #[arg(long)]
    nodes: Option<u64>,

    /// 候補手の数（設定ファイルより優先）
    #[arg(long)]
    multipv: Option<usize>,

    /// 置換表サイズ（MB、設定ファイルより優先）
    #[arg(long)]
    hash: Option<usize>,

    /// 設定ファイル（TOML）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 探索中の状況通知も表示する
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

/// 設定ファイル
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    search: SearchConfig,
    time: TimeOptions,
}

fn load_config(path: Option<&PathBuf>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: FileConfig =
        toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

fn build_position(fen: &str, moves: &[String]) -> Result<Position> {
    let mut pos = Position::from_fen(fen).with_context(|| format!("invalid FEN: {fen}"))?;
    for s in moves {
        let mv = parse_uci_move(&mut pos, s).with_context(|| format!("bad move {s}"))?;
        pos.make_move(mv);
    }
    Ok(pos)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;
    if let Some(multi_pv) = cli.multipv {
        config.search.multi_pv = multi_pv;
    }
    if let Some(hash) = cli.hash {
        config.search.hash_mb = hash;
    }
    if config.search.multi_pv == 0 {
        bail!("multi_pv must be at least 1");
    }

    let pos = build_position(&cli.fen, &cli.moves)?;

    let mut limits = SearchLimits::new();
    if let Some(depth) = cli.depth {
        limits.depth = depth;
    }
    if let Some(movetime) = cli.movetime {
        limits.move_time = movetime;
    }
    if let Some(nodes) = cli.nodes {
        limits.nodes = nodes;
    }
    if limits.depth == 0 && limits.move_time == 0 && limits.nodes == 0 {
        limits.depth = DEFAULT_DEPTH;
    }
    info!("analyzing {} with {:?}", pos.to_fen(), limits);

    let mut search = Search::with_config(config.search);
    search.set_time_options(config.time);

    let verbose = cli.verbose;
    let sink = move |event: SearchEvent| match event {
        SearchEvent::Pv(_) | SearchEvent::BestMove { .. } | SearchEvent::Summary(_) => {
            println!("{}", event.to_uci_string());
        }
        _ if verbose => println!("{}", event.to_uci_string()),
        _ => {}
    };
    search.start(&pos, limits, Box::new(sink))?;

    match search.wait() {
        SearchOutcome::BestMove { value, depth, .. } => {
            info!("finished at depth {depth}, value {}", value.raw());
        }
        SearchOutcome::NoLegalMove { in_check: true } => info!("checkmate"),
        SearchOutcome::NoLegalMove { in_check: false } => info!("stalemate"),
        SearchOutcome::Stopped => warn!("search stopped before completing an iteration"),
    }
    Ok(())
}
