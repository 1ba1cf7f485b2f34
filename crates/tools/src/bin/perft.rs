//! perft ツール
//!
//! 指定した局面から合法手の木を数え、指し手生成の正しさと速度を確かめる。

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rflux_core::movegen::{perft, perft_divide};
use rflux_core::position::{Position, STARTPOS_FEN};

#[derive(Parser, Debug)]
#[command(name = "perft")]
#[command(about = "合法手の木のノード数を数える")]
struct Cli {
    /// 局面（省略時は初期局面）
    #[arg(long, default_value = STARTPOS_FEN)]
    fen: String,

    /// 深さ
    #[arg(short, long, default_value_t = 5)]
    depth: u32,

    /// ルートの手ごとの内訳を表示
    #[arg(long, default_value_t = false)]
    divide: bool,

    /// 結果を JSON で出力
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let mut pos =
        Position::from_fen(&cli.fen).with_context(|| format!("invalid FEN: {}", cli.fen))?;
    info!("perft depth {} on {}", cli.depth, cli.fen);

    let start = Instant::now();
    let (nodes, divide) = if cli.divide {
        let divide = perft_divide(&mut pos, cli.depth);
        (divide.iter().map(|(_, n)| n).sum(), divide)
    } else {
        (perft(&mut pos, cli.depth), Vec::new())
    };
    let elapsed = start.elapsed();
    let nps = if elapsed.as_millis() > 0 {
        nodes as u128 * 1000 / elapsed.as_millis()
    } else {
        0
    };

    if cli.json {
        let moves: serde_json::Map<String, serde_json::Value> = divide
            .iter()
            .map(|(mv, n)| (mv.to_uci(), serde_json::Value::from(*n)))
            .collect();
        let report = serde_json::json!({
            "fen": cli.fen,
            "depth": cli.depth,
            "nodes": nodes,
            "time_ms": elapsed.as_millis() as u64,
            "nps": nps as u64,
            "divide": moves,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (mv, n) in &divide {
            println!("{mv}: {n}");
        }
        println!("nodes {nodes} time {}ms nps {nps}", elapsed.as_millis());
    }
    Ok(())
}
