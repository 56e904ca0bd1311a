use std::path::PathBuf;

use infinite_compress::compress::verify::topology_violations;
use infinite_compress::compress::{
    compress_position, AnchorLike, CompressConfig, CompressionMode, NoAnchor, PieceAnchor,
};
use infinite_compress::core::coord::BigCoord;
use infinite_compress::core::position::{PieceCode, Position};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

fn default_mode() -> String {
    "diagonal".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct PieceSpec {
    /// Decimal string; coordinates may exceed any machine integer.
    x: String,
    y: String,
    piece: PieceCode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct InputFile {
    #[serde(default = "default_mode")]
    mode: String,
    #[serde(default)]
    anchor: Option<PieceCode>,
    #[serde(default)]
    min_distance: Option<u32>,
    pieces: Vec<PieceSpec>,
}

#[derive(Debug, Clone, Serialize)]
struct PieceReport {
    piece: PieceCode,
    original: [String; 2],
    compressed: [String; 2],
}

fn build_position(specs: &[PieceSpec]) -> Result<Position, String> {
    let mut pos = Position::new();
    for (i, p) in specs.iter().enumerate() {
        let x: BigInt = p
            .x
            .trim()
            .parse()
            .map_err(|e| format!("piece {i}: bad x {:?}: {e}", p.x))?;
        let y: BigInt = p
            .y
            .trim()
            .parse()
            .map_err(|e| format!("piece {i}: bad y {:?}: {e}", p.y))?;
        let at = BigCoord::new(x, y);
        if pos.insert(at.clone(), p.piece).is_some() {
            return Err(format!("piece {i}: square {at} is already occupied"));
        }
    }
    Ok(pos)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: compress <position.json>");
        std::process::exit(2);
    }

    let path = PathBuf::from(&args[1]);
    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Failed to read {}: {e}", path.display());
            std::process::exit(1);
        }
    };

    let input: InputFile = match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid JSON in {}: {e}", path.display());
            std::process::exit(2);
        }
    };

    let mode: CompressionMode = match input.mode.parse() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let position = match build_position(&input.pieces) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Invalid position: {e}");
            std::process::exit(2);
        }
    };

    let mut config = CompressConfig::default();
    if let Some(d) = input.min_distance {
        config.min_distance = d;
    }

    let piece_anchor;
    let anchor: &dyn AnchorLike = match input.anchor {
        Some(code) => {
            piece_anchor = PieceAnchor(code);
            &piece_anchor
        }
        None => &NoAnchor,
    };

    let out = match compress_position(&position, mode, &config, anchor) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Compression failed: {e}");
            std::process::exit(1);
        }
    };

    let violations = topology_violations(&out.pieces, mode.axes(), &out.min_distance);
    for v in &violations {
        eprintln!("contract violation: {v}");
    }

    let pieces: Vec<PieceReport> = out
        .pieces
        .iter()
        .filter_map(|p| {
            let at = p.transformed()?;
            Some(PieceReport {
                piece: p.piece,
                original: [p.original.x.to_string(), p.original.y.to_string()],
                compressed: [at.x.to_string(), at.y.to_string()],
            })
        })
        .collect();

    let groups: serde_json::Map<String, serde_json::Value> = out
        .orders
        .iter()
        .filter_map(|(axis, order)| {
            let order = order.as_ref()?;
            Some((format!("{axis:?}"), order.len().into()))
        })
        .collect();

    let report = serde_json::json!({
        "mode": mode.to_string(),
        "min_distance": config.min_distance,
        "max_abs_input": position.max_abs_coordinate().to_string(),
        "max_abs_output": out.position.max_abs_coordinate().to_string(),
        "groups": groups,
        "stats": out.stats,
        "pieces": pieces,
        "violations": violations.len(),
    });
    match serde_json::to_string_pretty(&report) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("Failed to serialize report: {e}");
            std::process::exit(1);
        }
    }
    if !violations.is_empty() {
        std::process::exit(1);
    }
}
