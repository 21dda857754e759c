//! Demo that ranks two saved marketplace payloads and prints the shortlist as JSON.
//!
//! Usage: `rank_demo <ebay.json> <amazon.json> [criterion] [top_n]`
//!
//! With `RANK_DEMO_METRICS=1` the Prometheus text of the run is written to stderr.

use anyhow::{anyhow, bail, Context, Result};
use listing_ranker::config::RankingConfig;
use listing_ranker::rank_payloads;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn read_payload(path: &str) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("reading payload {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing payload {path}"))
}

/// Logs go to stderr so stdout stays pure JSON. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ingest=info,engine=info,warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    init_tracing();

    let metrics_handle = if std::env::var("RANK_DEMO_METRICS").is_ok_and(|v| v == "1") {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::set_global_recorder(recorder)
            .map_err(|_| anyhow!("metrics recorder already installed"))?;
        Some(handle)
    } else {
        None
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("usage: rank_demo <ebay.json> <amazon.json> [criterion] [top_n]");
    }

    let mut cfg = RankingConfig::load_default()?;
    if let Some(c) = args.get(2) {
        cfg.criterion = c.parse()?;
    }
    if let Some(n) = args.get(3) {
        cfg.top_n = n.parse().with_context(|| format!("invalid top_n `{n}`"))?;
    }

    let ebay = read_payload(&args[0])?;
    let amazon = read_payload(&args[1])?;
    let req = cfg.to_request(chrono::Local::now().date_naive())?;
    let ranked = rank_payloads(&ebay, &amazon, &req)?;

    tracing::info!(
        criterion = %req.criterion,
        results = ranked.len(),
        "ranking done"
    );
    println!("{}", serde_json::to_string_pretty(&ranked)?);
    if let Some(handle) = metrics_handle {
        eprintln!("{}", handle.render());
    }
    Ok(())
}
