// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use indexer_kernel::EventRecord;
use indexer_node::chain::RecordedChainReader;
use indexer_node::config::NodeConfig;
use indexer_node::content::{ContentSource, RecordedContent};
use indexer_node::engine::{Indexer, Outcome};
use indexer_node::ipfs::IpfsFetcher;
use indexer_node::prices::StaticPriceFeed;
use indexer_node::telemetry::init_telemetry;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "allo-indexer")]
#[command(about = "Compile decoded Allo V1 events into index changesets", long_about = None)]
struct Cli {
    /// Decoded events, one JSON object per line, in chain order.
    #[arg(long)]
    events: PathBuf,

    /// Recorded contract reads: { address: { function: value } }.
    #[arg(long)]
    calls: Option<PathBuf>,

    /// Recorded metadata documents: { pointer: document }. Skips IPFS.
    #[arg(long)]
    content: Option<PathBuf>,

    /// Node configuration (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write applied batches (JSON lines). Stdout when omitted.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchLine<'a> {
    chain_id: u64,
    block_number: u64,
    log_index: u32,
    event_name: &'a str,
    changesets: &'a [indexer_kernel::Changeset],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = NodeConfig::load(cli.config.as_deref()).context("loading config")?;
    init_telemetry(&cfg)?;

    tracing::info!("Starting allo-indexer with config: {:?}", cfg);

    let chain = match &cli.calls {
        Some(path) => RecordedChainReader::from_file(path).with_context(|| format!("reading {:?}", path))?,
        None => RecordedChainReader::new(),
    };
    let content = match &cli.content {
        Some(path) => ContentSource::Recorded(
            RecordedContent::from_file(path).with_context(|| format!("reading {:?}", path))?,
        ),
        None => ContentSource::Ipfs(IpfsFetcher::new(&cfg)?),
    };
    let mut indexer =
        Indexer::new(chain, content, StaticPriceFeed::new(&cfg.token_prices)).with_replay_window(cfg.replay_window);

    let events = tokio::fs::read_to_string(&cli.events)
        .await
        .with_context(|| format!("reading {:?}", cli.events))?;

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(path).with_context(|| format!("creating {:?}", path))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };

    let (mut applied, mut replayed, mut diverged) = (0usize, 0usize, 0usize);
    for (line_no, line) in events.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: EventRecord =
            serde_json::from_str(line).with_context(|| format!("{:?} line {}", cli.events, line_no + 1))?;

        // Compile failures halt: later events assume this one was committed.
        match indexer.process(&event).await? {
            Outcome::Applied(batch) => {
                applied += 1;
                let record = BatchLine {
                    chain_id: event.chain_id.0,
                    block_number: event.block_number,
                    log_index: event.log_index,
                    event_name: &event.event_name,
                    changesets: &batch,
                };
                serde_json::to_writer(&mut out, &record)?;
                out.write_all(b"\n")?;
            }
            Outcome::Replayed { diverged: d } => {
                replayed += 1;
                diverged += d as usize;
            }
        }
    }
    out.flush()?;

    let state = indexer.state();
    tracing::info!(
        "Done: {} applied, {} replayed ({} diverged); {} projects, {} rounds",
        applied,
        replayed,
        diverged,
        state.project_count(),
        state.round_count()
    );
    if diverged > 0 {
        anyhow::bail!("{} replayed events diverged from their first run", diverged);
    }
    Ok(())
}
