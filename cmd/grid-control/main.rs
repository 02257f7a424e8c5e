//! CLI entry point for the dataset ingestion and partitioning core: wires a
//! `ScanProvider`/`GCProvider` pipeline, a `Splitter`, and the `ResyncEngine`
//! behind a `gc_runtime::Runtime`, driven either once or forever by a
//! `gc_trigger::ResyncTrigger`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use gc_config::{ConfigView, NonInteractiveSink, PromptKind, PromptSink};
use gc_provider::{GCProvider, ProviderError, ScanProvider};
use gc_runtime::Runtime;
use gc_splitter::Splitter;
use gc_types::Block;
use sysexits::ExitCode;
use tracing_subscriber::EnvFilter;

/// A workload manager's dataset ingestion and partitioning core: discovers
/// input files, groups them into datasets and blocks, splits blocks into
/// job-sized partitions, and resyncs the persisted partition map against a
/// refreshed view of the data.
#[derive(Debug, Parser)]
#[clap(name = "grid-control", version)]
struct Cli {
    /// Directory or `.dbs`-suffixed nested path the provider scans for input files.
    #[clap(long)]
    dataset: String,

    /// Optional human-readable override folded into the dataset hash seed.
    #[clap(long)]
    nickname: Option<String>,

    /// Read the dataset through another grid-control run's work directory
    /// instead of scanning a storage path directly.
    #[clap(long)]
    from_gc_run: bool,

    /// Directory the partition map (`datamap.tar`) and sidecar catalog
    /// (`dataset.list`) are persisted under.
    #[clap(long, default_value = "./work")]
    persist_dir: PathBuf,

    /// `ClassName` recorded in the partition map's top-level metadata.
    #[clap(long, default_value = "DataSplitter")]
    class_name: String,

    /// How blocks are cut into partitions.
    #[clap(long, value_enum, default_value = "file-boundary")]
    splitter: SplitterKind,

    /// File or event count for `fixed-files`/`fixed-events` splitters.
    #[clap(long)]
    splitter_count: Option<i64>,

    /// Prompt on stdin for each of the four resync confirmation classes
    /// instead of defaulting every one to a conservative no-op.
    #[clap(long)]
    interactive: bool,

    /// Run a single pass and exit instead of looping on the resync trigger.
    #[clap(long)]
    once: bool,

    /// Minimum interval between scheduled resync passes, `hh[:mm[:ss]]`.
    #[clap(long, default_value = "1:00:00")]
    interval: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SplitterKind {
    FileBoundary,
    FixedFiles,
    FixedEvents,
}

impl Cli {
    fn build_splitter(&self) -> anyhow::Result<Splitter> {
        match self.splitter {
            SplitterKind::FileBoundary => Ok(Splitter::FileBoundary),
            SplitterKind::FixedFiles => {
                let count = self
                    .splitter_count
                    .ok_or_else(|| anyhow::anyhow!("--splitter-count is required for fixed-files"))?;
                Ok(Splitter::FixedFileCount(count.max(1) as usize))
            }
            SplitterKind::FixedEvents => {
                let count = self
                    .splitter_count
                    .ok_or_else(|| anyhow::anyhow!("--splitter-count is required for fixed-events"))?;
                Ok(Splitter::FixedEventCount(count))
            }
        }
    }
}

/// Reads stdin for each of the four resync confirmation classes, tracking
/// whether a prompt is currently in flight so the SIGINT listener spawned in
/// `main` knows to terminate it with `EX_DATAERR` (spec.md §6) rather than
/// the process as a whole.
struct TerminalPromptSink {
    in_prompt: Arc<AtomicBool>,
}

impl PromptSink for TerminalPromptSink {
    fn confirm(&self, kind: PromptKind, message: &str) -> bool {
        use std::io::Write;
        self.in_prompt.store(true, Ordering::SeqCst);
        print!("{kind:?}: {message} [y/N] ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        let answer = match std::io::stdin().read_line(&mut line) {
            Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        };
        self.in_prompt.store(false, Ordering::SeqCst);
        answer
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Loads the sidecar block catalog (spec.md §6) if one was written by a
/// prior pass, reconstructing `oldBlocks` for the resync diff. A first run
/// against an empty `persist_dir` has no catalog and resyncs against an
/// empty old-block universe, so every discovered block shows up as `Added`.
fn load_old_blocks(persist_dir: &std::path::Path) -> anyhow::Result<Vec<Block>> {
    let catalog_path = persist_dir.join("dataset.list");
    if !catalog_path.exists() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(&catalog_path)?;
    Ok(gc_resync::parse_dataset_list(&text)?)
}

fn save_catalog(persist_dir: &std::path::Path, blocks: &[Block]) -> anyhow::Result<()> {
    let encoded = gc_resync::encode_dataset_list(blocks);
    let tmp = persist_dir.join("dataset.list.tmp");
    let dest = persist_dir.join("dataset.list");
    std::fs::write(&tmp, encoded)?;
    std::fs::rename(&tmp, &dest)?;
    Ok(())
}

/// Runs the configured scanner chain to completion, on a blocking thread so
/// the async runtime isn't starved by directory walks or `job.info` reads.
/// This is the one pipeline run each pass both diffs against the old block
/// universe and, on success, records in the sidecar catalog — so the two
/// never disagree about what "new" means.
async fn scan_new_blocks(cli: &Cli) -> Result<Vec<Block>, ProviderError> {
    let config = ConfigView::new("dataset");
    let dataset = cli.dataset.clone();
    let nickname = cli.nickname.clone();
    let from_gc_run = cli.from_gc_run;

    tokio::task::spawn_blocking(move || {
        if from_gc_run {
            let provider = GCProvider::build(&config, &dataset, nickname.as_deref(), BTreeMap::new())?;
            provider
                .base()
                .iter_blocks_raw(&gc_types::CancelToken::new(), &NonInteractiveSink)
        } else {
            let provider = ScanProvider::build(&config, &dataset, nickname.as_deref(), None)?;
            provider
                .base()
                .iter_blocks_raw(&gc_types::CancelToken::new(), &NonInteractiveSink)
        }
    })
    .await
    .unwrap_or_else(|join_err| Err(ProviderError::AllScansFailed(join_err.to_string())))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.persist_dir)?;
    let splitter = cli.build_splitter()?;
    let interval_secs = gc_config::parse_time(&cli.interval).unwrap_or(3600).max(1) as u64;

    let runtime = Runtime::new(&cli.persist_dir, cli.class_name.clone());
    runtime.load_persisted()?;

    let in_prompt = Arc::new(AtomicBool::new(false));
    let sigint_prompt_flag = Arc::clone(&in_prompt);
    let cancel = runtime.cancel_token();
    let sigint_cancel = cancel.clone();
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                break;
            }
            if sigint_prompt_flag.load(Ordering::SeqCst) {
                eprintln!("aborted by SIGINT during prompt");
                std::process::exit(ExitCode::DataErr as i32);
            }
            tracing::warn!("SIGINT received, cancelling in-flight pass");
            sigint_cancel.cancel();
        }
    });

    let sink: Box<dyn PromptSink> = if cli.interactive {
        Box::new(TerminalPromptSink { in_prompt })
    } else {
        Box::new(NonInteractiveSink)
    };

    if cli.once {
        run_one_pass(&cli, &runtime, splitter, sink.as_ref()).await
    } else {
        let trigger = gc_trigger::ResyncTrigger::new(Duration::from_secs(interval_secs), Duration::from_secs(interval_secs));
        let _signal_handle = trigger.install()?;

        trigger
            .run(|| async {
                if let Err(err) = run_one_pass(&cli, &runtime, splitter, sink.as_ref()).await {
                    tracing::error!(error = %err, "resync pass failed");
                }
            })
            .await;
        Ok(())
    }
}

/// One full pass: scan, diff against the sidecar catalog, resync the
/// partition map, and — only once the map has been durably rewritten —
/// advance the catalog to the blocks just scanned. `AbortError` anywhere in
/// this path is reported at `EX_DATAERR` (spec.md §6) rather than treated as
/// an ordinary failure.
async fn run_one_pass(
    cli: &Cli,
    runtime: &Runtime,
    splitter: Splitter,
    sink: &dyn PromptSink,
) -> anyhow::Result<()> {
    let old_blocks = load_old_blocks(&cli.persist_dir)?;

    let new_blocks = match scan_new_blocks(cli).await {
        Ok(blocks) => blocks,
        Err(ProviderError::Abort(_)) => abort_with_dataerr(),
        Err(err) => return Err(err.into()),
    };

    let blocks_for_pass = new_blocks.clone();
    let report = match runtime
        .run_pass(&old_blocks, move || Ok(blocks_for_pass), splitter, cli.interactive, sink)
        .await
    {
        Ok(report) => report,
        Err(gc_runtime::RuntimeError::Resync(gc_resync::ResyncError::Abort(_))) => abort_with_dataerr(),
        Err(err) => return Err(err.into()),
    };

    save_catalog(&cli.persist_dir, &new_blocks)?;
    tracing::info!(?report, "resync pass complete");
    Ok(())
}

fn abort_with_dataerr() -> ! {
    eprintln!("aborted");
    std::process::exit(ExitCode::DataErr as i32);
}
