// Task orchestration: Init, batch production and writing.
pub mod context;
pub mod processor;
pub mod source;
pub mod writer;

pub use context::TaskContext;
pub use processor::{OfferBuilder, RecordBuilder, StockBuilder, TaskSummary};
pub use source::{read_positions, spawn_feeder};
pub use writer::{Document, FeedRecord, FeedWriter};

use crate::config::AppConfig;
use crate::model::{FeedError, Position};
use crate::reference::ReferenceData;
use crate::store::PropertyStore;
use chrono::Local;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::{error, info, warn};
use uuid::Uuid;

const STOCK_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Result of a finished task.
#[derive(Debug)]
pub struct FeedReport {
    pub path: PathBuf,
    pub written: usize,
    pub summary: TaskSummary,
}

fn task_failed(stage: &str, e: JoinError) -> FeedError {
    error!("{} task failed: {}", stage, e);
    FeedError::Task(format!("{}: {}", stage, e))
}

/// Streams position batches through `builder` into `writer`.
///
/// The producer runs as a tokio task, the writer on the blocking pool; they
/// share a channel of `capacity` record batches. A writer failure is returned
/// as is. A producer failure still lets the writer drain the queued batches
/// and close the document before the error is returned.
pub async fn run_feed<B, W>(
    builder: Arc<B>,
    input: mpsc::Receiver<Vec<Position>>,
    mut writer: FeedWriter<W>,
    capacity: usize,
) -> Result<(W, usize, TaskSummary), FeedError>
where
    B: RecordBuilder + 'static,
    W: Write + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Vec<B::Record>>(capacity.max(1));

    let producer = tokio::spawn(async move { processor::produce(builder.as_ref(), input, tx).await });
    let consumer = tokio::task::spawn_blocking(move || {
        while let Some(batch) = rx.blocking_recv() {
            writer.write_batch(&batch)?;
        }
        writer.finish()
    });

    let (produced, consumed) = futures::join!(producer, consumer);
    let (inner, written) = consumed.map_err(|e| task_failed("writer", e))??;
    let summary = produced.map_err(|e| task_failed("producer", e))??;
    Ok((inner, written, summary))
}

fn open_output(path: &Path, document: Document) -> Result<FeedWriter<BufWriter<File>>, FeedError> {
    FeedWriter::new(BufWriter::new(File::create(path)?), document)
}

/// Runs one feed task over the batches of `input` and writes `<output_dir>/<uuid>.xml`.
///
/// Nothing is written when Init fails; a partial file is removed when the task fails later.
pub async fn run_task(
    config: &AppConfig,
    reference: Arc<ReferenceData>,
    store: &dyn PropertyStore,
    input: mpsc::Receiver<Vec<Position>>,
) -> Result<FeedReport, FeedError> {
    let ctx = Arc::new(
        TaskContext::init(config.feed.as_ref(), config.params.clone(), reference, store).await?,
    );

    tokio::fs::create_dir_all(&config.output_dir).await?;
    let path = config.output_dir.join(format!("{}.xml", Uuid::new_v4()));
    let document = if ctx.update_stock_format {
        Document::Stock {
            date: Local::now().format(STOCK_DATE_FORMAT).to_string(),
        }
    } else {
        Document::Ads
    };
    info!("Writing feed to {}", path.display());

    let result = write_feed(ctx, path.clone(), document, input, config.queue_capacity).await;
    let (written, summary) = match result {
        Ok(done) => done,
        Err(e) => {
            remove_partial(&path).await;
            return Err(e);
        }
    };

    info!(
        "Feed {} done: {} records, {} skipped",
        path.display(),
        written,
        summary.skipped_total()
    );
    Ok(FeedReport {
        path,
        written,
        summary,
    })
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!("Removed partial feed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial feed {}: {}", path.display(), e),
    }
}

async fn write_feed(
    ctx: Arc<TaskContext>,
    path: PathBuf,
    document: Document,
    input: mpsc::Receiver<Vec<Position>>,
    capacity: usize,
) -> Result<(usize, TaskSummary), FeedError> {
    let stock = matches!(document, Document::Stock { .. });
    let writer = tokio::task::spawn_blocking(move || open_output(&path, document))
        .await
        .map_err(|e| task_failed("writer", e))??;

    let (_, written, summary) = if stock {
        run_feed(Arc::new(StockBuilder::new(ctx)), input, writer, capacity).await?
    } else {
        run_feed(Arc::new(OfferBuilder::new(ctx)), input, writer, capacity).await?
    };
    Ok((written, summary))
}

/// Runs a task over the positions file named in the config, streamed in batches.
pub async fn run_from_file(
    config: &AppConfig,
    reference: Arc<ReferenceData>,
    store: &dyn PropertyStore,
) -> Result<FeedReport, FeedError> {
    let file = File::open(&config.positions_path)?;
    let (input, reader) = read_positions(
        BufReader::new(file),
        config.batch_size,
        config.queue_capacity,
    );

    let result = run_task(config, reference, store, input).await;
    let read = reader.await.map_err(|e| task_failed("reader", e))?;
    let report = result?;
    let total = match read {
        Ok(total) => total,
        Err(e) => {
            error!("Positions file {} is malformed: {}", config.positions_path.display(), e);
            remove_partial(&report.path).await;
            return Err(e);
        }
    };
    info!("Read {} positions from {}", total, config.positions_path.display());
    Ok(report)
}
