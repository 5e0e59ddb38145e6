//! Batch orchestration.
//!
//! Coordinates the per-document workflow:
//! 1. Load the document through the reader
//! 2. Linearize its text into sentences
//! 3. Extract keyword context windows and write `<stem>.txt`
//! 4. Export embedded images
//!
//! Loading and rendering run on the blocking pool under the
//! per-document timeout; files are only written once both finish in
//! time. Per-document problems end up in the report; only an
//! unwritable output location stops the batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;

use crate::core::batch::output::{assign_stems, OutputDir};
use crate::core::config::Config;
use crate::core::error::{DocsiftError, Result};
use crate::core::images::ImageExtractor;
use crate::core::reader::{Contents, Document, DocumentReader};
use crate::core::text::{render_windows, ContextWindowExtractor, TextLinearizer};
use crate::core::types::{BatchReport, DocumentOutcome, ExtractionRequest, OutcomeStatus};

/// Everything one document needs, shared by all documents of a run
#[derive(Clone)]
struct Job {
    reader: Arc<dyn DocumentReader>,
    images: ImageExtractor,
    request: Arc<ExtractionRequest>,
    extractor: Option<Arc<ContextWindowExtractor>>,
    sink: Option<Arc<OutputDir>>,
    timeout: Duration,
}

/// Runs an extraction request over a list of documents
pub struct BatchRunner {
    reader: Arc<dyn DocumentReader>,
    images: ImageExtractor,
    timeout: Duration,
    max_concurrent: usize,
}

impl BatchRunner {
    /// Create a runner with the limits from `config`
    pub fn new(reader: Arc<dyn DocumentReader>, config: &Config) -> Self {
        Self {
            reader,
            images: ImageExtractor::new(config.images.max_images_per_document),
            timeout: Duration::from_secs(config.limits.document_timeout_sec),
            max_concurrent: config.limits.max_concurrent_documents.max(1),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Extract every input into `output_dir`
    ///
    /// `report.outcomes[i]` always belongs to `inputs[i]`, whatever
    /// the degree of parallelism.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty input list, `IoFatal` when the output
    /// directory cannot be prepared or a write fails mid-batch.
    pub async fn run(
        &self,
        inputs: &[PathBuf],
        request: &ExtractionRequest,
        output_dir: &Path,
    ) -> Result<BatchReport> {
        if inputs.is_empty() {
            return Err(DocsiftError::Validation("no input selected".to_string()));
        }

        let started_at = Utc::now();
        let start = Instant::now();

        let sink = OutputDir::prepare(output_dir)?;
        tracing::info!(
            "Processing {} document(s) into {:?}",
            inputs.len(),
            sink.path()
        );

        let job = self.job(request, Some(Arc::new(sink)))?;
        let outcomes = self.process_all(job, inputs).await?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let report = BatchReport::from_outcomes(outcomes, started_at, duration_ms);

        tracing::info!(
            "Batch complete: {} completed, {} no match, {} unreadable, {} timed out, \
             {} image(s) in {}ms",
            report.completed,
            report.no_match,
            report.empty,
            report.timed_out,
            report.images_written,
            duration_ms
        );
        Ok(report)
    }

    /// Search-and-display mode: render windows without touching disk
    ///
    /// Image extraction is ignored here; the rendered text of each
    /// document is in `outcome.result.text`.
    pub async fn search(
        &self,
        inputs: &[PathBuf],
        request: &ExtractionRequest,
    ) -> Result<Vec<DocumentOutcome>> {
        if inputs.is_empty() {
            return Err(DocsiftError::Validation("no input selected".to_string()));
        }
        if !request.want_text() {
            return Err(DocsiftError::Validation(
                "search needs a keyword".to_string(),
            ));
        }

        let job = self.job(request, None)?;
        self.process_all(job, inputs).await
    }

    fn job(&self, request: &ExtractionRequest, sink: Option<Arc<OutputDir>>) -> Result<Job> {
        let extractor = match (request.want_text(), request.keyword()) {
            (true, Some(keyword)) => Some(Arc::new(ContextWindowExtractor::new(keyword)?)),
            (true, None) => {
                return Err(DocsiftError::Validation(
                    "a keyword is required to extract text".to_string(),
                ))
            }
            (false, _) => None,
        };

        Ok(Job {
            reader: Arc::clone(&self.reader),
            images: self.images.clone(),
            request: Arc::new(request.clone()),
            extractor,
            sink,
            timeout: self.timeout,
        })
    }

    async fn process_all(&self, job: Job, inputs: &[PathBuf]) -> Result<Vec<DocumentOutcome>> {
        let stems = assign_stems(inputs);

        if self.max_concurrent <= 1 {
            let mut outcomes = Vec::with_capacity(inputs.len());
            for (idx, (path, stem)) in inputs.iter().zip(stems).enumerate() {
                tracing::debug!("Document {}/{}: {:?}", idx + 1, inputs.len(), path);
                outcomes.push(run_one(job.clone(), path.clone(), stem, None).await?);
            }
            return Ok(outcomes);
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut set = JoinSet::new();

        for (idx, (path, stem)) in inputs.iter().cloned().zip(stems).enumerate() {
            let job = job.clone();
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let permit = semaphore.acquire_owned().await.ok();
                (idx, run_one(job, path, stem, permit).await)
            });
        }

        let mut slots: Vec<Option<DocumentOutcome>> = vec![None; inputs.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, Ok(outcome))) => slots[idx] = Some(outcome),
                Ok((_, Err(e))) => {
                    set.abort_all();
                    return Err(e);
                }
                Err(e) => tracing::warn!("Worker task failed: {}", e),
            }
        }

        Ok(slots
            .into_iter()
            .zip(inputs)
            .map(|(slot, path)| {
                slot.unwrap_or_else(|| {
                    DocumentOutcome::new(
                        path,
                        OutcomeStatus::EmptyDocument {
                            reason: "document was not processed".to_string(),
                        },
                    )
                })
            })
            .collect())
    }
}

/// What the reader step produced for one document
enum Loaded {
    /// The reader failed; the reason ends up in the outcome
    Unreadable(String),
    Ready {
        document: Document,
        /// Rendered windows, `None` when text was not requested
        text: Option<Result<(String, usize)>>,
    },
}

/// Process one document: read under the timeout, then persist
///
/// Only the read step runs under the timeout. A reader that times out
/// keeps its blocking thread (and `permit`) until it returns, but its
/// result is dropped, so nothing is written for a timed-out document.
async fn run_one(
    job: Job,
    path: PathBuf,
    stem: String,
    permit: Option<OwnedSemaphorePermit>,
) -> Result<DocumentOutcome> {
    let timeout = job.timeout;
    let load_job = job.clone();
    let load_path = path.clone();
    let handle = tokio::task::spawn_blocking(move || {
        let loaded = load_document(&load_job, &load_path);
        drop(permit);
        loaded
    });

    let loaded = match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(loaded)) => loaded,
        Ok(Err(e)) => {
            tracing::warn!("Reader crashed on {:?}: {}", path, e);
            Loaded::Unreadable("reader crashed".to_string())
        }
        Err(_) => {
            tracing::warn!("Timed out after {:?} on {:?}", timeout, path);
            return Ok(DocumentOutcome::new(
                path,
                OutcomeStatus::TimedOut {
                    after_secs: timeout.as_secs(),
                },
            ));
        }
    };

    let write_path = path.clone();
    match tokio::task::spawn_blocking(move || persist_document(&job, &write_path, &stem, loaded))
        .await
    {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Writing output for {:?} failed: {}", path, e);
            Ok(DocumentOutcome::new(
                path,
                OutcomeStatus::EmptyDocument {
                    reason: "output writer crashed".to_string(),
                },
            ))
        }
    }
}

/// Read a document and render its windows; touches no output
fn load_document(job: &Job, path: &Path) -> Loaded {
    let request = &job.request;
    let contents = Contents {
        text: request.want_text(),
        images: request.want_images() && job.sink.is_some(),
    };

    match job.reader.load(path, contents) {
        Ok(document) => {
            let text = job
                .extractor
                .as_ref()
                .map(|extractor| extract_text(&document, extractor, request));
            Loaded::Ready { document, text }
        }
        Err(e) => {
            if e.is_soft_failure() {
                tracing::warn!("Failed to read {:?}: {}", path, e);
            } else {
                tracing::error!("Unexpected reader error on {:?}: {}", path, e);
            }
            Loaded::Unreadable(e.to_string())
        }
    }
}

/// Write the text file and images of a loaded document
///
/// Only `IoFatal` is returned as an error; everything else is an
/// outcome status.
fn persist_document(job: &Job, path: &Path, stem: &str, loaded: Loaded) -> Result<DocumentOutcome> {
    let (document, text) = match loaded {
        Loaded::Unreadable(reason) => {
            return Ok(DocumentOutcome::new(
                path,
                OutcomeStatus::EmptyDocument { reason },
            ))
        }
        Loaded::Ready { document, text } => (document, text),
    };

    let mut outcome = DocumentOutcome::new(path, OutcomeStatus::Completed);

    match text {
        Some(Ok((text, matches))) => {
            if let Some(sink) = &job.sink {
                outcome.text_file = Some(sink.write_text(stem, &text)?);
            }
            outcome.result.text = Some(text);
            outcome.result.matches = matches;
        }
        Some(Err(DocsiftError::NoMatchFound { keyword })) => {
            tracing::info!("No match for '{}' in {:?}", keyword, path);
            outcome.status = OutcomeStatus::NoMatchFound;
        }
        Some(Err(DocsiftError::EmptyDocument(reason))) => {
            tracing::warn!("No extractable text in {:?}", path);
            outcome.status = OutcomeStatus::EmptyDocument { reason };
        }
        Some(Err(e)) => return Err(e),
        None => {}
    }

    if job.request.want_images() {
        if let Some(sink) = &job.sink {
            let report = job.images.extract_images(&document, sink.path(), stem)?;
            outcome.result.images_written = report.written.len();
            outcome.result.images_skipped = report.skipped;
        }
    }

    tracing::debug!(
        "{:?}: {} ({} window(s), {} image(s))",
        path,
        outcome.status.label(),
        outcome.result.matches,
        outcome.result.images_written
    );
    Ok(outcome)
}

/// Rendered windows and their number for one document
pub fn extract_text(
    document: &Document,
    extractor: &ContextWindowExtractor,
    request: &ExtractionRequest,
) -> Result<(String, usize)> {
    if document.is_blank() {
        return Err(DocsiftError::EmptyDocument(
            "document has no text layer".to_string(),
        ));
    }

    let sentences = TextLinearizer::new().linearize(&document.blocks);
    let windows = extractor.find_windows(
        &sentences,
        request.count(),
        request.direction(),
        request.first_only(),
    )?;
    Ok((render_windows(&sentences, &windows), windows.len()))
}
