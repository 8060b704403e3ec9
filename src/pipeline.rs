use crate::catalog::{CatalogLookup, EpisodeRecord};
use crate::convert::ttml_to_cues;
use crate::error::{PodvttError, Result};
use crate::resolver::FileResolver;
use crate::sink::{OutputSink, OutputTarget};
use crate::subtitle::{ExtractOptions, SubtitleFormatter, VttFormatter};
use console::style;
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Configuration for a catalog-wide extraction run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of documents converted at the same time.
    pub concurrency: usize,
    /// Cue extraction options.
    pub extract: ExtractOptions,
    /// Also store the raw TTML next to the VTT.
    pub copy_ttml: bool,
    /// Show a progress bar.
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            extract: ExtractOptions::default(),
            copy_ttml: false,
            show_progress: true,
        }
    }
}

/// What happened to one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DocumentOutcome {
    Converted { output: PathBuf, cues: usize },
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// Position of the entry in the catalog listing.
    pub position: usize,
    pub podcast: String,
    pub episode: String,
    pub outcome: DocumentOutcome,
}

/// Statistics from a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cues_written: usize,
    pub elapsed: Duration,
}

impl BatchStats {
    fn from_reports(reports: &[DocumentReport], elapsed: Duration) -> Self {
        let mut stats = Self {
            total: reports.len(),
            elapsed,
            ..Default::default()
        };

        for report in reports {
            match &report.outcome {
                DocumentOutcome::Converted { cues, .. } => {
                    stats.converted += 1;
                    stats.cues_written += cues;
                }
                DocumentOutcome::Skipped { .. } => stats.skipped += 1,
                DocumentOutcome::Failed { .. } => stats.failed += 1,
            }
        }

        stats
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Per-entry reports in catalog order.
    pub reports: Vec<DocumentReport>,
    pub stats: BatchStats,
    pub cancelled: bool,
}

/// Drives catalog lookup, file resolution, conversion and output for every episode.
pub struct BatchRunner {
    catalog: Arc<dyn CatalogLookup>,
    resolver: Arc<dyn FileResolver>,
    sink: Arc<dyn OutputSink>,
    config: BatchConfig,
    cancelled: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(
        catalog: Arc<dyn CatalogLookup>,
        resolver: Arc<dyn FileResolver>,
        sink: Arc<dyn OutputSink>,
        config: BatchConfig,
    ) -> Self {
        Self {
            catalog,
            resolver,
            sink,
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share a cancellation flag. Once set, documents not yet started are skipped.
    pub fn with_cancel(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Process every catalog entry. Only a catalog failure aborts the run;
    /// per-document problems end up in the reports.
    pub async fn run(&self) -> Result<BatchResult> {
        let start_time = Instant::now();

        info!("Reading catalog from {}", self.catalog.name());
        let episodes = self.catalog.episodes().await?;
        let total = episodes.len();

        info!(
            "Converting {} transcripts ({} at a time)",
            total, self.config.concurrency
        );

        let progress_bar = if self.config.show_progress && total > 0 {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} episodes")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut futures = FuturesUnordered::new();

        for (position, record) in episodes.into_iter().enumerate() {
            let sem = semaphore.clone();
            let resolver = self.resolver.clone();
            let sink = self.sink.clone();
            let config = self.config.clone();
            let cancelled = self.cancelled.clone();
            let pb = progress_bar.clone();

            futures.push(async move {
                let target = OutputTarget::from_record(&record);

                let outcome = match sem.acquire().await {
                    Ok(_permit) if cancelled.load(Ordering::Relaxed) => DocumentOutcome::Skipped {
                        reason: "cancelled".to_string(),
                    },
                    Ok(_permit) => {
                        process_document(&record, &target, resolver.as_ref(), sink.as_ref(), &config)
                            .await
                    }
                    Err(e) => DocumentOutcome::Failed {
                        reason: e.to_string(),
                    },
                };

                if let Some(ref pb) = pb {
                    pb.inc(1);
                }

                DocumentReport {
                    position,
                    podcast: target.podcast,
                    episode: target.episode,
                    outcome,
                }
            });
        }

        let mut reports: Vec<DocumentReport> = Vec::with_capacity(total);
        while let Some(report) = futures.next().await {
            reports.push(report);
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Extraction complete");
        }

        reports.sort_by_key(|r| r.position);

        let stats = BatchStats::from_reports(&reports, start_time.elapsed());
        info!(
            "Batch complete: {} converted, {} skipped, {} failed in {:.2}s",
            stats.converted,
            stats.skipped,
            stats.failed,
            stats.elapsed.as_secs_f64()
        );

        Ok(BatchResult {
            reports,
            stats,
            cancelled: self.cancelled.load(Ordering::Relaxed),
        })
    }
}

/// Resolve, convert and store a single catalog entry.
pub async fn process_document(
    record: &EpisodeRecord,
    target: &OutputTarget,
    resolver: &dyn FileResolver,
    sink: &dyn OutputSink,
    config: &BatchConfig,
) -> DocumentOutcome {
    let Some(locator) = record.transcript_path.as_deref().filter(|p| !p.is_empty()) else {
        warn!("No transcript path for: {}", target.episode);
        return DocumentOutcome::Skipped {
            reason: "no transcript path".to_string(),
        };
    };

    let ttml = match resolver.resolve(locator).await {
        Ok(ttml) => ttml,
        Err(e @ (PodvttError::Locator(_) | PodvttError::NotFound(_))) => {
            warn!("Skipping {}: {}", target.episode, e);
            return DocumentOutcome::Skipped {
                reason: e.to_string(),
            };
        }
        Err(e) => {
            warn!("Failed to read transcript for {}: {}", target.episode, e);
            return DocumentOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    let cues = match ttml_to_cues(&ttml, config.extract) {
        Ok(cues) => cues,
        Err(e) => {
            warn!("Failed to convert TTML to VTT for {}: {}", target.episode, e);
            return DocumentOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };
    let vtt = VttFormatter.format(&cues);

    if config.copy_ttml {
        match sink.write(target, "ttml", &ttml).await {
            Ok(path) => debug!("Copied TTML to {:?}", path),
            Err(e) => {
                warn!("Failed to copy TTML for {}: {}", target.episode, e);
                return DocumentOutcome::Failed {
                    reason: format!("TTML copy failed: {}", e),
                };
            }
        }
    }

    match sink.write(target, VttFormatter.extension(), &vtt).await {
        Ok(output) => {
            info!("Saved: {}", output.display());
            DocumentOutcome::Converted {
                output,
                cues: cues.len(),
            }
        }
        Err(e) => {
            warn!("Failed to save {}: {}", target.episode, e);
            DocumentOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

/// Write the batch result as pretty JSON.
pub fn write_report(path: &Path, result: &BatchResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Print a summary of the batch results.
pub fn print_summary(result: &BatchResult, output_root: &Path) {
    let stats = &result.stats;

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                   Transcript Extraction Complete               ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Output:     {}", output_root.display());
    println!("  Episodes:   {}", stats.total);
    println!("  Converted:  {}", style(stats.converted).green());
    println!("  Skipped:    {}", style(stats.skipped).yellow());
    println!("  Failed:     {}", style(stats.failed).red());
    println!("  Cues:       {}", stats.cues_written);
    println!("  Time:       {:.2}s", stats.elapsed.as_secs_f64());

    let failures: Vec<_> = result
        .reports
        .iter()
        .filter_map(|r| match &r.outcome {
            DocumentOutcome::Failed { reason } => Some((r, reason)),
            _ => None,
        })
        .collect();
    if !failures.is_empty() {
        println!();
        println!("  Failures:");
        for (report, reason) in failures {
            println!(
                "    {} {} / {}: {}",
                style("✗").red(),
                report.podcast,
                report.episode,
                reason
            );
        }
    }

    if result.cancelled {
        println!();
        println!("  {} Cancelled before all episodes were processed", style("!").yellow());
    }
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
