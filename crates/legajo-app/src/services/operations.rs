// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operation orchestration — turns a parsed command into pipeline calls run
// through the background runner, and prints the outcome.

use std::path::{Path, PathBuf};

use legajo_core::error::{LegajoError, Result};
use legajo_core::human_errors::humanize_error;
use legajo_core::{
    AppConfig, ByteSize, OperationKind, OperationOutcome, OperationReport, QualityProfile,
    SizeReport,
};
use legajo_document::compress::default_output_path;
use legajo_document::pdf::{image_to_pdf, remove_pages_with_progress};
use legajo_document::{
    CompressionPipeline, ConversionPipeline, OperationEvent, PageSelection, PdfReader,
    ProgressReporter, RemovalSummary, spawn_operation,
};
use legajo_security::secure_delete;
use serde::Serialize;
use serde_json::json;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::cli::Command;

/// Why a command did not succeed.
#[derive(Debug)]
pub enum Failure {
    /// Rejected before any operation started (bad arguments, config, I/O).
    Rejected(LegajoError),
    /// An operation ran and failed. `error` is absent when the work aborted
    /// without producing one.
    Operation {
        report: OperationReport,
        error: Option<LegajoError>,
    },
}

impl From<LegajoError> for Failure {
    fn from(err: LegajoError) -> Self {
        Self::Rejected(err)
    }
}

/// Successful pipeline result plus what goes into the report.
struct Done<T> {
    value: T,
    message: String,
    output: PathBuf,
}

/// Load `--config FILE` if given, else `<data dir>/config.json`, else defaults.
pub fn load_config(explicit: Option<&Path>, data_dir: &Path) -> Result<AppConfig> {
    match explicit {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load_or_default(data_dir),
    }
}

/// Runs commands against one configuration.
pub struct Services {
    config: AppConfig,
    json: bool,
}

impl Services {
    pub fn new(config: AppConfig, json: bool) -> Self {
        Self { config, json }
    }

    pub async fn run(&self, command: Command) -> std::result::Result<(), Failure> {
        match command {
            Command::Convert { input, output } => self.convert(input, output).await,
            Command::RemovePages {
                input,
                output,
                pages,
                shred_source,
            } => self.remove_pages(input, output, &pages, shred_source).await,
            Command::Compress {
                input,
                output,
                quality,
                tier,
            } => self.compress(input, output, quality, tier).await,
            Command::ImageToPdf { input, output } => self.image_to_pdf(input, output).await,
            Command::Info { input } => self.info(&input),
            Command::Shred { path } => {
                let report = self.shred(path).await?;
                self.print_report(&report, None::<()>)
            }
        }
    }

    // -- Commands -------------------------------------------------------------

    async fn convert(&self, input: PathBuf, output: Option<PathBuf>) -> std::result::Result<(), Failure> {
        let pipeline = ConversionPipeline::from_config(&self.config);
        let source = input.clone();
        let requested = output.clone();

        let (report, _) = tracked(OperationKind::ConvertWord, input, output, move |progress| {
            let path = pipeline.convert_with_progress(
                &source,
                requested.as_deref(),
                &progress.callback(),
            )?;
            Ok(Done {
                message: format!("converted to {}", path.display()),
                output: path,
                value: (),
            })
        })
        .await?;

        self.print_report(&report, None::<()>)
    }

    async fn remove_pages(
        &self,
        input: PathBuf,
        output: PathBuf,
        pages: &str,
        shred_source: bool,
    ) -> std::result::Result<(), Failure> {
        let selection = PageSelection::parse_one_based(pages)?;
        let shred = shred_source || self.config.secure_delete_sources;

        let source = input.clone();
        let destination = output.clone();
        let (report, summary) = tracked(
            OperationKind::RemovePages,
            input.clone(),
            Some(output.clone()),
            move |progress| {
                let summary: RemovalSummary = remove_pages_with_progress(
                    &source,
                    &destination,
                    &selection,
                    &progress.callback(),
                )?;
                Ok(Done {
                    message: format!(
                        "removed {} of {} pages, {} left",
                        summary.removed_pages(),
                        summary.original_pages,
                        summary.retained_pages
                    ),
                    output: summary.output_path.clone(),
                    value: summary,
                })
            },
        )
        .await?;

        self.print_report(&report, Some(&summary))?;

        if shred {
            if same_path(&input, &output) {
                warn!(path = %input.display(), "source was replaced in place, not shredding");
            } else {
                let shredded = self.shred(input).await?;
                self.print_report(&shredded, None::<()>)?;
            }
        }
        Ok(())
    }

    async fn compress(
        &self,
        input: PathBuf,
        output: Option<PathBuf>,
        quality: Option<QualityProfile>,
        tier: Option<usize>,
    ) -> std::result::Result<(), Failure> {
        let profile = match (tier, quality) {
            (Some(tier), _) => QualityProfile::from_tier(tier)?,
            (None, Some(quality)) => quality,
            (None, None) => self.config.default_quality,
        };
        let output = output.unwrap_or_else(|| default_output_path(&input, profile));
        info!(profile = %profile, label = profile.label(), "compression profile selected");

        let pipeline = CompressionPipeline::from_config(&self.config);
        let source = input.clone();
        let destination = output.clone();

        let (report, sizes) = tracked(OperationKind::Compress, input, Some(output), move |progress| {
            let engine_output = pipeline.try_compress_with_progress(
                &source,
                &destination,
                profile,
                &progress.callback(),
            )?;
            if !engine_output.is_empty() {
                debug!(engine_output = %engine_output, "engine output");
            }
            let sizes = SizeReport::measure(&source, &destination)?;
            Ok(Done {
                message: format!("compressed with profile {profile}"),
                output: destination,
                value: sizes,
            })
        })
        .await?;

        self.print_report(&report, Some(&sizes))?;
        if !self.json {
            println!("Original:   {}", sizes.original);
            println!("Compressed: {}", sizes.compressed);
            println!("Reduction:  {:.1}%", sizes.reduction_percent());
        }
        Ok(())
    }

    async fn image_to_pdf(&self, input: PathBuf, output: PathBuf) -> std::result::Result<(), Failure> {
        let source = input.clone();
        let destination = output.clone();

        let (report, _) = tracked(OperationKind::ImageToPdf, input, Some(output), move |_| {
            let path = image_to_pdf(&source, &destination)?;
            Ok(Done {
                message: format!("image written to {}", path.display()),
                output: path,
                value: (),
            })
        })
        .await?;

        self.print_report(&report, None::<()>)
    }

    fn info(&self, input: &Path) -> std::result::Result<(), Failure> {
        let reader = PdfReader::open(input)?;
        let size = ByteSize::of_path(input).map_err(LegajoError::from)?;

        if self.json {
            let value = json!({
                "path": input,
                "pages": reader.page_count(),
                "version": reader.version(),
                "size_bytes": size.bytes(),
                "size": size.to_string(),
            });
            print_json(&value)?;
        } else {
            println!("File:    {}", input.display());
            println!("Pages:   {}", reader.page_count());
            println!("Version: PDF {}", reader.version());
            println!("Size:    {size}");
        }
        Ok(())
    }

    async fn shred(&self, path: PathBuf) -> std::result::Result<OperationReport, Failure> {
        let target = path.clone();
        let (report, _) = tracked(OperationKind::SecureDelete, path, None, move |_| {
            secure_delete(&target);
            Ok(Done {
                message: format!("{} securely deleted", target.display()),
                output: target,
                value: (),
            })
        })
        .await?;
        Ok(report)
    }

    // -- Output ---------------------------------------------------------------

    fn print_report<T: Serialize>(
        &self,
        report: &OperationReport,
        details: Option<T>,
    ) -> std::result::Result<(), Failure> {
        if self.json {
            let mut value = serde_json::to_value(report).map_err(LegajoError::from)?;
            if let Some(details) = details {
                value["details"] = serde_json::to_value(details).map_err(LegajoError::from)?;
            }
            print_json(&value)?;
        } else {
            println!("{}", report.message);
        }
        Ok(())
    }

    /// Print a failure: humanised text on stderr, or JSON on stdout.
    pub fn print_failure(&self, failure: &Failure) {
        let (error, report) = match failure {
            Failure::Rejected(err) => (Some(err), None),
            Failure::Operation { report, error } => (error.as_ref(), Some(report)),
        };

        if self.json {
            let mut value = match (report, error) {
                (Some(report), _) => serde_json::to_value(report).unwrap_or_else(|_| json!({})),
                (None, Some(err)) => json!({
                    "success": false,
                    "error": err.kind(),
                    "message": err.to_string(),
                }),
                (None, None) => json!({ "success": false }),
            };
            if let Some(err) = error {
                value["human"] = serde_json::to_value(humanize_error(err)).unwrap_or_default();
            }
            println!("{value}");
            return;
        }

        match (error, report) {
            (Some(err), _) => {
                let human = humanize_error(err);
                eprintln!("error: {}", human.message);
                eprintln!("  {}", human.suggestion);
                if human.retriable {
                    eprintln!("  Running the command again may succeed.");
                }
                eprintln!("  detail: {err}");
            }
            (None, Some(report)) => eprintln!("error: {}", report.message),
            (None, None) => eprintln!("error: operation failed"),
        }
    }
}

/// Run `work` through the background runner and wait for it.
///
/// Progress events are forwarded to the log. The pipeline's value or error
/// comes back through a one-shot channel.
async fn tracked<T, W>(
    kind: OperationKind,
    input: PathBuf,
    output: Option<PathBuf>,
    work: W,
) -> std::result::Result<(OperationReport, T), Failure>
where
    T: Send + 'static,
    W: FnOnce(&ProgressReporter) -> Result<Done<T>> + Send + 'static,
{
    let (value_tx, value_rx) = oneshot::channel::<T>();
    let (error_tx, error_rx) = oneshot::channel::<LegajoError>();

    let mut handle = spawn_operation(kind, input, output, move |progress| match work(progress) {
        Ok(done) => {
            let outcome = OperationOutcome::succeeded(done.message, done.output);
            let _ = value_tx.send(done.value);
            outcome
        }
        Err(err) => {
            let outcome = OperationOutcome::failed(&err);
            let _ = error_tx.send(err);
            outcome
        }
    });

    while let Some(event) = handle.next_event().await {
        if let OperationEvent::Progress { percent, .. } = event {
            debug!(operation = %kind, percent, "progress");
        }
    }
    let report = handle.join().await;

    if report.success {
        match value_rx.await {
            Ok(value) => Ok((report, value)),
            Err(_) => Err(Failure::Operation {
                report,
                error: None,
            }),
        }
    } else {
        Err(Failure::Operation {
            report,
            error: error_rx.await.ok(),
        })
    }
}

fn print_json(value: &impl Serialize) -> std::result::Result<(), Failure> {
    let text = serde_json::to_string_pretty(value).map_err(LegajoError::from)?;
    println!("{text}");
    Ok(())
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
