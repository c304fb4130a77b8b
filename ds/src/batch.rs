//! Headless analysis runs for `ds analyze`.
//!
//! Submits a domain, streams step progress to the writer as polls come
//! back, and finishes with the scored result in the requested format.
//! JSON output suppresses progress lines so the document stays parseable.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use eyre::{Result, bail};
use scoutapi::{AnalysisApi, AnalysisResult, Performance, normalize_domain};
use tracing::{debug, warn};

use crate::cli::OutputFormat;
use crate::poller::{JobPoller, PollEvent};

/// Run one analysis to completion, writing progress and the result to `out`.
pub async fn run_analysis<W: Write>(
    api: Arc<dyn AnalysisApi>,
    input: &str,
    format: OutputFormat,
    poll_interval: Duration,
    out: &mut W,
) -> Result<()> {
    debug!(%input, %format, "run_analysis: called");
    let domain = normalize_domain(input)?;
    let progress = matches!(format, OutputFormat::Text);

    if progress {
        writeln!(out, "Analyzing {domain}")?;
        out.flush()?;
    }

    let job = match api.start_analysis(&domain).await {
        Ok(job) => job,
        Err(e) => {
            warn!(error = %e, "run_analysis: submission failed");
            bail!("Failed to start analysis. Please try again.");
        }
    };
    debug!(job_id = %job.job_id, "run_analysis: job started");

    let mut poller = JobPoller::spawn(api, job.job_id.clone(), poll_interval);
    let mut steps_seen = 0;

    while let Some(event) = poller.recv().await {
        match event {
            PollEvent::Status(status) => {
                if progress {
                    for record in status.step_history.iter().skip(steps_seen) {
                        let mark = match record.performance() {
                            Some(Performance::Strong) => "✓",
                            Some(Performance::Average) => "⚠",
                            Some(Performance::Weak) => "✗",
                            None => "•",
                        };
                        writeln!(out, "{mark} Step {}: {}", record.step, record.display_title())?;
                    }
                    out.flush()?;
                }
                steps_seen = steps_seen.max(status.step_history.len());

                if status.completed {
                    let Some(result) = status.result else {
                        // Job died server-side; its status text carries the reason
                        bail!("{}", status.status);
                    };
                    write_result(&result, &format, steps_seen, out)?;
                    return Ok(());
                }
            }
            PollEvent::Failed(_) => bail!("Failed to get job status"),
        }
    }

    // Poller task gone without a completed snapshot
    bail!("Failed to get job status");
}

fn write_result<W: Write>(result: &AnalysisResult, format: &OutputFormat, steps: usize, out: &mut W) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "\n✓ Analysis complete ({steps} steps)")?;
            writeln!(out)?;
            writeln!(out, "Final Analysis for {}", result.domain)?;
            let metrics = &result.metrics;
            writeln!(out, "  {:<16} {}", "Overall Score", metrics.score_text())?;
            writeln!(out, "  {:<16} {}", "Potential", metrics.potential)?;
            writeln!(out, "  {:<16} {}", "Market Size", metrics.market_size)?;
            writeln!(out, "  {:<16} {}", "Company Age", metrics.company_age)?;
            writeln!(out, "  {:<16} {}", "Market Position", metrics.market_position)?;
            writeln!(out, "  {:<16} {}", "Recommendation", metrics.recommendation)?;
            writeln!(out, "  {:<16} {}", "Analyzed at", result.analyzed_at)?;
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(result)?)?;
        }
    }
    out.flush()?;
    Ok(())
}
