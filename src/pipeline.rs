use crate::composite::FrameProcessor;
use crate::sink::OutputSink;
use crate::source::FramePairSource;
use anyhow::{Context, Result};
use std::time::{Duration, Instant};

/// How a run ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub processed: u64,
    pub skipped: u64,
}

/// Drive every (frame, mask) pair from `source` through `processor` into `output`.
///
/// A frame whose compositing fails produces no output; it is skipped with a
/// warning, or ends the run when `halt_on_error` is set.
pub fn run_pipeline<S, P, O>(
    source: &mut S,
    processor: &mut P,
    output: &mut O,
    halt_on_error: bool,
) -> Result<PipelineSummary>
where
    S: FramePairSource,
    P: FrameProcessor,
    O: OutputSink,
{
    let mut summary = PipelineSummary::default();
    let mut total_read_time = Duration::ZERO;
    let mut total_composite_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    tracing::info!("Starting pipeline");
    if let Some(n) = source.remaining() {
        tracing::info!("{} frame pairs queued", n);
    }

    loop {
        // Read inputs
        let read_start = Instant::now();
        let Some((frame, mask)) = source.next_pair().context("Failed to read frame pair")? else {
            break;
        };
        total_read_time += read_start.elapsed();

        // Composite
        let composite_start = Instant::now();
        let result = processor.process(&frame, &mask);
        total_composite_time += composite_start.elapsed();

        let output_frame = match result {
            Ok(out) => out,
            Err(err) if !halt_on_error => {
                tracing::warn!("Skipping frame at {}: {}", frame.timestamp, err);
                summary.skipped += 1;
                continue;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to composite frame at {}", frame.timestamp));
            }
        };

        // Output frame
        let output_start = Instant::now();
        output
            .write_frame(&output_frame)
            .context("Failed to write frame")?;
        total_output_time += output_start.elapsed();

        summary.processed += 1;

        // Log stats every 30 frames
        if summary.processed % 30 == 0 {
            let n = summary.processed as f64;
            let avg_read_ms = total_read_time.as_secs_f64() * 1000.0 / n;
            let avg_composite_ms = total_composite_time.as_secs_f64() * 1000.0 / n;
            let avg_output_ms = total_output_time.as_secs_f64() * 1000.0 / n;
            tracing::info!(
                "Frame {}: read={:.1}ms, composite={:.1}ms, output={:.1}ms, total={:.1}ms",
                summary.processed,
                avg_read_ms,
                avg_composite_ms,
                avg_output_ms,
                avg_read_ms + avg_composite_ms + avg_output_ms
            );
        }
    }

    tracing::info!(
        "Pipeline finished: {} frames written, {} skipped",
        summary.processed,
        summary.skipped
    );
    Ok(summary)
}
