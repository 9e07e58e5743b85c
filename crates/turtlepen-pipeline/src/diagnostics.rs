//! Pipeline diagnostics: timing and counts for each stage.
//!
//! [`process_with_diagnostics`] runs the same stages as
//! [`crate::process`] and records how long each took and what it
//! produced. Time is read through the [`Clock`] trait so this crate stays
//! free of platform time sources; the CLI plugs in `std::time::Instant`.
//!
//! Durations are serialized as fractional seconds (`f64`) because
//! `std::time::Duration` has no stable serde representation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::mask::BinaryMask;
use crate::types::{CommandCounts, Island, PipelineConfig, PipelineError, Program};
use crate::{assemble, filter, islands};

/// Source of monotonic time.
pub trait Clock {
    /// Opaque timestamp.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Image decoding and luminance conversion.
    pub decode: StageDiagnostics,
    /// Gaussian blur.
    pub blur: StageDiagnostics,
    /// Canny edge detection.
    pub edge_detection: StageDiagnostics,
    /// Dilation.
    pub dilate: StageDiagnostics,
    /// Inversion (only when `config.invert` is set).
    pub invert: Option<StageDiagnostics>,
    /// Conversion of the filtered image into a [`BinaryMask`].
    pub mask: StageDiagnostics,
    /// Island extraction.
    pub island_extraction: StageDiagnostics,
    /// Tour planning and path compilation.
    pub assembly: StageDiagnostics,
    /// Wall-clock duration of the whole run.
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Totals across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for one stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage.
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Decoding.
    Decode {
        /// Size of the encoded input.
        input_bytes: usize,
        /// Decoded width.
        width: u32,
        /// Decoded height.
        height: u32,
    },
    /// Blur.
    Blur {
        /// Kernel sigma.
        sigma: f32,
    },
    /// Canny.
    EdgeDetection {
        /// Low threshold after clamping.
        low_threshold: f32,
        /// High threshold after clamping.
        high_threshold: f32,
        /// Pixels marked as edges.
        edge_pixel_count: u64,
    },
    /// Dilation.
    Dilate {
        /// Passes applied.
        iterations: u32,
        /// Lit pixels afterwards.
        edge_pixel_count: u64,
    },
    /// Inversion.
    Invert {
        /// Lit pixels afterwards.
        edge_pixel_count: u64,
    },
    /// Mask conversion.
    Mask {
        /// Foreground cells.
        foreground_count: usize,
        /// Total cells.
        cell_count: u64,
    },
    /// Island extraction.
    IslandExtraction {
        /// Islands found.
        island_count: usize,
        /// Smallest island, in pixels.
        min_island_pixels: usize,
        /// Largest island, in pixels.
        max_island_pixels: usize,
        /// Mean island size, in pixels.
        mean_island_pixels: f64,
    },
    /// Assembly.
    Assembly {
        /// Command totals.
        counts: CommandCounts,
        /// Total commands emitted.
        command_count: usize,
    },
}

/// Whole-run totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Islands drawn.
    pub island_count: usize,
    /// Commands in the program.
    pub command_count: usize,
}

/// Run the full pipeline, timing each stage.
///
/// Produces exactly the program [`crate::process`] would.
///
/// # Errors
///
/// Same as [`crate::process`].
pub fn process_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &PipelineConfig,
    clock: &C,
) -> Result<(Program, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let run_start = clock.now();

    let start = clock.now();
    let gray = filter::decode_grayscale(image_bytes)?;
    let decode = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: gray.width(),
            height: gray.height(),
        },
    };

    let start = clock.now();
    let blurred = filter::blur(&gray, config.blur_sigma);
    let blur = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Blur {
            sigma: config.blur_sigma,
        },
    };

    let start = clock.now();
    let edges = filter::canny(&blurred, config.canny_low, config.canny_high);
    let high_threshold = config.canny_high.max(filter::MIN_THRESHOLD);
    let edge_detection = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::EdgeDetection {
            low_threshold: config
                .canny_low
                .max(filter::MIN_THRESHOLD)
                .min(high_threshold),
            high_threshold,
            edge_pixel_count: count_lit(&edges),
        },
    };

    let start = clock.now();
    let dilated = filter::dilate(&edges, config.dilate_iterations);
    let dilate = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Dilate {
            iterations: config.dilate_iterations,
            edge_pixel_count: count_lit(&dilated),
        },
    };

    let (filtered, invert) = if config.invert {
        let start = clock.now();
        let inverted = filter::invert(&dilated);
        let diag = StageDiagnostics {
            duration: clock.elapsed(&start),
            metrics: StageMetrics::Invert {
                edge_pixel_count: count_lit(&inverted),
            },
        };
        (inverted, Some(diag))
    } else {
        (dilated, None)
    };

    let start = clock.now();
    let mask = BinaryMask::from_gray(&filtered)?;
    let mask_diag = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Mask {
            foreground_count: mask.foreground_count(),
            cell_count: u64::from(mask.width()) * u64::from(mask.height()),
        },
    };

    let start = clock.now();
    let found = islands::find_islands(&mask);
    let stats = island_stats(&found);
    let island_count = found.len();
    let island_extraction = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::IslandExtraction {
            island_count,
            min_island_pixels: stats.min,
            max_island_pixels: stats.max,
            mean_island_pixels: stats.mean,
        },
    };

    let start = clock.now();
    let program = assemble::compile_islands(found, mask.dimensions());
    let assembly = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Assembly {
            counts: program.counts(),
            command_count: program.commands.len(),
        },
    };

    let diagnostics = PipelineDiagnostics {
        decode,
        blur,
        edge_detection,
        dilate,
        invert,
        mask: mask_diag,
        island_extraction,
        assembly,
        total_duration: clock.elapsed(&run_start),
        summary: PipelineSummary {
            width: program.dimensions.width,
            height: program.dimensions.height,
            island_count,
            command_count: program.commands.len(),
        },
    };

    Ok((program, diagnostics))
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Canvas: {}x{}",
            self.summary.width, self.summary.height
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration)
        ));
        lines.push(String::new());
        lines.push(format!(
            "{:<20} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let mut stages = vec![
            ("Decode", &self.decode),
            ("Blur", &self.blur),
            ("Edge Detection", &self.edge_detection),
            ("Dilate", &self.dilate),
        ];
        if let Some(ref invert) = self.invert {
            stages.push(("Invert", invert));
        }
        stages.push(("Mask", &self.mask));
        stages.push(("Islands", &self.island_extraction));
        stages.push(("Assembly", &self.assembly));

        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<20} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Islands: {}  |  Commands: {}",
            self.summary.island_count, self.summary.command_count
        ));

        lines.join("\n")
    }
}

fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Blur { sigma } => format!("sigma={sigma:.2}"),
        StageMetrics::EdgeDetection {
            low_threshold,
            high_threshold,
            edge_pixel_count,
        } => format!("low={low_threshold:.1} high={high_threshold:.1} edges={edge_pixel_count}"),
        StageMetrics::Dilate {
            iterations,
            edge_pixel_count,
        } => format!("x{iterations} lit={edge_pixel_count}"),
        StageMetrics::Invert { edge_pixel_count } => format!("lit={edge_pixel_count}"),
        StageMetrics::Mask {
            foreground_count,
            cell_count,
        } => format!("{foreground_count}/{cell_count} foreground"),
        StageMetrics::IslandExtraction {
            island_count,
            min_island_pixels,
            max_island_pixels,
            mean_island_pixels,
        } => format!(
            "{island_count} islands (min={min_island_pixels} max={max_island_pixels} mean={mean_island_pixels:.1})"
        ),
        StageMetrics::Assembly {
            counts,
            command_count,
        } => format!(
            "{command_count} cmds: {} moves, {} turns, {} pen-ups",
            counts.moves, counts.rotations, counts.pen_ups
        ),
    }
}

/// Count lit (255) pixels.
fn count_lit(image: &image::GrayImage) -> u64 {
    image
        .pixels()
        .map(|p| u64::from(u8::from(p.0[0] == 255)))
        .sum()
}

struct IslandStats {
    min: usize,
    max: usize,
    mean: f64,
}

fn island_stats(islands: &[Island]) -> IslandStats {
    let total: usize = islands.iter().map(Island::len).sum();
    let min = islands.iter().map(Island::len).min().unwrap_or(0);
    let max = islands.iter().map(Island::len).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let mean = if islands.is_empty() {
        0.0
    } else {
        total as f64 / islands.len() as f64
    };
    IslandStats { min, max, mean }
}
