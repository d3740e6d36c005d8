use anyhow::{Context, Result};
use backdrop::config::{CompositorConfig, RangePolicy, ResizeFilter, WeightMode};
use backdrop::pipeline::run_pipeline;
use backdrop::sink::PngSequenceSink;
use backdrop::source::ImageSequenceSource;
use backdrop::{DirectorySource, MaskCompositor, PixelFormat};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of input video frames (image files, sorted by name)
    #[arg(long)]
    frames: PathBuf,

    /// Directory of segmentation masks, one per frame
    #[arg(long)]
    masks: PathBuf,

    /// Background image name, resolved under --assets-dir
    #[arg(short, long)]
    background: String,

    /// Directory backgrounds are resolved from
    #[arg(long, default_value = ".")]
    assets_dir: PathBuf,

    /// Output directory for composited PNG frames
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// JSON compositor configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Feather kernel size (odd, 1 disables feathering)
    #[arg(long)]
    kernel_size: Option<u32>,

    /// Feather sigma (<= 0 derives it from the kernel size)
    #[arg(long)]
    sigma: Option<f32>,

    /// How background weights are derived
    #[arg(long, value_enum)]
    weight_mode: Option<WeightMode>,

    /// Handling of out-of-range mask values
    #[arg(long, value_enum)]
    range_policy: Option<RangePolicy>,

    /// Background resampling filter
    #[arg(long, value_enum)]
    resize_filter: Option<ResizeFilter>,

    /// Timestamp rate of the input sequence
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Keep an alpha channel in the output frames
    #[arg(long)]
    rgba: bool,

    /// Stop at the first frame that fails to composite instead of skipping it
    #[arg(long)]
    halt_on_error: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn compositor_config(&self) -> Result<CompositorConfig> {
        let mut config = match &self.config {
            Some(path) => CompositorConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => CompositorConfig::default(),
        };

        if let Some(kernel_size) = self.kernel_size {
            config.feather.kernel_size = kernel_size;
        }
        if let Some(sigma) = self.sigma {
            config.feather.sigma = sigma;
        }
        if let Some(mode) = self.weight_mode {
            config.weight_mode = mode;
        }
        if let Some(policy) = self.range_policy {
            config.range_policy = policy;
        }
        if let Some(filter) = self.resize_filter {
            config.resize_filter = filter;
        }

        config.validate().context("Invalid compositor configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = args.compositor_config()?;
    tracing::info!("Backdrop starting");
    tracing::info!(
        "Feather: kernel={} sigma={}, weights={:?}, filter={:?}",
        config.feather.kernel_size,
        config.feather.sigma,
        config.weight_mode,
        config.resize_filter
    );

    let format = if args.rgba {
        PixelFormat::Rgba8
    } else {
        PixelFormat::Rgb8
    };

    let assets = DirectorySource::new(&args.assets_dir);
    let mut compositor = MaskCompositor::open(&assets, &args.background, config)
        .context("Failed to load background")?;

    let mut source = ImageSequenceSource::new(&args.frames, &args.masks, format, args.fps)
        .context("Failed to open input sequence")?;

    let mut output = PngSequenceSink::new(&args.output).context("Failed to initialize output")?;

    let summary = run_pipeline(&mut source, &mut compositor, &mut output, args.halt_on_error)?;
    if summary.skipped > 0 {
        tracing::warn!("{} frames could not be composited", summary.skipped);
    }

    Ok(())
}
