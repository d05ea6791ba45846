//! Command-line arguments of the `piccompress` binary.
//!
//! Values not given on the command line fall back to the environment
//! (`PICCOMPRESS_QUALITY`, `PICCOMPRESS_WORKERS`) and then to the compiled-in
//! defaults of [`crate::config`].

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::batch::BatchOptions;
use crate::cli::constants::{GB, KB, MB};
use crate::config::{init_quality, init_workers, OneShotDefaults, MAP_FILE_SIZE};
use crate::params::{CompressionRequest, ResizeRequest, TargetFormat};

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Shrink within the input's own format.
    Optimize,
    /// Convert to JPEG.
    Jpeg,
    /// Convert to PNG.
    Png,
}

impl From<FormatArg> for TargetFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Optimize => TargetFormat::Optimize,
            FormatArg::Jpeg => TargetFormat::ConvertA,
            FormatArg::Png => TargetFormat::ConvertB,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "piccompress", version, about = "Compress and convert JPEG/PNG images")]
pub struct Cli {
    /// Files or directories to compress.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for results (default: next to each input).
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = FormatArg::Jpeg)]
    pub format: FormatArg,

    /// Encoder quality, forwarded unchecked.
    #[arg(short = 'q', long)]
    pub quality: Option<u32>,

    /// Target width in pixels (0 = unset).
    #[arg(long, default_value_t = 0)]
    pub width: u32,

    /// Target height in pixels (0 = unset).
    #[arg(long, default_value_t = 0)]
    pub height: u32,

    /// Target length of the shorter side (0 = unset).
    #[arg(long, default_value_t = 0)]
    pub short_side: u32,

    /// Target length of the longer side (0 = unset).
    #[arg(long, default_value_t = 0)]
    pub long_side: u32,

    /// Downscale by halving instead of to the exact size.
    #[arg(long)]
    pub pow2: bool,

    /// Let the engine read each file itself, using JPEG output, the
    /// environment quality and the default width cap with halving.
    #[arg(long, conflicts_with_all = ["format", "quality", "width", "height", "short_side", "long_side", "pow2"])]
    pub one_shot: bool,

    /// Walk directories recursively.
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Worker threads (0 = one per CPU).
    #[arg(short = 'T', long)]
    pub workers: Option<usize>,

    /// Output buffer size per worker; accepts K, M and G suffixes.
    #[arg(long, default_value_t = MAP_FILE_SIZE, value_parser = parse_size)]
    pub max_output: u64,

    /// More output; repeatable.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Less output; repeatable.
    #[arg(short = 'Q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,
}

/// Parse a byte count with an optional binary `K`, `M` or `G` suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let (digits, mult) = match s.as_bytes().last() {
        Some(b'K' | b'k') => (&s[..s.len() - 1], KB),
        Some(b'M' | b'm') => (&s[..s.len() - 1], MB),
        Some(b'G' | b'g') => (&s[..s.len() - 1], GB),
        _ => (s, 1),
    };
    let n: u64 = digits.parse().map_err(|_| format!("invalid size: {}", s))?;
    n.checked_mul(mult).ok_or_else(|| format!("size too large: {}", s))
}

impl Cli {
    /// Notification level: 2, raised by `-v`, lowered by `-Q`.
    pub fn display_level(&self) -> u32 {
        (2 + self.verbose as u32).saturating_sub(self.quiet as u32)
    }

    fn resize(&self) -> Option<ResizeRequest> {
        let requested = self.width != 0 || self.height != 0 || self.short_side != 0 || self.long_side != 0;
        if !requested {
            return None;
        }
        Some(
            ResizeRequest::width(self.width)
                .with_height(self.height)
                .with_sides(self.short_side, self.long_side)
                .with_power_of_two(self.pow2),
        )
    }

    pub fn request(&self) -> CompressionRequest {
        let mut request = CompressionRequest::new(self.format.into())
            .with_quality(self.quality.unwrap_or_else(init_quality));
        if let Some(resize) = self.resize() {
            request = request.with_resize(resize);
        }
        request
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            request: self.request(),
            workers: self.workers.unwrap_or_else(init_workers),
            max_output: self.max_output,
            one_shot: self.one_shot.then(OneShotDefaults::from_env),
        }
    }
}
