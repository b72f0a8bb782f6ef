use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::slice::PreservationPolicy;

#[derive(Parser, Debug)]
#[command(name = "atlas-slicer")]
#[command(version, about = "Detect sprite regions in textures", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// One region per connected opaque area
    Auto(AutoArgs),
    /// Regular grid of fixed-size cells
    CellSize(CellSizeArgs),
    /// Regular grid with a fixed number of columns and rows
    CellCount(CellCountArgs),
    /// Use the mode and settings from the config file
    Run(CommonArgs),
}

impl Command {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Command::Auto(args) => &args.common,
            Command::CellSize(args) => &args.common,
            Command::CellCount(args) => &args.common,
            Command::Run(args) => args,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Input image files or directories
    #[arg(required_unless_present = "config")]
    pub input: Vec<PathBuf>,

    /// Load settings from a JSON config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory for region files [default: .]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Regions file whose regions already exist on the texture
    #[arg(long, value_name = "FILE")]
    pub existing: Option<PathBuf>,

    /// What to do with slices overlapping existing regions [default: ignore-existing]
    #[arg(long, value_enum)]
    pub preserve: Option<PreservationPolicy>,

    /// Margin for created regions as X,Y,W,H [default: 0,0,0,0]
    #[arg(long, value_name = "X,Y,W,H")]
    pub margin: Option<MarginArg>,

    /// Enable filter clip on created regions
    #[arg(long)]
    pub filter_clip: bool,

    /// Alpha (0-1) a pixel must exceed to count as opaque [default: 0.1]
    #[arg(long, value_name = "ALPHA")]
    pub alpha_threshold: Option<f32>,

    /// Limit the opacity mask's longest side (downsamples large textures)
    #[arg(long, value_name = "PIXELS")]
    pub max_mask_resolution: Option<u32>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AutoArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Largest gap in pixels still merged into one region [default: 1.5]
    #[arg(long, value_name = "PIXELS")]
    pub tolerance: Option<f32>,
}

#[derive(Args, Debug, Clone)]
pub struct GridArgs {
    /// Position of the first cell as X,Y [default: 0,0]
    #[arg(long, value_name = "X,Y")]
    pub offset: Option<PairArg>,

    /// Gap between cells as X,Y [default: 0,0]
    #[arg(long, value_name = "X,Y")]
    pub padding: Option<PairArg>,

    /// Keep cells without any opaque pixel
    #[arg(long)]
    pub keep_empty: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CellSizeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Cell size as WxH [default: 8x8]
    #[arg(long, value_name = "WxH")]
    pub cell: Option<SizeArg>,

    #[command(flatten)]
    pub grid: GridArgs,
}

#[derive(Args, Debug, Clone)]
pub struct CellCountArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of columns and rows as CxR [default: 1x1]
    #[arg(long, value_name = "CxR")]
    pub grid_size: Option<SizeArg>,

    #[command(flatten)]
    pub grid: GridArgs,
}

/// Two integers written as `WxH`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeArg(pub u32, pub u32);

impl std::str::FromStr for SizeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WxH, got '{}'", s))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid size '{}': {}", s, e))
        };
        Ok(SizeArg(parse(w)?, parse(h)?))
    }
}

/// Two numbers written as `X,Y`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairArg(pub f32, pub f32);

impl std::str::FromStr for PairArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = parse_floats(s)?;
        match values.as_slice() {
            [x, y] => Ok(PairArg(*x, *y)),
            _ => Err(format!("expected X,Y, got '{}'", s)),
        }
    }
}

/// Four numbers written as `X,Y,W,H`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginArg(pub [f32; 4]);

impl std::str::FromStr for MarginArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = parse_floats(s)?;
        match values.as_slice() {
            [x, y, w, h] => Ok(MarginArg([*x, *y, *w, *h])),
            _ => Err(format!("expected X,Y,W,H, got '{}'", s)),
        }
    }
}

fn parse_floats(s: &str) -> Result<Vec<f32>, String> {
    s.split(',')
        .map(|v| {
            v.trim()
                .parse::<f32>()
                .map_err(|e| format!("invalid number '{}' in '{}': {}", v, s, e))
        })
        .collect()
}
