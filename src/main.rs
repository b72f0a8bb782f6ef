use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use rayon::prelude::*;

use atlas_slicer::cli::{CliArgs, Command, GridArgs, MarginArg, PairArg, SizeArg};
use atlas_slicer::config::LoadedConfig;
use atlas_slicer::geometry::Rect;
use atlas_slicer::mask::{MaskOptions, SourceImage, load_sources};
use atlas_slicer::output::{Size, SourceInfo, plan_outputs, read_regions, write_regions};
use atlas_slicer::region::{RegionRecord, create_regions};
use atlas_slicer::slice::{SliceConfig, SliceMode, Slicer};

#[allow(clippy::print_stderr)]
fn main() {
    if let Err(e) = run() {
        // Use eprintln instead of error! because logger may not be initialized
        // (e.g., config loading fails before logger init)
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse();

    // Load config if specified and merge with CLI args
    let merged = merge_config_with_args(&cli.command)?;

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(if merged.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    info!("Atlas slicer v{}", env!("CARGO_PKG_VERSION"));

    if !merged.output.exists() {
        fs::create_dir_all(&merged.output)?;
    }

    let existing = match &merged.existing {
        Some(path) => {
            let (info, regions) = read_regions(path)?;
            info!(
                "Loaded {} existing regions for {} from {}",
                regions.len(),
                info.image,
                path.display()
            );
            Some((info, regions))
        }
        None => None,
    };

    let sources = load_sources(&merged.input)?;
    let outputs = plan_outputs(&sources, &merged.output)?;

    if let Some((info, _)) = &existing {
        if !sources.iter().any(|s| describes(info, s)) {
            warn!(
                "No input matches {} from the existing regions file; it is ignored",
                info.image
            );
        }
    }

    // One slicer (and mask cache) per image, so nothing is shared across threads
    let created: Result<Vec<usize>> = sources
        .par_iter()
        .zip(outputs.par_iter())
        .map(|(source, output)| {
            // Existing regions only belong to the image their document names
            let existing: &[RegionRecord] = match &existing {
                Some((info, regions)) if describes(info, source) => regions.as_slice(),
                _ => &[],
            };
            slice_source(source, output, &merged, existing)
        })
        .collect();
    let created: usize = created?.iter().sum();

    info!(
        "Done! Created {} regions across {} images",
        created,
        sources.len()
    );

    Ok(())
}

fn describes(info: &SourceInfo, source: &SourceImage) -> bool {
    source.path().is_some_and(|path| info.describes(path))
}

/// Slice one image and write its regions file. Returns the number of new regions.
fn slice_source(
    source: &SourceImage,
    output: &Path,
    merged: &MergedConfig,
    existing: &[RegionRecord],
) -> Result<usize> {
    let mut slicer = Slicer::new(merged.slice.clone(), merged.mask);
    let existing_rects: Vec<Rect> = existing.iter().map(|r| r.region).collect();
    let slices = slicer.slice(Some(source), &existing_rects);

    let stem = source.stem();
    let created = create_regions(&slices, &stem, merged.margin, merged.filter_clip, existing);
    let created_count = created.len();

    let mut regions = existing.to_vec();
    regions.extend(created);

    let (w, h) = source.dimensions();
    let info = SourceInfo {
        image: source
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        size: Size { w, h },
    };

    write_regions(output, &info, &regions)?;
    info!(
        "{}: {} new regions, saved {}",
        info.image,
        created_count,
        output.display()
    );

    Ok(created_count)
}

/// Merged configuration from CLI args and optional config file.
struct MergedConfig {
    input: Vec<PathBuf>,
    output: PathBuf,
    existing: Option<PathBuf>,
    slice: SliceConfig,
    mask: MaskOptions,
    margin: Rect,
    filter_clip: bool,
    verbose: bool,
}

fn merge_config_with_args(command: &Command) -> Result<MergedConfig> {
    let args = command.common();

    let loaded_config = args
        .config
        .as_ref()
        .map(|path| LoadedConfig::load(path))
        .transpose()?;

    let file_config = loaded_config
        .as_ref()
        .map(|lc| lc.config.clone())
        .unwrap_or_default();

    // Input: CLI overrides config
    let input = if !args.input.is_empty() {
        args.input.clone()
    } else if let Some(ref lc) = loaded_config {
        lc.resolve_inputs()?
    } else {
        Vec::new()
    };

    // Output: CLI > config > default
    let output = args
        .output
        .clone()
        .or_else(|| loaded_config.as_ref().map(LoadedConfig::resolve_output_dir))
        .unwrap_or_else(|| PathBuf::from("."));

    let existing = args
        .existing
        .clone()
        .or_else(|| loaded_config.as_ref().and_then(LoadedConfig::resolve_existing));

    // Mode and policy strings from the file are validated even when the
    // subcommand picks the mode.
    let mut slice = file_config.slice_config()?;
    match command {
        Command::Auto(auto) => {
            slice.mode = SliceMode::Automatic;
            if let Some(tolerance) = auto.tolerance {
                slice.merge_tolerance = tolerance;
            }
        }
        Command::CellSize(grid) => {
            slice.mode = SliceMode::GridByCellSize;
            if let Some(SizeArg(w, h)) = grid.cell {
                slice.cell_size = (w, h);
            }
            apply_grid_args(&mut slice, &grid.grid);
        }
        Command::CellCount(grid) => {
            slice.mode = SliceMode::GridByCellCount;
            if let Some(SizeArg(columns, rows)) = grid.grid_size {
                slice.columns_rows = (columns, rows);
            }
            apply_grid_args(&mut slice, &grid.grid);
        }
        Command::Run(_) => {}
    }
    if let Some(preservation) = args.preserve {
        slice.preservation = preservation;
    }

    let mut mask = file_config.mask_options();
    if let Some(threshold) = args.alpha_threshold {
        mask.alpha_threshold = threshold;
    }
    if args.max_mask_resolution.is_some() {
        mask.max_resolution = args.max_mask_resolution;
    }

    let margin = match args.margin {
        Some(MarginArg([x, y, w, h])) => Rect::new(x, y, w, h),
        None => file_config.margin_rect(),
    };

    Ok(MergedConfig {
        input,
        output,
        existing,
        slice,
        mask,
        margin,
        filter_clip: args.filter_clip || file_config.filter_clip,
        // Verbose is CLI-only
        verbose: args.verbose,
    })
}

fn apply_grid_args(slice: &mut SliceConfig, grid: &GridArgs) {
    if let Some(PairArg(x, y)) = grid.offset {
        slice.layout.offset = (x, y);
    }
    if let Some(PairArg(x, y)) = grid.padding {
        slice.layout.padding = (x, y);
    }
    slice.layout.keep_empty |= grid.keep_empty;
}
