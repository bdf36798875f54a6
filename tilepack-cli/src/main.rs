use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use tilepack::config::TilingConfig;
use tilepack::{BitDepth, Geometry};
use tilepack_cli::{convert, info_lines, png_stem, source, Output};

/// Sprite sheet slicing CLI: indexed PNG to packed pixel tiles
#[derive(Parser)]
#[command(name = "tilepack", version)]
#[command(group(ArgGroup::new("output").args(["fcbfile", "rawfile", "pngfile"])))]
struct Args {
    /// Input indexed PNG file
    infile: PathBuf,

    /// Output tiles as Motorola FCB statements to FCBFILE (the comment
    /// header has no timestamp)
    #[arg(short, long)]
    fcbfile: Option<PathBuf>,

    /// Output tiles to binary RAWFILE
    #[arg(short, long)]
    rawfile: Option<PathBuf>,

    /// Output tiles as separate png files
    #[arg(short, long)]
    pngfile: Option<PathBuf>,

    /// Bits per pixel in output
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=8))]
    bitdepth: Option<u8>,

    /// Generate masks
    #[arg(short, long)]
    mask: bool,

    /// Width of each tile (0 = image width)
    #[arg(short = 'x', long)]
    width: Option<usize>,

    /// Height of each tile (0 = image height)
    #[arg(short = 'y', long)]
    height: Option<usize>,

    /// Width of big tiles (0 = tile width)
    #[arg(short = 'w', long)]
    bigwidth: Option<usize>,

    /// Height of big tiles (0 = tile height)
    #[arg(short = 'z', long)]
    bigheight: Option<usize>,

    /// Include undersized fragments in output
    #[arg(short, long)]
    keepfrags: bool,

    /// TOML file with default tiling options; command-line values win
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn output(&self) -> Option<Output> {
        if let Some(path) = &self.fcbfile {
            Some(Output::Fcb(path.clone()))
        } else if let Some(path) = &self.rawfile {
            Some(Output::Raw(path.clone()))
        } else {
            self.pngfile.clone().map(Output::Png)
        }
    }

    /// Load the config file (if any) and apply command-line overrides.
    fn tiling_config(&self) -> Result<TilingConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                TilingConfig::from_toml_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => TilingConfig::default(),
        };

        if let Some(bits) = self.bitdepth {
            config.bit_depth = BitDepth::try_from(bits).context("--bitdepth")?.bits();
        }
        config.mask |= self.mask;
        config.keep_fragments |= self.keepfrags;
        apply_size(&mut config.width, self.width);
        apply_size(&mut config.height, self.height);
        apply_size(&mut config.big_width, self.bigwidth);
        apply_size(&mut config.big_height, self.bigheight);
        Ok(config)
    }
}

/// A command-line size overrides the config; 0 resets it to "derived".
fn apply_size(slot: &mut Option<usize>, arg: Option<usize>) {
    if let Some(value) = arg {
        *slot = (value != 0).then_some(value);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let options = args.tiling_config()?.emit_options()?;
    let image = source::load_indexed_png(&args.infile)?;
    let geometry = Geometry::resolve(&options.tiles, image.width(), image.height())?;

    let source_name = args.infile.display().to_string();
    let info = info_lines(&source_name, &image, &geometry, options.depth);
    if !args.quiet {
        for line in &info {
            println!("{line}");
        }
    }

    let Some(output) = args.output() else {
        if !args.quiet {
            println!("No output option selected");
        }
        return Ok(());
    };

    if !args.quiet {
        match &output {
            Output::Fcb(path) => println!("Writing fcb output to {}", path.display()),
            Output::Raw(path) => println!("Writing raw output to {}", path.display()),
            Output::Png(path) => println!(
                "Writing output to png files {}_n.png",
                png_stem(path).display()
            ),
        }
        if options.mask && !output.supports_masks() {
            println!("Ignoring mask option");
        }
    }

    let summary = convert(&image, &options, &output, &info)?;

    if !args.quiet {
        println!(
            "{} tiles written, {} fragments dropped",
            summary.tiles, summary.dropped
        );
    }

    Ok(())
}
