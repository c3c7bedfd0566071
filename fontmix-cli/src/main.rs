//! Command line front end for fontmix

use std::{path::PathBuf, process::ExitCode};

use fontmix::{
    CutMethod, EmptyUnionPolicy, Generator, GlyphOutcome, GlyphSource, MixConfig, SourceFont,
};

#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

/// How cut positions are chosen.
#[derive(clap::ValueEnum, Copy, Clone, Debug)]
enum CutMethodArg {
    /// New random cuts for every letter
    Random,
    /// Evenly spaced cuts
    Equidistant,
    /// The cuts given with --h-cut and --v-cut
    Custom,
}

impl From<CutMethodArg> for CutMethod {
    fn from(arg: CutMethodArg) -> Self {
        match arg {
            CutMethodArg::Random => CutMethod::Random,
            CutMethodArg::Equidistant => CutMethod::Equidistant,
            CutMethodArg::Custom => CutMethod::Custom,
        }
    }
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Source fonts, in mixing order
    fonts: Vec<PathBuf>,
    /// Read settings from a JSON file; flags given here override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    cut_method: Option<CutMethodArg>,
    /// A horizontal cut fraction, for the custom cut method
    #[arg(long = "h-cut")]
    h_cuts: Vec<f64>,
    /// A vertical cut fraction, for the custom cut method
    #[arg(long = "v-cut")]
    v_cuts: Vec<f64>,
    /// Cut into a checkerboard of rows and columns
    #[arg(long)]
    vertical: bool,
    /// Mix glyphs at their original size
    #[arg(long)]
    no_normalize: bool,
    /// Family name of the generated font
    #[arg(long)]
    family: Option<String>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Seed for random cuts
    #[arg(long)]
    seed: Option<u64>,
    /// Leave a letter blank when the mix has no ink, instead of using the
    /// first source's glyph
    #[arg(long)]
    blank_on_empty: bool,
}

impl GenerateArgs {
    fn into_config(self) -> Result<MixConfig, fontmix::ConfigError> {
        let mut config = match &self.config {
            Some(path) => MixConfig::from_json_file(path)?,
            None => MixConfig::default(),
        };
        if !self.fonts.is_empty() {
            config.sources = self.fonts;
        }
        if let Some(method) = self.cut_method {
            config.cut_method = method.into();
        }
        if !self.h_cuts.is_empty() {
            config.h_cuts = self.h_cuts;
        }
        if !self.v_cuts.is_empty() {
            config.v_cuts = self.v_cuts;
        }
        config.vertical_cuts |= self.vertical;
        if self.no_normalize {
            config.normalize = false;
        }
        if let Some(family) = self.family {
            config.family_name = family;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.blank_on_empty {
            config.empty_union = EmptyUnionPolicy::Blank;
        }
        Ok(config)
    }
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Mix the letters A to Z from several fonts into a new font
    Generate(GenerateArgs),
    /// Print the flattened contours of one glyph
    Extract {
        font: PathBuf,
        /// Glyph name, or a single character looked up in the character map
        letter: String,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    use clap::Parser as _;
    let args = Args::parse();
    let result = match args.command {
        Command::Generate(args) => generate(args),
        Command::Extract { font, letter } => extract(font, &letter),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn generate(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.into_config()?;
    config.validate()?;
    let handle = Generator::new(config).spawn();
    for progress in handle.progress() {
        println!("{progress}");
    }
    let generated = handle.join()?;
    if generated.used_alternate {
        log::warn!("requested path was not writable, using an alternate name");
    }
    println!("saved to {}", generated.output_path.display());
    Ok(())
}

fn extract(font: PathBuf, letter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let source = SourceFont::from_path(font);
    let format = source.outline_format()?;
    println!("{} ({format:?} outlines)", source.label());
    match source.extract(letter) {
        GlyphOutcome::Contours(contours) => {
            println!("{letter}: {} contours", contours.len());
            for (i, contour) in contours.iter().enumerate() {
                let kind = if contour.is_exterior() { "outer" } else { "hole" };
                println!(
                    "  #{i}: {} points, signed area {:.1} ({kind})",
                    contour.len(),
                    contour.signed_area()
                );
                for point in contour.points() {
                    println!("    {:.2} {:.2}", point.x, point.y);
                }
            }
        }
        GlyphOutcome::Empty(reason) => {
            log::warn!("'{letter}' has no contours in {}", source.label());
            println!("{letter}: no contours ({reason})");
        }
    }
    Ok(())
}
