mod filemanager;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use lib_lmp::constants::FILE_EXT;
use lib_lmp::ColorApproximationMode;
use log::{error, LevelFilter};

use filemanager::ToolError;

#[derive(Parser, Debug)]
#[command(name = "lmp-tool")]
#[command(about = "Convert Doom picture lumps to and from PNG")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct PaletteArgs {
    /// Palette resource (768 bytes per page, e.g. PLAYPAL)
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Page of the palette resource to use
    #[arg(long, default_value_t = 0)]
    page: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a picture lump and write it as PNG
    ToPng {
        input: PathBuf,

        /// Output PNG path, defaults to the input with a .png extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        palette: PaletteArgs,
    },
    /// Quantize a PNG and write it as a picture lump
    FromPng {
        input: PathBuf,

        /// Output lump path, defaults to the input with a .lmp extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// nearest, floyd-steinberg, atkinson, bayer-2x2, bayer-4x4 or bayer-8x8
        #[arg(short, long, default_value_t = ColorApproximationMode::NearestColor)]
        mode: ColorApproximationMode,

        /// Left offset written to the header
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset_x: i16,

        /// Top offset written to the header
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset_y: i16,

        #[command(flatten)]
        palette: PaletteArgs,
    },
    /// Print the header and post layout of a picture lump as JSON
    Info { input: PathBuf },
    /// List the pages of a palette resource
    Palettes { file: PathBuf },
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run(command: Commands) -> Result<(), ToolError> {
    match command {
        Commands::ToPng {
            input,
            output,
            palette,
        } => {
            let colors = filemanager::load_palette(palette.palette.as_deref(), palette.page)?;
            let output = output.unwrap_or_else(|| filemanager::default_output(&input, "png"));
            filemanager::lmp_to_png(&input, &output, &colors)?;
            println!("{}", output.display());
        }
        Commands::FromPng {
            input,
            output,
            mode,
            offset_x,
            offset_y,
            palette,
        } => {
            let colors = filemanager::load_palette(palette.palette.as_deref(), palette.page)?;
            let output = output.unwrap_or_else(|| filemanager::default_output(&input, FILE_EXT));
            filemanager::png_to_lmp(&input, &output, &colors, (offset_x, offset_y), mode)?;
            println!("{}", output.display());
        }
        Commands::Info { input } => {
            let info = filemanager::describe_lmp(&input)?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Palettes { file } => {
            for line in filemanager::list_palettes(&file)? {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    lib_lmp::init_logging(log_level(cli.verbose));

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_png() {
        let cli = Cli::try_parse_from([
            "lmp-tool",
            "-vv",
            "from-png",
            "in.png",
            "--mode",
            "atkinson",
            "--offset-x",
            "-12",
            "--offset-y",
            "30",
            "--palette",
            "PLAYPAL.lmp",
            "--page",
            "3",
        ])
        .unwrap();

        assert_eq!(log_level(cli.verbose), LevelFilter::Debug);
        match cli.command {
            Commands::FromPng {
                input,
                output,
                mode,
                offset_x,
                offset_y,
                palette,
            } => {
                assert_eq!(input, PathBuf::from("in.png"));
                assert_eq!(output, None);
                assert_eq!(mode, ColorApproximationMode::Atkinson);
                assert_eq!((offset_x, offset_y), (-12, 30));
                assert_eq!(palette.palette, Some(PathBuf::from("PLAYPAL.lmp")));
                assert_eq!(palette.page, 3);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["lmp-tool", "from-png", "in.png"]).unwrap();
        assert_eq!(log_level(cli.verbose), LevelFilter::Warn);
        assert!(matches!(
            cli.command,
            Commands::FromPng {
                mode: ColorApproximationMode::NearestColor,
                offset_x: 0,
                offset_y: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        let result = Cli::try_parse_from(["lmp-tool", "from-png", "in.png", "--mode", "sierra"]);
        assert!(result.is_err());
    }
}
