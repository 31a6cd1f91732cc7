//! roofpack - place solar panels on rooftops in aerial images
//!
//! Usage:
//!   roofpack pack <images>... -o <dir>    Pack panels and write annotated images
//!   roofpack mask <image> -o <mask.png>   Write the rooftop mask only
//!   roofpack config                       Print the default configuration

mod cli;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use cli::{cmd_config, cmd_mask, cmd_pack, MaskArgs, PackArgs};

#[derive(Parser, Debug)]
#[command(name = "roofpack", version)]
#[command(about = "Segment rooftops and pack solar panel arrays onto them")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pack panels onto every input image
    Pack(PackArgs),
    /// Compute the rooftop mask of one image
    Mask(MaskArgs),
    /// Print the default configuration as YAML
    Config,
}

/// Default is `warn`; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.cmd {
        Command::Pack(args) => cmd_pack(&args),
        Command::Mask(args) => cmd_mask(&args),
        Command::Config => cmd_config(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
