//! Command-line front end for the H8/300H-tiny core: loads a ROM image,
//! builds one of the three board presets, and steps it.

use std::fs;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use h8300h::devices::AdcStrategy;
use h8300h::{System, SystemId};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SystemArg {
    Ntr027,
    Ntr031,
    Ntr032,
}

impl From<SystemArg> for SystemId {
    fn from(arg: SystemArg) -> Self {
        match arg {
            SystemArg::Ntr027 => SystemId::Ntr027,
            SystemArg::Ntr031 => SystemId::Ntr031,
            SystemArg::Ntr032 => SystemId::Ntr032,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AdcStrategyArg {
    Fuzz,
    HostSet,
}

impl From<AdcStrategyArg> for AdcStrategy {
    fn from(arg: AdcStrategyArg) -> Self {
        match arg {
            AdcStrategyArg::Fuzz => AdcStrategy::Fuzz,
            AdcStrategyArg::HostSet => AdcStrategy::HostSet,
        }
    }
}

/// Run a ROM image against the H8/300H-tiny core.
#[derive(Parser, Debug)]
#[clap(name = "h8300h-emu", version)]
struct Args {
    /// Path to the ROM image to load.
    #[clap(long)]
    rom: String,

    /// Board preset to emulate.
    #[clap(long, value_enum, default_value = "ntr027")]
    system: SystemArg,

    /// Number of instructions to execute before exiting; runs until the
    /// CPU sleeps or errors if omitted.
    #[clap(long)]
    steps: Option<usize>,

    /// A/D converter channel behaviour for channels with no dedicated
    /// device attached.
    #[clap(long, value_enum, default_value = "fuzz")]
    adc_strategy: AdcStrategyArg,

    /// Increase log verbosity (-v, -vv).
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all logging below error level.
    #[clap(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.quiet {
        log::LevelFilter::Error
    } else {
        match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new().filter_level(level).init();

    let rom = match fs::read(&args.rom) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::error!("failed to read ROM image {:?}: {}", args.rom, err);
            return ExitCode::FAILURE;
        }
    };

    let mut system = System::system_init(args.system.into(), args.adc_strategy.into());
    system.load_rom(&rom);
    system.init();

    if !system.checksum_recognised() {
        log::warn!(
            "ROM checksum {:#010x} is not in {}'s accepted list",
            system.rom_checksum(),
            system.id().title()
        );
    }

    match args.steps {
        Some(count) => system.run(count),
        None => loop {
            if system.try_step().is_err() {
                break;
            }
        },
    }

    ExitCode::SUCCESS
}
