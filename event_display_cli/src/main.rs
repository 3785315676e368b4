//! # event_display_cli
//!
//! Part of the event_display crate family.
//!
//! Reconstructs a single FERS event from an HDF5 event store and writes the noise corrected grid
//! for plotting.
//!
//! ## Use
//!
//! ```bash
//! event_display_cli <event-store-path> <event-number>
//! ```
//!
//! Optional flags:
//!
//! - `-c/--config <path>`: YAML configuration (see `libevent_display` for the format)
//! - `-n/--noise <path>`: noise calibration file, overrides the configuration
//! - `--no-noise`: do not subtract any baseline
//! - `-o/--output <dir>`: output directory, overrides the configuration
//!
//! `event_display_cli new -p <path>` writes a template configuration file.
//!
//! A log of the run is written to `event_display.log` in the working directory.
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use libevent_display::config::Config;
use libevent_display::process::display_event;

/// Send everything logged by the library to a file
fn init_logging() -> Result<(), spdlog::Error> {
    let file_sink = Arc::new(
        spdlog::sink::FileSink::builder()
            .path(PathBuf::from("./event_display.log"))
            .formatter(spdlog::formatter::PatternFormatter::new(
                spdlog::formatter::pattern!(
                    "[{date_short} {time_short}] - [{^{level}}] - {payload}{eol}"
                ),
            ))
            .truncate(true)
            .build()?,
    );
    let logger = Arc::new(
        spdlog::Logger::builder()
            .flush_level_filter(spdlog::LevelFilter::All)
            .sink(file_sink)
            .build()?,
    );
    spdlog::set_default_logger(logger);
    Ok(())
}

fn build_cli() -> Command {
    Command::new("event_display_cli")
        .about("Reconstruct a single FERS event as a noise corrected 2-D grid")
        .arg_required_else_help(true)
        .args_conflicts_with_subcommands(true)
        .subcommand_negates_reqs(true)
        .subcommand(
            Command::new("new")
                .about("Make a template configuration yaml file")
                .arg(
                    Arg::new("path")
                        .short('p')
                        .long("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the file"),
                ),
        )
        .arg(
            Arg::new("store")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to the HDF5 event store"),
        )
        .arg(
            Arg::new("event")
                .required(true)
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i64))
                .help("Event number to display"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("Path to a configuration yaml file"),
        )
        .arg(
            Arg::new("noise")
                .short('n')
                .long("noise")
                .value_parser(value_parser!(PathBuf))
                .help("Path to the noise calibration file (default: fers_noises.json)"),
        )
        .arg(
            Arg::new("no-noise")
                .long("no-noise")
                .action(ArgAction::SetTrue)
                .conflicts_with("noise")
                .help("Do not subtract the noise baselines"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(value_parser!(PathBuf))
                .help("Directory to write the event display to"),
        )
}

/// Load the config and apply the overrides given on the command line
fn load_config(matches: &ArgMatches) -> Result<Config, libevent_display::error::ConfigError> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            spdlog::info!("Loading config from {}...", path.to_string_lossy());
            Config::read_config_file(path)?
        }
        None => Config::default(),
    };
    if let Some(noise) = matches.get_one::<PathBuf>("noise") {
        config.noise_path = Some(noise.clone());
    } else if matches.get_flag("no-noise") {
        config.noise_path = None;
    }
    if let Some(output) = matches.get_one::<PathBuf>("output") {
        config.output_path = output.clone();
    }
    Ok(config)
}

fn main() -> ExitCode {
    let matches = build_cli().get_matches();

    if let Err(e) = init_logging() {
        eprintln!("Warning: could not create log file: {e}");
    }

    if let Some(("new", sub)) = matches.subcommand() {
        let path = sub.get_one::<PathBuf>("path").expect("path is required");
        return match Config::default().write_config_file(path) {
            Ok(()) => {
                println!("Made a template config at {}", path.to_string_lossy());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let store_path = matches.get_one::<PathBuf>("store").expect("store is required");
    let event = *matches.get_one::<i64>("event").expect("event is required");

    let config = match load_config(&matches) {
        Ok(c) => c,
        Err(e) => {
            spdlog::error!("{e}");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    spdlog::info!("Config successfully loaded.");
    spdlog::info!("Event store: {}", store_path.to_string_lossy());
    spdlog::info!("Event: {event}");
    match &config.noise_path {
        Some(p) => spdlog::info!("Noise file: {}", p.to_string_lossy()),
        None => spdlog::info!("Noise file: disabled"),
    }
    spdlog::info!("Output path: {}", config.output_path.to_string_lossy());

    match display_event(&config, store_path, event) {
        Ok(path) => {
            spdlog::info!("Done.");
            println!("Event {event} written to {}", path.to_string_lossy());
            ExitCode::SUCCESS
        }
        Err(e) => {
            spdlog::error!("Event display failed with error: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_two_positionals_required() {
        assert!(build_cli()
            .try_get_matches_from(["event_display_cli", "store.h5"])
            .is_err());
        assert!(build_cli()
            .try_get_matches_from(["event_display_cli", "store.h5", "4", "extra"])
            .is_err());
        assert!(build_cli()
            .try_get_matches_from(["event_display_cli", "store.h5", "four"])
            .is_err());
        let matches = build_cli()
            .try_get_matches_from(["event_display_cli", "store.h5", "4", "-n", "noise.json"])
            .expect("valid arguments");
        assert_eq!(matches.get_one::<i64>("event"), Some(&4));
        let config = load_config(&matches).expect("default config");
        assert_eq!(config.noise_path, Some(PathBuf::from("noise.json")));
    }

    #[test]
    fn test_noise_defaults() {
        let matches = build_cli()
            .try_get_matches_from(["event_display_cli", "store.h5", "4"])
            .expect("valid arguments");
        let config = load_config(&matches).expect("default config");
        assert_eq!(config.noise_path, Some(PathBuf::from("fers_noises.json")));

        let matches = build_cli()
            .try_get_matches_from(["event_display_cli", "store.h5", "4", "--no-noise"])
            .expect("valid arguments");
        let config = load_config(&matches).expect("default config");
        assert_eq!(config.noise_path, None);

        assert!(build_cli()
            .try_get_matches_from([
                "event_display_cli",
                "store.h5",
                "4",
                "-n",
                "noise.json",
                "--no-noise"
            ])
            .is_err());
    }

    #[test]
    fn test_new_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["event_display_cli", "new", "-p", "config.yml"])
            .expect("valid arguments");
        assert!(matches!(matches.subcommand(), Some(("new", _))));
    }
}
