//! termprogress - progress bar runner
//!
//! Drives a simulated long-running operation through the termprogress
//! console API: installs the color-reset signal handlers, locks the
//! console, draws a progress bar step by step and releases the console.
//! Useful for trying terminal widths, colors and Ctrl+C behavior.
//!
//! # Quick Start
//!
//! ```text
//! termprogress                    # 50 steps, label from config.toml
//! termprogress -t Pulling -n 200  # custom label and step count
//! termprogress | cat              # plain "label N%" lines
//! ```

use std::env;
use std::fs::OpenOptions;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use termprogress::config::{self, Config};
use termprogress::{install_signal_handlers, render_progress, reset_color, set_color, ConsoleSession};

/// Command-line overrides
#[derive(Default)]
struct Options {
    /// Progress label
    text: Option<String>,
    /// Number of steps
    steps: Option<u32>,
    /// Delay between steps
    delay_ms: Option<u64>,
    /// Skip signal handler installation
    no_signals: bool,
    /// Write the effective config to ~/.termprogress/config.toml and exit
    init_config: bool,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("termprogress {}", VERSION);
}

fn print_help() {
    eprintln!("termprogress {} - progress bar runner", VERSION);
    eprintln!();
    eprintln!("Usage: termprogress [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -t, --text <TEXT>     Label shown before the bar");
    eprintln!("  -n, --steps <N>       Number of progress steps");
    eprintln!("  -d, --delay-ms <MS>   Delay between steps in milliseconds");
    eprintln!("      --no-signals      Do not install color-reset signal handlers");
    eprintln!("      --init-config     Write the effective configuration and exit");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.termprogress/config.toml");
    eprintln!("Log file:      ~/.termprogress/termprogress.log (RUST_LOG to filter)");
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut options = Options::default();
    let mut i = 1;

    fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
        args.get(i)
            .map(String::as_str)
            .ok_or_else(|| format!("Missing value for {}", flag))
    }

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            flag @ ("-t" | "--text") => {
                i += 1;
                options.text = Some(value(&args, i, flag)?.to_string());
            }
            flag @ ("-n" | "--steps") => {
                i += 1;
                let steps = value(&args, i, flag)?
                    .parse::<u32>()
                    .map_err(|e| format!("Invalid step count: {}", e))?;
                options.steps = Some(steps);
            }
            flag @ ("-d" | "--delay-ms") => {
                i += 1;
                let delay = value(&args, i, flag)?
                    .parse::<u64>()
                    .map_err(|e| format!("Invalid delay: {}", e))?;
                options.delay_ms = Some(delay);
            }
            "--no-signals" => {
                options.no_signals = true;
            }
            "--init-config" => {
                options.init_config = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(options)
}

/// Log to ~/.termprogress/termprogress.log; stdout belongs to the console
fn init_logging() {
    let log_path = config::data_dir()
        .map(|dir| dir.join("termprogress.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("termprogress.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("termprogress {} starting", VERSION);

    let mut config = Config::load();
    if let Some(text) = options.text {
        config.progress.label = text;
    }
    if let Some(steps) = options.steps {
        config.progress.steps = steps;
    }
    if let Some(delay_ms) = options.delay_ms {
        config.progress.delay_ms = delay_ms;
    }
    if options.no_signals {
        config.install_signal_handlers = false;
    }

    if options.init_config {
        let path = config.save()?;
        eprintln!("Wrote {}", path.display());
        return Ok(());
    }

    run(&config)
}

fn run(config: &Config) -> anyhow::Result<()> {
    if config.install_signal_handlers {
        install_signal_handlers()?;
    }

    let colors = &config.color;
    set_color(
        colors.foreground,
        colors.foreground_style()?,
        colors.background,
        colors.background_style()?,
    )
    .context("setting output color")?;

    let drawn = draw(config);
    reset_color(false)?;
    drawn?;
    info!("Done");
    Ok(())
}

fn draw(config: &Config) -> anyhow::Result<()> {
    let console = ConsoleSession::guard().context("locking console")?;
    info!(
        "Running {} steps of {}ms (tty: {}, {} columns)",
        config.progress.steps,
        config.progress.delay_ms,
        console.is_tty(),
        termprogress::columns()
    );

    let steps = u64::from(config.progress.steps.max(1));
    let delay = Duration::from_millis(config.progress.delay_ms);
    for step in 1..=steps {
        let percent = (step * 100 / steps) as u32;
        render_progress(Some(config.progress.label.as_str()), percent)?;
        thread::sleep(delay);
    }

    console.finish().context("releasing console")
}
