//! Command-line host for the eager-initialization generator.
//!
//! # Responsibility
//! - Collect options, run one generation pass, and report the outcome.
//! - Print generation failures verbatim to stderr and exit non-zero.

use clap::Parser;
use eager_init_core::config::{OPTION_CLASS_NAME, OPTION_PACKAGE_NAME};
use eager_init_core::{
    default_log_level, init_logging, render_source, CodeWriter, EagerInitProcessor,
    FsCodeWriter, GeneratedUnit, GeneratorConfig, SourceTreeDiscovery, WriteError,
};
use log::info;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

/// Generate a priority-ordered eager initializer from `#[eager_initialize]` statics.
#[derive(Debug, Parser)]
#[command(name = "eager-init", version)]
struct Cli {
    /// Source root to scan, usually a crate's `src/` directory.
    #[arg(long, value_name = "DIR")]
    src: PathBuf,

    /// Output directory for the generated unit.
    #[arg(long, value_name = "DIR", required_unless_present_any = ["dry_run", "print_plan"])]
    out: Option<PathBuf>,

    /// Generator option as `key=value` (`packageName`, `className`).
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// JSON file with `packageName` / `className`; `-o` values override it.
    #[arg(long, value_name = "FILE")]
    options_file: Option<PathBuf>,

    /// Replaces the leading `crate` segment of discovered paths.
    #[arg(long, value_name = "PATH")]
    crate_prefix: Option<String>,

    /// Print the rendered source instead of writing it.
    #[arg(long)]
    dry_run: bool,

    /// Print the generated unit as JSON instead of writing it.
    #[arg(long, conflicts_with = "dry_run")]
    print_plan: bool,

    /// Log level (trace|debug|info|warn|error|off).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logs go to stderr otherwise.
    #[arg(long, value_name = "DIR")]
    log_dir: Option<String>,
}

/// Collects the unit instead of persisting it.
#[derive(Default)]
struct CaptureWriter {
    unit: Option<GeneratedUnit>,
}

impl CodeWriter for CaptureWriter {
    fn write_unit(&mut self, unit: GeneratedUnit) -> Result<(), WriteError> {
        self.unit = Some(unit);
        Ok(())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprint!("{message}");
            if !message.ends_with('\n') {
                eprintln!();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&level, cli.log_dir.as_deref())?;

    let config = load_config(&cli)?;
    let processor = EagerInitProcessor::new(config);
    let mut discovery = SourceTreeDiscovery::new(&cli.src);
    if let Some(prefix) = &cli.crate_prefix {
        discovery = discovery.with_crate_prefix(prefix.as_str());
    }

    if cli.dry_run || cli.print_plan {
        let mut capture = CaptureWriter::default();
        processor
            .process(&discovery, &mut capture)
            .map_err(|err| err.to_string())?;
        let Some(unit) = capture.unit else {
            return Err("generator produced no unit".to_string());
        };
        if cli.print_plan {
            let json = serde_json::to_string_pretty(&unit)
                .map_err(|err| format!("failed to serialize plan: {err}"))?;
            println!("{json}");
        } else {
            print!("{}", render_source(&unit));
        }
        return Ok(());
    }

    let Some(out_dir) = cli.out else {
        return Err("--out is required unless --dry-run or --print-plan is set".to_string());
    };
    let mut writer = FsCodeWriter::new(out_dir);
    processor
        .process(&discovery, &mut writer)
        .map_err(|err| err.to_string())?;
    for path in writer.written() {
        info!(
            "event=cli_output module=cli status=ok path={}",
            path.display()
        );
        println!("{}", path.display());
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<GeneratorConfig, String> {
    let mut options = BTreeMap::new();
    if let Some(path) = &cli.options_file {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
        let from_file: GeneratorConfig = serde_json::from_str(&raw)
            .map_err(|err| format!("invalid options file `{}`: {err}", path.display()))?;
        options.insert(OPTION_PACKAGE_NAME.to_string(), from_file.package_name);
        options.insert(OPTION_CLASS_NAME.to_string(), from_file.class_name);
    }
    for (key, value) in &cli.options {
        options.insert(key.clone(), value.clone());
    }
    GeneratorConfig::from_options(&options).map_err(|err| err.to_string())
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_option, Cli};
    use clap::Parser;

    #[test]
    fn parse_option_splits_on_first_equals() {
        assert_eq!(
            parse_option("packageName=app.boot").expect("valid option"),
            ("packageName".to_string(), "app.boot".to_string())
        );
        assert_eq!(
            parse_option("className=A=B").expect("value may contain ="),
            ("className".to_string(), "A=B".to_string())
        );
        assert!(parse_option("=value").is_err());
        assert!(parse_option("novalue").is_err());
    }

    #[test]
    fn out_is_optional_only_for_preview_modes() {
        assert!(Cli::try_parse_from(["eager-init", "--src", "src"]).is_err());
        assert!(Cli::try_parse_from(["eager-init", "--src", "src", "--dry-run"]).is_ok());
        let cli = Cli::try_parse_from([
            "eager-init",
            "--src",
            "src",
            "--out",
            "gen",
            "-o",
            "className=Boot",
        ])
        .expect("valid args");
        assert_eq!(cli.options, [("className".to_string(), "Boot".to_string())]);
    }
}
