//! Binary entry point for piiscrub.
//!
//! This binary provides the CLI interface for PII detection and redaction.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Args, Parser, Subcommand};
use piiscrub::config::{LoggingSettings, PiiscrubConfig};
use piiscrub::observability::{self, LoggingConfig};
use piiscrub::security::PatternLibrary;
use piiscrub::services::{RedactionService, parse_mask_char};
use piiscrub::{Category, Error, RedactionRequest, RedactionResponse};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Piiscrub - PII detection and configurable redaction.
#[derive(Parser)]
#[command(name = "piiscrub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "PIISCRUB_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Redact PII from text.
    Redact {
        /// Text to redact; read from stdin when absent.
        text: Option<String>,

        /// Treat the input as a JSON request and print a JSON response.
        #[arg(long, conflicts_with = "json")]
        request: bool,

        /// Print the full response as JSON.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Detect PII and print the resolved detections as JSON.
    Detect {
        /// Text to scan; read from stdin when absent.
        text: Option<String>,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// List builtin patterns and domain vocabulary.
    Patterns {
        /// Only list patterns for this category.
        #[arg(long)]
        category: Option<String>,
    },

    /// Print the effective configuration.
    Config,
}

/// Policy overrides shared by `redact` and `detect`.
#[derive(Args, Default)]
struct PolicyArgs {
    /// Redaction strategy.
    #[arg(short, long)]
    strategy: Option<String>,

    /// Comma-separated categories to enable.
    #[arg(long, value_delimiter = ',')]
    categories: Option<Vec<String>>,

    /// Sensitivity level: low, medium, high, strict.
    #[arg(long)]
    sensitivity: Option<String>,

    /// Comma-separated whitelist terms.
    #[arg(short, long, value_delimiter = ',')]
    whitelist: Option<Vec<String>>,

    /// Keep detections that overlap audio-domain vocabulary.
    #[arg(long)]
    preserve_domain_terms: bool,

    /// Mask character.
    #[arg(long)]
    mask_char: Option<String>,

    /// Characters kept at each end by `partial`.
    #[arg(long)]
    preserve_chars: Option<usize>,

    /// Fraction masked by `fuzzy`.
    #[arg(long)]
    fuzziness: Option<f64>,

    /// Literal replacement for `replace`.
    #[arg(long)]
    replacement_text: Option<String>,
}

/// Main entry point.
fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(LoggingConfig::from_settings(
        &config.logging,
        cli.verbose,
    )) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: PiiscrubConfig) -> piiscrub::Result<()> {
    match command {
        Commands::Redact {
            text,
            request,
            json,
            policy,
        } => {
            let input = read_input(text)?;
            if request {
                cmd_redact_request(&input)
            } else {
                cmd_redact(&input, apply_policy(config, policy)?, json)
            }
        },
        Commands::Detect { text, policy } => {
            cmd_detect(&read_input(text)?, apply_policy(config, policy)?)
        },
        Commands::Patterns { category } => cmd_patterns(category.as_deref()),
        Commands::Config => {
            cmd_config(&config);
            Ok(())
        },
    }
}

/// Loads configuration and applies environment overrides.
fn load_config(path: Option<&Path>) -> piiscrub::Result<PiiscrubConfig> {
    let mut config = match path {
        Some(path) => PiiscrubConfig::load_from_file(path)?,
        None => PiiscrubConfig::load_default()?,
    };
    config.apply_env_overrides()?;
    Ok(config)
}

/// Applies command-line policy flags on top of the loaded configuration.
fn apply_policy(mut config: PiiscrubConfig, args: PolicyArgs) -> piiscrub::Result<PiiscrubConfig> {
    if let Some(strategy) = args.strategy {
        config.redaction.strategy = strategy.parse()?;
    }
    if let Some(names) = args.categories {
        config.detection.categories = names
            .iter()
            .map(|name| name.parse::<Category>())
            .collect::<piiscrub::Result<_>>()?;
    }
    if let Some(sensitivity) = args.sensitivity {
        config.detection.sensitivity = sensitivity.parse()?;
    }
    if let Some(whitelist) = args.whitelist {
        config.detection.whitelist = whitelist;
    }
    if args.preserve_domain_terms {
        config.detection.preserve_domain_terms = true;
    }
    if let Some(mask) = args.mask_char {
        config.redaction.mask_char = Some(parse_mask_char(&mask)?);
    }
    if args.preserve_chars.is_some() {
        config.redaction.preserve_chars = args.preserve_chars;
    }
    if args.fuzziness.is_some() {
        config.redaction.fuzziness = args.fuzziness;
    }
    if args.replacement_text.is_some() {
        config.redaction.replacement_text = args.replacement_text;
    }
    Ok(config)
}

/// Returns the positional text or reads stdin.
fn read_input(text: Option<String>) -> piiscrub::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| Error::InvalidInput(format!("failed to read stdin: {e}")))?;
    Ok(buffer)
}

fn to_json<T: serde::Serialize>(value: &T) -> piiscrub::Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::OperationFailed {
        operation: "serialize_output".to_string(),
        cause: e.to_string(),
    })
}

/// Redact command.
fn cmd_redact(text: &str, config: PiiscrubConfig, json: bool) -> piiscrub::Result<()> {
    let context = config.to_redaction_context()?;
    let outcome = RedactionService::new().run(text, &config.detection, &context)?;

    if json {
        println!("{}", to_json(&RedactionResponse::from(outcome))?);
    } else {
        for rejected in &outcome.rejected {
            eprintln!("Skipped pattern '{}': {}", rejected.name, rejected.reason);
        }
        print!("{}", outcome.result.redacted_text);
        if !outcome.result.redacted_text.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

/// Redact command with a JSON request body.
fn cmd_redact_request(input: &str) -> piiscrub::Result<()> {
    let request: RedactionRequest = serde_json::from_str(input)
        .map_err(|e| Error::InvalidInput(format!("malformed request: {e}")))?;
    let response = RedactionService::new().detect_and_redact(&request)?;
    println!("{}", to_json(&response)?);
    Ok(())
}

/// Detect command.
fn cmd_detect(text: &str, config: PiiscrubConfig) -> piiscrub::Result<()> {
    let detections = RedactionService::new().detect(text, &config.detection);
    println!("{}", to_json(&detections)?);
    Ok(())
}

/// Patterns command.
fn cmd_patterns(category: Option<&str>) -> piiscrub::Result<()> {
    let filter = category.map(str::parse::<Category>).transpose()?;
    let library = PatternLibrary::shared();

    println!("{:<14} {:<24} {:>10}", "CATEGORY", "PATTERN", "CONFIDENCE");
    for pattern in library
        .patterns()
        .iter()
        .filter(|p| filter.is_none_or(|c| p.category == c))
    {
        println!(
            "{:<14} {:<24} {:>10.2}",
            pattern.category.as_str(),
            pattern.name,
            pattern.confidence
        );
    }

    if filter.is_none() {
        println!();
        println!("Domain vocabulary ({} terms):", library.vocabulary().len());
        for term in library.vocabulary() {
            println!("  {term}");
        }
    }
    Ok(())
}

/// Config command.
fn cmd_config(config: &PiiscrubConfig) {
    let detection = &config.detection;
    let categories: Vec<&str> = detection.categories.iter().map(Category::as_str).collect();

    println!("Configuration");
    println!(
        "  Default file:          {}",
        PiiscrubConfig::default_path()
            .map_or_else(|| "<none>".to_string(), |p| p.display().to_string())
    );
    println!();
    println!("[detection]");
    println!("  categories:            {}", categories.join(", "));
    println!("  sensitivity:           {}", detection.sensitivity);
    println!("  whitelist:             {} term(s)", detection.whitelist.len());
    println!("  preserve_domain_terms: {}", detection.preserve_domain_terms);
    println!("  custom_confidence:     {:.2}", detection.custom_confidence);
    for pattern in &detection.custom_patterns {
        println!("  custom pattern:        {} = {}", pattern.name, pattern.pattern);
    }
    println!();
    println!("[redaction]");
    println!("  strategy:              {}", config.redaction.strategy);
    match config.to_redaction_context() {
        Ok(context) => {
            println!("  mask_char:             {}", context.mask_char);
            println!(
                "  preserve_chars:        {}/{}",
                context.preserve_start, context.preserve_end
            );
            println!("  fuzziness:             {:.2}", context.fuzziness);
        },
        Err(e) => println!("  (invalid: {e})"),
    }
    println!();
    print_logging(&config.logging);
}

fn print_logging(logging: &LoggingSettings) {
    println!("[logging]");
    println!(
        "  format:                {}",
        logging.format.as_deref().unwrap_or("pretty")
    );
    println!(
        "  level:                 {}",
        logging.level.as_deref().unwrap_or("warn")
    );
    println!(
        "  file:                  {}",
        logging
            .file
            .as_ref()
            .map_or_else(|| "<stderr>".to_string(), |p| p.display().to_string())
    );
}
