//! Command dispatch logic for appraise

use super::{EvaluateArgs, InitArgs, ValidateArgs, evaluate_artifacts, init_config, validate_config};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "appraise", author, version, long_about = None)]
#[command(about = "Score models, datasets and code repositories")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: AppraiseSubcommand,
}

#[derive(Subcommand, Debug)]
enum AppraiseSubcommand {
    /// Evaluate artifacts and print one record per artifact
    Evaluate(Box<EvaluateArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        AppraiseSubcommand::Evaluate(evaluate_args) => evaluate_artifacts(host, evaluate_args).await,
        AppraiseSubcommand::Init(init_args) => init_config(host, init_args),
        AppraiseSubcommand::Validate(validate_args) => validate_config(host, validate_args),
    }
}
