use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{
    self, country_codes::CountryCodesArgs, preview::PreviewArgs, run::RunArgs, schema::SchemaArgs,
};
use crate::config::CheckerConfig;

const DEFAULT_LOG_FILTER: &str = "eligibility_checker=info,eligibility_intake=info";
const VERBOSE_LOG_FILTER: &str =
    "eligibility_checker=debug,eligibility_intake=debug,eligibility_session=debug";

#[derive(Parser, Debug)]
#[command(
    name = "eligibility-checker",
    about = "Citizenship eligibility questionnaire",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[arg(long = "locale", value_name = "LOCALE", global = true)]
    locale: Option<String>,

    /// Config file to use instead of the per-user one
    #[arg(long = "config", value_name = "config.toml", global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer the questionnaire and submit it
    Run(RunArgs),
    /// Show the request a session document would produce
    Preview(PreviewArgs),
    /// List recognized calling codes
    CountryCodes(CountryCodesArgs),
    /// Print the JSON Schema of the session document
    Schema(SchemaArgs),
}

pub fn main() -> Result<()> {
    let argv: Vec<OsString> = std::env::args_os().collect();
    cmd::i18n::init(cmd::i18n::cli_locale_from_argv(&argv));

    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };
    cmd::i18n::init(cli.locale.clone());
    init_tracing(cli.verbose);
    tracing::debug!(locale = cmd::i18n::selected_locale(), "starting");

    match cli.command {
        Commands::CountryCodes(args) => cmd::country_codes::run(args),
        Commands::Schema(args) => cmd::schema::run(args),
        Commands::Run(args) => {
            let config = CheckerConfig::load(cli.config.as_deref())?;
            cmd::run::run(args, &config)
        }
        Commands::Preview(args) => {
            let config = CheckerConfig::load(cli.config.as_deref())?;
            cmd::preview::run(args, &config)
        }
    }
}

/// `RUST_LOG` wins over `--verbose`. Logs go to stderr so stdout stays parseable.
fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
