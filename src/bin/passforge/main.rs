use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod config;
mod pw;
mod select;
mod table;

#[derive(Parser)]
#[command(version, about = "Generate passwords from selectable character classes")]
enum Args {
    /// Generate one or more passwords.
    #[command(alias = "gen")]
    Generate(GenerateArgs),
    /// Choose the length and character classes through prompts, then generate a password.
    Interactive {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the built-in character classes.
    Classes,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Password length; defaults to the configured length.
    #[arg(short, long)]
    length: Option<usize>,
    /// Include uppercase letters.
    #[arg(long)]
    upper: bool,
    /// Include lowercase letters.
    #[arg(long)]
    lower: bool,
    /// Include digits.
    #[arg(long)]
    digits: bool,
    /// Include symbols.
    #[arg(long)]
    symbols: bool,
    /// How many passwords to generate.
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,
    /// Copy the password to the clipboard instead of printing it.
    #[arg(long, conflicts_with_all = ["count", "json"])]
    copy: bool,
    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn run() -> Result<(), ProgError> {
    let args = Args::parse();

    match args {
        Args::Generate(args) => pw::generate(args)?,
        Args::Interactive { config } => pw::interactive(config)?,
        Args::Classes => table::list_classes()?,
    }

    Ok(())
}

fn main() {
    init_logging();
    match run() {
        Ok(()) => (),
        Err(err) => {
            // `:#` keeps the whole anyhow context chain, down to the root cause.
            eprintln!("{err:#}");
            process::exit(1);
        }
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("PASSFORGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, thiserror::Error)]
enum ProgError {
    #[error(
        "A length of {length} is outside the configured range of {min} to {max} characters."
    )]
    LengthOutOfPolicy {
        length: usize,
        min: usize,
        max: usize,
    },
    #[error("Selection cancelled; exiting.")]
    SelectionCancelled,
    #[error("Failed to load configuration from {0}: {1:#}")]
    Config(PathBuf, #[source] anyhow::Error),
    #[error("Could not generate a password: {0}")]
    Generation(passforge::GenerationError),
    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for ProgError {
    fn from(err: anyhow::Error) -> ProgError {
        ProgError::Other(err)
    }
}

impl From<passforge::GenerationError> for ProgError {
    fn from(err: passforge::GenerationError) -> ProgError {
        ProgError::Generation(err)
    }
}

impl From<passforge::EntropyError> for ProgError {
    fn from(err: passforge::EntropyError) -> ProgError {
        ProgError::Generation(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_conflicts_with_count_and_json() {
        assert!(Args::try_parse_from(["passforge", "generate", "--copy"]).is_ok());
        assert!(Args::try_parse_from(["passforge", "generate", "--copy", "--json"]).is_err());
        assert!(Args::try_parse_from(["passforge", "generate", "--copy", "-n", "3"]).is_err());
        assert!(Args::try_parse_from(["passforge", "generate", "--json", "-n", "3"]).is_ok());
    }

    #[test]
    fn reported_errors_keep_the_root_cause() {
        let err = ProgError::from(
            anyhow::anyhow!("xsel: command not found").context("failed to start \"xsel\""),
        );
        let message = format!("{err:#}");
        assert!(message.contains("failed to start"), "{message}");
        assert!(message.contains("xsel: command not found"), "{message}");
    }
}
