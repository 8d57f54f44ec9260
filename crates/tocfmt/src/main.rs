use crate::prelude::*;
use clap::Parser;

mod document;
mod error;
mod format;
mod inspect;
mod layout;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Reformat table of contents and abbreviation lists in Word documents"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "TOCFMT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Rewrite TOC and abbreviation entries with dot leaders and right-aligned values
    Format(crate::format::FormatOptions),

    /// Show how each paragraph would be classified, without writing anything
    Inspect(crate::inspect::InspectOptions),
}

fn main() -> Result<()> {
    let app = App::parse();

    init_logging(app.global.verbose);
    color_eyre::install()?;

    match app.command {
        SubCommands::Format(options) => crate::format::run(options),
        SubCommands::Inspect(options) => crate::inspect::run(options),
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}

/// `RUST_LOG` wins; otherwise `--verbose` selects `debug` over `warn`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
