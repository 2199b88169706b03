use clap::Parser;

#[derive(Debug, Parser)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Path of the LED roll configuration file; overrides the built-in
    /// search locations
    #[clap(long, short)]
    pub config: Option<camino::Utf8PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Drive the clock and the LED strip until terminated
    Run,

    /// Load and validate the configuration, then exit
    VerifyConfig,
}
