use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};

pub mod formatters;
pub mod runner;

#[derive(Parser, Debug)]
#[command(name = "harvest")]
#[command(
    version,
    about = "Tax-loss harvesting planner for unrealized gains/losses exports"
)]
#[command(
    long_about = "Reads a brokerage unrealized gains/losses CSV and lists the positions to sell, worst percentage loss first, until the realized loss would turn into a gain."
)]
#[command(group(ArgGroup::new("input").required(true).args(["unrealized", "file"])))]
pub struct Cli {
    /// Unrealized gains/losses CSV export
    pub unrealized: Option<PathBuf>,

    /// Unrealized gains/losses CSV export (alternative to the positional argument)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Also write the sorted holdings table as CSV (default: stocks.csv)
    #[arg(short, long, value_name = "PATH", num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,

    /// Config file (default: <config dir>/harvest/config.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json")]
    pub json: bool,
}

impl Cli {
    /// The input file, from whichever of the two arguments was given
    pub fn input(&self) -> Option<&Path> {
        self.unrealized.as_deref().or(self.file.as_deref())
    }
}
