//! Update command implementation

use anyhow::Result;
use clap::Args;

use super::generate::{execute, RunArgs};

#[derive(Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Git revision the existing documentation was generated from
    #[arg(short, long, value_name = "REF", default_value = "HEAD")]
    pub base: String,
}

pub fn run(args: UpdateArgs, verbose: bool) -> Result<()> {
    execute(&args.run, verbose, Some(&args.base))
}
