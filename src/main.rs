//! repo-docs: generate and incrementally update repository documentation
//! from call-graph context.

use anyhow::Result;

fn main() -> Result<()> {
    repo_docs::cli::run()
}
