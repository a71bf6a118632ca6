use clap::Parser;

use super::cwd;
use porcelain_core::repository::Repository;
use porcelain_core::Porcelain;

#[derive(Parser, Debug)]
pub struct CheckoutArgs {
    /// Branch name or commit id to switch to
    pub target: String,
}

pub fn execute(args: CheckoutArgs) -> anyhow::Result<()> {
    let work_dir = cwd();
    let repo = Repository::existing(&work_dir)?
        .ok_or_else(|| anyhow::anyhow!("fatal: not a repository (or any parent up to mount point)"))?;
    let porcelain = Porcelain::wrap(repo);
    porcelain.checkout(&args.target)?;
    println!("Switched to '{}'", args.target);
    Ok(())
}
