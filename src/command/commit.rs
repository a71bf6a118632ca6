use clap::Parser;

use super::cwd;
use porcelain_core::repository::Repository;
use porcelain_core::Porcelain;

#[derive(Parser, Debug)]
pub struct CommitArgs {
    /// Commit message
    #[clap(short = 'm', long)]
    pub message: String,
}

pub fn execute(args: CommitArgs) -> anyhow::Result<()> {
    let work_dir = cwd();
    let repo = Repository::existing(&work_dir)?
        .ok_or_else(|| anyhow::anyhow!("fatal: not a repository (or any parent up to mount point)"))?;
    let porcelain = Porcelain::wrap(repo);
    let commit_id = porcelain.commit(None, None, &args.message)?;
    println!("[{}] {}", &commit_id.to_hex()[..7], args.message.lines().next().unwrap_or_default());
    Ok(())
}
