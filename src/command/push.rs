use clap::Parser;

use super::cwd;
use porcelain_core::repository::Repository;
use porcelain_core::Porcelain;

#[derive(Parser, Debug)]
pub struct PushArgs {
    /// Remote name (as configured via `remote.<name>.url`)
    #[clap(default_value = "origin")]
    pub remote: String,

    /// Local branch to push
    #[clap(default_value = "master")]
    pub branch: String,
}

pub fn execute(args: PushArgs) -> anyhow::Result<()> {
    let work_dir = cwd();
    let repo = Repository::existing(&work_dir)?
        .ok_or_else(|| anyhow::anyhow!("fatal: not a repository (or any parent up to mount point)"))?;
    let porcelain = Porcelain::wrap(repo);
    let ok = porcelain.push(&args.remote, &args.branch)?;
    if ok {
        println!("Everything up-to-date");
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "! [rejected] {} -> {} (non-fast-forward)",
            args.branch,
            args.branch
        ))
    }
}
