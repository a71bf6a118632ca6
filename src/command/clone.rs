use clap::Parser;

use super::cwd;
use porcelain_core::Porcelain;

#[derive(Parser, Debug)]
pub struct CloneArgs {
    /// The remote repository location to clone from (a `file://` URI)
    pub remote_repo: String,

    /// The local path to clone the repository to
    pub local_path: Option<String>,

    /// The branch to clone
    #[clap(short = 'b', long)]
    pub branch: Option<String>,
}

pub fn execute(args: CloneArgs) -> anyhow::Result<()> {
    let local_path = args.local_path.unwrap_or_else(|| {
        args.remote_repo
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("repository")
            .to_string()
    });
    let work_dir = cwd().join(&local_path);
    std::fs::create_dir_all(&work_dir)?;
    println!("Cloning into '{local_path}'...");

    Porcelain::clone(&work_dir, "origin", &args.remote_repo, args.branch.as_deref())?;
    Ok(())
}
