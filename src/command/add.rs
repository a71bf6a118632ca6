use std::path::PathBuf;

use clap::Parser;

use super::cwd;
use porcelain_core::Porcelain;

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Files or directories to add; omit to add the whole work tree
    pub pathspec: Vec<String>,

    /// Remove paths that are gone from the work tree ("also remove")
    #[clap(short = 'A', long)]
    pub all: bool,
}

pub fn execute(args: AddArgs) -> anyhow::Result<()> {
    let work_dir = cwd();
    let repo = porcelain_core::repository::Repository::existing(&work_dir)?
        .ok_or_else(|| anyhow::anyhow!("fatal: not a repository (or any parent up to mount point)"))?;
    let porcelain = Porcelain::wrap(repo);

    if args.pathspec.is_empty() {
        porcelain.add(None, args.all)?;
    } else {
        for path in &args.pathspec {
            porcelain.add(Some(&PathBuf::from(path)), args.all)?;
        }
    }
    Ok(())
}
