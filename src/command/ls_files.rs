use clap::Parser;

use super::cwd;
use porcelain_core::repository::Repository;
use porcelain_core::Porcelain;

#[derive(Parser, Debug)]
pub struct LsFilesArgs {}

pub fn execute(_args: LsFilesArgs) -> anyhow::Result<()> {
    let work_dir = cwd();
    let repo = Repository::existing(&work_dir)?
        .ok_or_else(|| anyhow::anyhow!("fatal: not a repository (or any parent up to mount point)"))?;
    let porcelain = Porcelain::wrap(repo);
    for entry in porcelain.ls_files()? {
        println!("{}", entry.path);
    }
    Ok(())
}
