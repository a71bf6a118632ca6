use clap::Parser;

use super::cwd;
use porcelain_core::repository::Repository;
use porcelain_core::status::format_short;
use porcelain_core::Porcelain;

#[derive(Parser, Debug, Default)]
pub struct StatusArgs {
    /// Show unchanged entries as well
    #[clap(long)]
    pub all: bool,

    /// Log unexpected classification cases instead of failing
    #[clap(long)]
    pub lenient: bool,
}

pub fn execute(args: StatusArgs) -> anyhow::Result<()> {
    let work_dir = cwd();
    let repo = Repository::existing(&work_dir)?
        .ok_or_else(|| anyhow::anyhow!("fatal: not a repository (or any parent up to mount point)"))?;
    let porcelain = Porcelain::wrap(repo);
    let entries = porcelain.status(args.all, args.lenient)?;
    print!("{}", format_short(&entries));
    Ok(())
}
