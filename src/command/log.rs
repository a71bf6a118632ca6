use clap::Parser;

use super::cwd;
use porcelain_core::repository::Repository;
use porcelain_core::Porcelain;

#[derive(Parser, Debug)]
pub struct LogArgs {
    #[clap(long)]
    pub from: Option<String>,
    #[clap(long)]
    pub to: Option<String>,
    #[clap(short = 'n', long, default_value_t = -1)]
    pub max_count: i64,
}

pub type WhatchangedArgs = LogArgs;

pub fn execute(args: LogArgs) -> anyhow::Result<()> {
    let work_dir = cwd();
    let repo = Repository::existing(&work_dir)?
        .ok_or_else(|| anyhow::anyhow!("fatal: not a repository (or any parent up to mount point)"))?;
    let porcelain = Porcelain::wrap(repo);
    let ids = porcelain.rev_list(args.from.as_deref(), args.to.as_deref(), args.max_count)?;
    for id in ids {
        println!("{id}");
    }
    Ok(())
}

pub fn execute_whatchanged(args: WhatchangedArgs) -> anyhow::Result<()> {
    let work_dir = cwd();
    let repo = Repository::existing(&work_dir)?
        .ok_or_else(|| anyhow::anyhow!("fatal: not a repository (or any parent up to mount point)"))?;
    let porcelain = Porcelain::wrap(repo);
    let entries = porcelain.whatchanged(args.from.as_deref(), args.to.as_deref(), args.max_count)?;
    for entry in entries {
        println!("commit {}", entry.commit_hash);
        println!("Author: {} <{}>", entry.author.name, entry.author.email);
        println!("\n    {}\n", entry.subject);
        for file in entry.files.unwrap_or_default() {
            let code = match file.change {
                porcelain_core::history::ChangeKind::Added => 'A',
                porcelain_core::history::ChangeKind::Modified => 'M',
                porcelain_core::history::ChangeKind::Deleted => 'D',
            };
            println!(":{code}      {}", file.path);
        }
    }
    Ok(())
}
