use clap::Parser;

use super::cwd;
use porcelain_core::repository::Repository;
use porcelain_core::Porcelain;

#[derive(Parser, Debug)]
pub struct FetchArgs {
    #[clap(default_value = "origin")]
    pub remote: String,
}

pub fn execute(args: FetchArgs) -> anyhow::Result<()> {
    let work_dir = cwd();
    let repo = Repository::existing(&work_dir)?
        .ok_or_else(|| anyhow::anyhow!("fatal: not a repository (or any parent up to mount point)"))?;
    let porcelain = Porcelain::wrap(repo);
    let result = porcelain.fetch(&args.remote)?;
    println!("From {}", args.remote);
    for (name, id) in &result.advertised_refs {
        println!("   {} -> {}/{}", &id.to_hex()[..7], args.remote, name);
    }
    Ok(())
}
