use clap::Parser;

use super::cwd;
use porcelain_core::Porcelain;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    pub directory: Option<String>,
}

pub fn execute(args: InitArgs) -> anyhow::Result<()> {
    let work_dir = match args.directory {
        Some(d) => cwd().join(d),
        None => cwd(),
    };
    std::fs::create_dir_all(&work_dir)?;
    Porcelain::init(&work_dir)?;
    println!(
        "Initialized empty repository in {}",
        work_dir.join(".git").display()
    );
    Ok(())
}
