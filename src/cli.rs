//! Top-level CLI surface, clap-derive style like the teacher's `cli.rs`.

use clap::{Parser, Subcommand};

use crate::command;

#[derive(Parser, Debug)]
#[command(name = "porcelain", about = "A Git-compatible porcelain façade")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Init(command::init::InitArgs),
    Clone(command::clone::CloneArgs),
    Add(command::add::AddArgs),
    Status(command::status::StatusArgs),
    Commit(command::commit::CommitArgs),
    Checkout(command::checkout::CheckoutArgs),
    Push(command::push::PushArgs),
    Fetch(command::fetch::FetchArgs),
    Log(command::log::LogArgs),
    Whatchanged(command::log::WhatchangedArgs),
    #[command(name = "ls-files")]
    LsFiles(command::ls_files::LsFilesArgs),
}

pub fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init(args) => command::init::execute(args),
        Commands::Clone(args) => command::clone::execute(args),
        Commands::Add(args) => command::add::execute(args),
        Commands::Status(args) => command::status::execute(args),
        Commands::Commit(args) => command::commit::execute(args),
        Commands::Checkout(args) => command::checkout::execute(args),
        Commands::Push(args) => command::push::execute(args),
        Commands::Fetch(args) => command::fetch::execute(args),
        Commands::Log(args) => command::log::execute(args),
        Commands::Whatchanged(args) => command::log::execute_whatchanged(args),
        Commands::LsFiles(args) => command::ls_files::execute(args),
    }
}
