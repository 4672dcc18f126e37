use clap::{Parser, Subcommand};

use self::match_string::MatchStringArg;

mod match_string;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Problem to evolve a solution for
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve a string toward a target string
    MatchString(#[clap(flatten)] MatchStringArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args
        .mode
        .unwrap_or(Mode::MatchString(MatchStringArg::default()))
    {
        Mode::MatchString(arg) => match_string::run(&arg)?,
    }
    Ok(())
}
