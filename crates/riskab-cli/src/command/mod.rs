use clap::{Parser, Subcommand};

use self::{
    generate_dataset::GenerateDatasetArg, profile::ProfileArg, run_tests::RunTestsArg,
};

mod generate_dataset;
mod profile;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run risk hypothesis tests on a dataset
    #[command(name = "test")]
    RunTests(#[clap(flatten)] RunTestsArg),
    /// Summarize missing values and numeric columns of a dataset
    Profile(#[clap(flatten)] ProfileArg),
    /// Generate a synthetic insurance dataset
    GenerateDataset(#[clap(flatten)] GenerateDatasetArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::RunTests(arg) => run_tests::run(&arg)?,
        Mode::Profile(arg) => profile::run(&arg)?,
        Mode::GenerateDataset(arg) => generate_dataset::run(&arg)?,
    }
    Ok(())
}
