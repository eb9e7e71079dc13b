use clap::Parser;
use tradeboard::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
