use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;

use samgen::cli::CommandLineInterface;

fn try_main() -> anyhow::Result<()> {
    let command_line_interface = CommandLineInterface::load();
    let cwd = std::env::current_dir().context("cannot determine the working directory")?;
    command_line_interface.run(&cwd).context("generation failed")?;
    Ok(())
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
