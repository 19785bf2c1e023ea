//! Command line: regenerate descriptor, types and client for the project in
//! the current directory.
use std::path::Path;

use clap::{ArgAction, Parser};
use colored::Colorize;

use crate::error::Result;
use crate::pipeline::{self, Report, RunOptions};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate an AWS SAM template, shared types and an Angular client from decorated handlers
#[derive(Parser, Debug)]
#[command(version)]
pub struct CommandLineInterface {
    /// more logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// analyse and report, write nothing
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self, cwd: &Path) -> Result<Report> {
        init_tracing(self.verbose);
        let report = pipeline::run(cwd, RunOptions { no_op: self.no_op })?;
        print_summary(&report);
        Ok(report)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn print_summary(report: &Report) {
    for function in &report.functions {
        match &function.route {
            Some((method, path)) => {
                println!("  {} {} {}", function.name.bold(), method.to_uppercase().cyan(), path)
            }
            None => println!("  {} {}", function.name.bold(), "(no http trigger)".dimmed()),
        }
    }
    let verb = if report.written { "wrote" } else { "would write" };
    println!(
        "{} {} function(s) from {} source file(s); {verb} {} file(s) to {}",
        "✔".green(),
        report.functions.len(),
        report.sources,
        report.files.len(),
        report.output.display()
    );
    if !report.diagnostics.is_empty() {
        println!("{} {} warning(s)", "!".yellow(), report.diagnostics.len());
    }
}
