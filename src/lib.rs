pub mod analysis;
pub mod cache;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod discover;
pub mod error;
pub mod extract;
pub mod ir;
pub mod literal;
pub mod path_de;
pub mod pipeline;
pub mod resolve;
pub mod syntax;

pub use analysis::Analysis;
pub use error::{Error, Result};
pub use pipeline::{Report, RunOptions, run};
