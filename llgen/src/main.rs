//! LL(1) parser generator.
//!
//! Reads a grammar description and emits Rust source text for a lexer, a
//! recursive-descent parser and an AST/visitor scaffolding that a
//! downstream implementer extends with semantic actions.
//!
//! Run `cargo doc --open` to view this documentation in a browser.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::all)]

use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::Colorize;
use log::info;

use grammar::Grammar;

mod emit;
mod error;
mod templates;

use error::Error;

/// Command line arguments accepted by the generator
#[derive(Clone, PartialEq, Eq, Parser)]
#[command(version, about)]
struct Args {
    /// File containing the grammar description
    grammar_file: PathBuf,
    /// Directory the generated sources are written to
    out_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    // this is the Rust equivalent of the try-catch pattern
    let run = || -> Result<(), Error> {
        info!("reading grammar from {}", args.grammar_file.display());
        let text = fs::read_to_string(&args.grammar_file)?;

        let mut grammar = Grammar::parse(&text)?;
        info!(
            "grammar parsed: {} tokens, {} nonterminals",
            grammar.token_patterns.len(),
            grammar.rules.len()
        );

        grammar.compute_first();
        info!("FIRST computed");
        grammar.compute_follow()?;
        info!("FOLLOW computed");
        grammar.check_ll1()?;

        emit::write_artifacts(&grammar, &args.out_dir)?;
        Ok(())
    };

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red(), e);
            ExitCode::FAILURE
        }
    }
}
