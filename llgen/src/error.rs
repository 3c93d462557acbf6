//! Error type of the generator driver.

use std::fmt::Display;
use std::io;

/// Errors that abort generation.
#[derive(Debug)]
pub enum Error {
    /// Grammar parsing or analysis failed
    Grammar(grammar::Error),
    /// Reading the description or writing an artifact failed
    Io(io::Error),
}

impl From<grammar::Error> for Error {
    fn from(value: grammar::Error) -> Self {
        Self::Grammar(value)
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Grammar(e) => e.fmt(f),
            Error::Io(e) => write!(f, "i/o error: {}", e),
        }
    }
}
