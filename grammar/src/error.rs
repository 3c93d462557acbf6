//! Error types for grammar parsing and analysis.

use std::fmt::Display;

/// Errors raised while parsing or analyzing a grammar description.
///
/// All of these are fatal; the generator reports them and aborts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A fragment of the description that does not match the expected shape
    MalformedInput(String),
    /// A terminal declared more than once
    DuplicateToken(String),
    /// `EPS` or `EOF` used where the reserved names are forbidden
    ReservedName(String),
    /// An alternative with no symbols
    EmptyAlternative(String),
    /// A production of the form `a : a`
    SelfProduction(String),
    /// A right-hand-side nonterminal with no rules
    UndefinedNonterminal(String),
    /// FOLLOW computation found no `start` nonterminal
    MissingStart,
    /// Analysis phases invoked out of order
    AnalysisOrder(&'static str),
    /// Two alternatives of a nonterminal with intersecting FIRST sets
    FirstFirstConflict {
        /// The nonterminal owning the alternatives
        nonterminal: String,
        /// A token common to both FIRST sets
        token: String,
        /// The first alternative of the pair
        left: String,
        /// The second alternative of the pair
        right: String,
    },
    /// A nullable alternative clashing with the nonterminal's FOLLOW set
    FirstFollowConflict {
        /// The nonterminal owning the alternatives
        nonterminal: String,
        /// A token in both the FOLLOW set and the other FIRST set
        token: String,
        /// The nullable alternative
        left: String,
        /// The alternative whose FIRST set clashes
        right: String,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MalformedInput(what) => write!(f, "malformed input: {}", what),
            Error::DuplicateToken(name) => write!(f, "token `{}` is declared twice", name),
            Error::ReservedName(name) => {
                write!(f, "reserved name `{}` must not be used here", name)
            }
            Error::EmptyAlternative(lhs) => {
                write!(f, "empty alternative in a rule for `{}`", lhs)
            }
            Error::SelfProduction(lhs) => {
                write!(f, "productions of the form `{} : {}` are prohibited", lhs, lhs)
            }
            Error::UndefinedNonterminal(name) => {
                write!(f, "nonterminal `{}` has no rules", name)
            }
            Error::MissingStart => {
                write!(f, "no rule for the starting nonterminal `start`")
            }
            Error::AnalysisOrder(what) => write!(f, "{}", what),
            Error::FirstFirstConflict {
                nonterminal,
                token,
                left,
                right,
            } => write!(
                f,
                "`{}` is not LL(1): FIRST/FIRST conflict on `{}` between `{}` and `{}`",
                nonterminal, token, left, right
            ),
            Error::FirstFollowConflict {
                nonterminal,
                token,
                left,
                right,
            } => write!(
                f,
                "`{}` is not LL(1): FIRST/FOLLOW conflict on `{}` between `{}` and `{}`",
                nonterminal, token, left, right
            ),
        }
    }
}
