//! Grammar descriptions: symbols, the grammar object, and the two-section
//! description format.
//!
//! Also validates whether the parsed grammar is well-defined.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Display;

use crate::error::Error;

/// The reserved empty-string symbol.
pub const EPS: &str = "EPS";
/// The reserved end-of-input sentinel.
pub const EOF: &str = "EOF";
/// The reserved starting nonterminal.
pub const START: &str = "start";

/// The literal separator between a token name and its pattern.
const TOKEN_SEPARATOR: &str = "    ";

/// Whether `s` matches `[A-Z][A-Z0-9_]*`.
pub fn is_terminal_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Whether `s` matches `[a-z][a-z0-9_]*`.
pub fn is_nonterminal_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// A single symbol on the right-hand side of a production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A terminal token name, matched by the generated lexer
    Terminal(String),
    /// A nonterminal, expanded through one of its alternatives
    Nonterminal(String),
    /// A `$name` semantic-action marker, stored without the sigil
    Translation(String),
    /// The empty string
    Eps,
}

impl Symbol {
    /// Classify a whitespace-free fragment of an alternative.
    ///
    /// Translation symbols contribute nothing to FIRST/FOLLOW and consume
    /// no input; they are kept in the alternative only to mark where the
    /// generated parser fires visitor callbacks.
    pub fn parse(text: &str) -> Option<Symbol> {
        if text == EPS {
            Some(Symbol::Eps)
        } else if is_terminal_name(text) {
            Some(Symbol::Terminal(text.to_string()))
        } else if is_nonterminal_name(text) {
            Some(Symbol::Nonterminal(text.to_string()))
        } else if let Some(name) = text.strip_prefix('$') {
            is_nonterminal_name(name).then(|| Symbol::Translation(name.to_string()))
        } else {
            None
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Terminal(name) | Symbol::Nonterminal(name) => write!(f, "{}", name),
            Symbol::Translation(name) => write!(f, "${}", name),
            Symbol::Eps => write!(f, "{}", EPS),
        }
    }
}

/// One alternative of a production rule.
pub type Alternative = Vec<Symbol>;

/// Render an alternative the way it appears in a grammar description.
pub fn format_alternative(alternative: &[Symbol]) -> String {
    alternative
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A context-free grammar with embedded translation symbols, together with
/// the FIRST/FOLLOW closures filled in by the analyzer.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    /// Declared terminals and their regex sources, in declaration order.
    /// The order breaks longest-match ties in the generated lexer.
    pub token_patterns: Vec<(String, String)>,
    /// The alternatives of every nonterminal.
    pub rules: BTreeMap<String, Vec<Alternative>>,
    /// FIRST sets, keyed by a symbol name or a space-joined sequence.
    /// Sequence keys are a memoization artifact of the analyzer.
    pub first: HashMap<String, HashSet<String>>,
    /// FOLLOW sets of nonterminals. May contain `EOF`, never `EPS`.
    pub follow: HashMap<String, HashSet<String>>,
}

impl Grammar {
    /// Parse a grammar description.
    ///
    /// The description has a token section and a rules section separated by
    /// a line containing exactly `%%`. Token lines have the shape
    /// `NAME    REGEX` (four-space separator); rule groups have the shape
    /// `lhs : alt | alt | … ;`.
    ///
    /// # Errors
    ///
    /// Fails on any shape violation: a missing or repeated separator, a
    /// malformed token line or rule group, reserved-name misuse, an empty
    /// alternative, a direct self-production, or an undefined nonterminal.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut grammar = Grammar::default();

        let mut rule_lines = Vec::new();
        let mut seen_separator = false;
        for line in text.lines() {
            if line.trim() == "%%" {
                if seen_separator {
                    return Err(Error::MalformedInput(
                        "more than one `%%` separator".to_string(),
                    ));
                }
                seen_separator = true;
            } else if seen_separator {
                rule_lines.push(line);
            } else if !line.trim().is_empty() {
                grammar.parse_token_line(line)?;
            }
        }
        if !seen_separator {
            return Err(Error::MalformedInput(
                "missing `%%` separator between tokens and rules".to_string(),
            ));
        }

        grammar.parse_rules(&rule_lines.join("\n"))?;
        grammar.validate()?;

        Ok(grammar)
    }

    /// Parse one `NAME    REGEX` line of the token section.
    fn parse_token_line(&mut self, line: &str) -> Result<(), Error> {
        let fragments: Vec<&str> = line
            .split(TOKEN_SEPARATOR)
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .collect();
        if fragments.len() != 2 {
            return Err(Error::MalformedInput(format!(
                "expected `NAME    REGEX`, got `{}`",
                line.trim()
            )));
        }
        let (name, pattern) = (fragments[0], fragments[1]);

        if !is_terminal_name(name) {
            return Err(Error::MalformedInput(format!(
                "token name doesn't match the format: `{}`",
                name
            )));
        }
        if name == EPS || name == EOF {
            return Err(Error::ReservedName(name.to_string()));
        }
        if self.token_patterns.iter().any(|(declared, _)| declared == name) {
            return Err(Error::DuplicateToken(name.to_string()));
        }

        self.token_patterns
            .push((name.to_string(), pattern.to_string()));
        Ok(())
    }

    /// Parse the rules section, a sequence of `lhs : alt | … ;` groups.
    ///
    /// A repeated `lhs` appends alternatives to the earlier group.
    fn parse_rules(&mut self, text: &str) -> Result<(), Error> {
        for group in text.split(';') {
            if group.trim().is_empty() {
                continue;
            }
            let fragments: Vec<&str> = group.split(':').collect();
            if fragments.len() != 2 {
                return Err(Error::MalformedInput(format!(
                    "expected `lhs : alternatives`, got `{}`",
                    group.trim()
                )));
            }
            let lhs = fragments[0].trim();
            if !is_nonterminal_name(lhs) {
                return Err(Error::MalformedInput(format!(
                    "nonterminal doesn't match the format: `{}`",
                    lhs
                )));
            }
            for alternative_src in fragments[1].split('|') {
                let alternative = Self::parse_alternative(lhs, alternative_src)?;
                self.rules
                    .entry(lhs.to_string())
                    .or_default()
                    .push(alternative);
            }
        }
        Ok(())
    }

    /// Parse one whitespace-separated alternative of `lhs`.
    fn parse_alternative(lhs: &str, src: &str) -> Result<Alternative, Error> {
        let mut alternative = Vec::new();
        for fragment in src.split_whitespace() {
            if fragment == EOF {
                return Err(Error::ReservedName(EOF.to_string()));
            }
            let symbol = Symbol::parse(fragment).ok_or_else(|| {
                Error::MalformedInput(format!(
                    "bad symbol `{}` in a rule for `{}`",
                    fragment, lhs
                ))
            })?;
            alternative.push(symbol);
        }
        if alternative.is_empty() {
            return Err(Error::EmptyAlternative(lhs.to_string()));
        }
        // `a : a` admits no least fixed point beyond the empty set
        if let [Symbol::Nonterminal(name)] = &alternative[..] {
            if name == lhs {
                return Err(Error::SelfProduction(lhs.to_string()));
            }
        }
        Ok(alternative)
    }

    /// Check that every nonterminal used on a right-hand side is defined.
    ///
    /// Unreachable and non-productive nonterminals stay legal; their FIRST
    /// sets may come out vacuous.
    fn validate(&self) -> Result<(), Error> {
        for alternatives in self.rules.values() {
            for alternative in alternatives {
                for symbol in alternative {
                    if let Symbol::Nonterminal(name) = symbol {
                        if !self.rules.contains_key(name) {
                            return Err(Error::UndefinedNonterminal(name.clone()));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// The canonical cache key of a symbol sequence.
    pub(crate) fn sequence_key(seq: &[Symbol]) -> String {
        format_alternative(seq)
    }
}
