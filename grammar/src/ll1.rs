//! The LL(1) decision and the director sets driving emission.
//!
//! A grammar is LL(1) when, for any two distinct alternatives α, β of the
//! same nonterminal A:
//!
//! 1. `FIRST(α) ∩ FIRST(β) = ∅`, and
//! 2. if `EPS ∈ FIRST(α)`, then `FIRST(β) ∩ FOLLOW(A) = ∅`.
//!
//! Both conditions are checked over all ordered pairs, so rule 2 applies
//! symmetrically.

use std::collections::{BTreeSet, HashSet};

use crate::cfg::{format_alternative, Grammar, Symbol, EPS};
use crate::error::Error;

impl Grammar {
    /// FIRST of a symbol sequence, read from the converged sets.
    ///
    /// Unlike the analyzer's internal computation this never touches the
    /// memo cache, so it can be used once the grammar is frozen.
    pub fn first_of_rhs(&self, seq: &[Symbol]) -> HashSet<String> {
        let Some((head, tail)) = seq.split_first() else {
            return HashSet::from([EPS.to_string()]);
        };
        match head {
            Symbol::Eps | Symbol::Translation(_) => self.first_of_rhs(tail),
            Symbol::Terminal(name) => HashSet::from([name.clone()]),
            Symbol::Nonterminal(name) => {
                let mut set = HashSet::new();
                if let Some(head_first) = self.first.get(name) {
                    if head_first.contains(EPS) {
                        set.extend(self.first_of_rhs(tail));
                    }
                    set.extend(
                        head_first
                            .iter()
                            .filter(|token| token.as_str() != EPS)
                            .cloned(),
                    );
                }
                set
            }
        }
    }

    /// The lookahead set selecting `alternative` when parsing `lhs`:
    /// `FIRST(alternative) \ {EPS}`, extended with `FOLLOW(lhs)` when the
    /// alternative is nullable. Sorted, so emission is deterministic.
    pub fn director_set(&self, lhs: &str, alternative: &[Symbol]) -> BTreeSet<String> {
        let mut first = self.first_of_rhs(alternative);
        let nullable = first.remove(EPS);
        let mut director: BTreeSet<String> = first.into_iter().collect();
        if nullable {
            if let Some(follow) = self.follow.get(lhs) {
                director.extend(follow.iter().cloned());
            }
        }
        director
    }

    /// Search for an LL(1) conflict over all ordered pairs of distinct
    /// alternatives of every nonterminal.
    ///
    /// # Errors
    ///
    /// Reports the offending nonterminal, token and pair of alternatives,
    /// or an [`Error::AnalysisOrder`] if FIRST/FOLLOW are not computed.
    pub fn check_ll1(&self) -> Result<(), Error> {
        if self.first.is_empty() || self.follow.is_empty() {
            return Err(Error::AnalysisOrder(
                "FIRST and FOLLOW must be computed before the LL(1) check",
            ));
        }
        for (lhs, alternatives) in &self.rules {
            for (i, alpha) in alternatives.iter().enumerate() {
                for (j, beta) in alternatives.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let alpha_first = self.first_of_rhs(alpha);
                    let beta_first = self.first_of_rhs(beta);

                    if let Some(token) = alpha_first.intersection(&beta_first).next() {
                        return Err(Error::FirstFirstConflict {
                            nonterminal: lhs.clone(),
                            token: token.clone(),
                            left: format_alternative(alpha),
                            right: format_alternative(beta),
                        });
                    }
                    if alpha_first.contains(EPS) {
                        if let Some(follow) = self.follow.get(lhs) {
                            if let Some(token) = follow.intersection(&beta_first).next() {
                                return Err(Error::FirstFollowConflict {
                                    nonterminal: lhs.clone(),
                                    token: token.clone(),
                                    left: format_alternative(alpha),
                                    right: format_alternative(beta),
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether the grammar is LL(1).
    pub fn is_ll1(&self) -> bool {
        self.check_ll1().is_ok()
    }
}
