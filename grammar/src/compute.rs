//! The FIRST and FOLLOW closures, reached by fixed-point iteration.
//!
//! Both sets solve recursive equations over the rules; each is computed by
//! sweeping all productions until no set grows during a full sweep. Growth
//! is detected by comparing cardinalities before and after each step.

use std::collections::HashSet;

use log::debug;

use crate::cfg::{Alternative, Grammar, Symbol, EOF, EPS, START};
use crate::error::Error;

impl Grammar {
    /// Compute the FIRST sets of every nonterminal, caching the FIRST of
    /// every symbol sequence visited along the way.
    ///
    /// Re-running is a no-op: the sweeps are monotone and the sets are
    /// already at their least fixed point.
    pub fn compute_first(&mut self) {
        self.first
            .entry(EPS.to_string())
            .or_insert_with(|| HashSet::from([EPS.to_string()]));

        let rules = self.rule_snapshot();
        let mut sweeps = 0usize;
        let mut change = true;
        while change {
            change = false;
            sweeps += 1;
            for (lhs, alternatives) in &rules {
                for alternative in alternatives {
                    let alternative_first = self.calculate_first(alternative);
                    let lhs_first = self.first.entry(lhs.clone()).or_default();
                    let old_size = lhs_first.len();
                    lhs_first.extend(alternative_first);
                    if lhs_first.len() != old_size {
                        change = true;
                    }
                }
            }
        }
        debug!("FIRST converged after {} sweeps", sweeps);
    }

    /// FIRST of a symbol sequence, following the recursive definition:
    /// the empty sequence yields `{EPS}`; translation symbols and `EPS`
    /// heads are skipped; a terminal head yields itself; a nonterminal
    /// head contributes its FIRST set, pulling in the tail's FIRST when
    /// the head is nullable.
    ///
    /// Every visited suffix is cached under its space-joined key. Entries
    /// are overwritten with the freshly computed value, so the cache never
    /// holds a stale underapproximation.
    fn calculate_first(&mut self, seq: &[Symbol]) -> HashSet<String> {
        let Some((head, tail)) = seq.split_first() else {
            return HashSet::from([EPS.to_string()]);
        };

        let result = match head {
            Symbol::Eps | Symbol::Translation(_) => self.calculate_first(tail),
            Symbol::Terminal(name) => {
                self.first
                    .entry(name.clone())
                    .or_default()
                    .insert(name.clone());
                HashSet::from([name.clone()])
            }
            Symbol::Nonterminal(name) => {
                let head_first = self.first.get(name).cloned().unwrap_or_default();
                let mut set = HashSet::new();
                if head_first.contains(EPS) {
                    set.extend(self.calculate_first(tail));
                }
                set.extend(head_first.into_iter().filter(|token| token != EPS));
                set
            }
        };

        self.first.insert(Self::sequence_key(seq), result.clone());
        result
    }

    /// Compute the FOLLOW sets of every defined nonterminal.
    ///
    /// Seeds `FOLLOW(start)` with `EOF`, then for every occurrence of a
    /// nonterminal `B` in a production `A → … B γ` adds `FIRST(γ) \ {EPS}`
    /// to `FOLLOW(B)`, plus `FOLLOW(A)` whenever γ is nullable. `EPS`
    /// never enters a FOLLOW set.
    ///
    /// # Errors
    ///
    /// Fails if FIRST has not been computed or no `start` rule exists.
    pub fn compute_follow(&mut self) -> Result<(), Error> {
        if self.first.is_empty() {
            return Err(Error::AnalysisOrder("FIRST must be computed before FOLLOW"));
        }
        if !self.rules.contains_key(START) {
            return Err(Error::MissingStart);
        }

        for lhs in self.rules.keys().cloned().collect::<Vec<_>>() {
            self.follow.entry(lhs).or_default();
        }
        self.follow
            .entry(START.to_string())
            .or_default()
            .insert(EOF.to_string());

        let rules = self.rule_snapshot();
        let mut sweeps = 0usize;
        let mut change = true;
        while change {
            change = false;
            sweeps += 1;
            for (lhs, alternatives) in &rules {
                for alternative in alternatives {
                    for (i, symbol) in alternative.iter().enumerate() {
                        let Symbol::Nonterminal(name) = symbol else {
                            continue;
                        };
                        let gamma_first = self.calculate_first(&alternative[i + 1..]);
                        let lhs_follow = self.follow.get(lhs).cloned().unwrap_or_default();
                        let name_follow = self.follow.entry(name.clone()).or_default();
                        let old_size = name_follow.len();
                        for token in gamma_first {
                            if token == EPS {
                                name_follow.extend(lhs_follow.iter().cloned());
                            } else {
                                name_follow.insert(token);
                            }
                        }
                        if name_follow.len() != old_size {
                            change = true;
                        }
                    }
                }
            }
        }
        debug!("FOLLOW converged after {} sweeps", sweeps);
        Ok(())
    }

    /// Clone of the rule table, letting the sweeps borrow the rules and
    /// mutate the sets at the same time.
    fn rule_snapshot(&self) -> Vec<(String, Vec<Alternative>)> {
        self.rules
            .iter()
            .map(|(lhs, alternatives)| (lhs.clone(), alternatives.clone()))
            .collect()
    }
}
