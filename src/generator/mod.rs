//! Secret generation.
//!
//! Secrets are fixed-length strings over an [`Alphabet`], each symbol
//! drawn independently through the rejection sampler. Three shapes are
//! offered: a single secret, a small list of independent secrets, and a
//! secret that meets per-class minimums.

mod alphabet;

pub use alphabet::{
    Alphabet, CharClass, ClassCounts, DIGITS, LOWERCASE, MAX_ALPHABET_LEN, SYMBOLS, UPPERCASE,
};

use crate::entropy::{EntropyError, EntropySource};
use crate::error::{Error, Result};
use crate::sampling::{Draw, RejectionSampler};
use serde::{Deserialize, Serialize};

/// Longest secret the generator produces.
pub const MAX_SECRET_LEN: usize = 256;

/// Most secrets returned by one [`SecretGenerator::generate_multiple`] call.
pub const MAX_MULTI_COUNT: usize = 10;

/// Attempts made by [`SecretGenerator::generate_constrained`].
pub const MAX_CONSTRAINED_ATTEMPTS: u32 = 100;

/// Rejected bytes tolerated per secret symbol within one constrained attempt.
const REJECTIONS_PER_SYMBOL: u64 = 64;

/// Rejected bytes per symbol after which a plain draw treats the source
/// as broken. An honest source rejects at most half its bytes.
const STALL_REJECTIONS_PER_SYMBOL: u64 = 4096;

/// Minimum symbol counts per character class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterRequirements {
    /// Minimum lowercase letters.
    pub min_lowercase: usize,
    /// Minimum uppercase letters.
    pub min_uppercase: usize,
    /// Minimum digits.
    pub min_digits: usize,
    /// Minimum symbols.
    pub min_symbols: usize,
}

impl CharacterRequirements {
    /// Sum of all minimums, or `None` if it overflows.
    pub fn total(&self) -> Option<usize> {
        self.min_lowercase
            .checked_add(self.min_uppercase)?
            .checked_add(self.min_digits)?
            .checked_add(self.min_symbols)
    }

    /// True if no class has a minimum.
    pub fn is_empty(&self) -> bool {
        CharClass::ALL.iter().all(|&class| self.minimum(class) == 0)
    }

    /// Minimum for one class.
    pub fn minimum(&self, class: CharClass) -> usize {
        match class {
            CharClass::Lowercase => self.min_lowercase,
            CharClass::Uppercase => self.min_uppercase,
            CharClass::Digit => self.min_digits,
            CharClass::Symbol => self.min_symbols,
        }
    }

    /// True if `counts` meets every minimum.
    pub fn satisfied_by(&self, counts: &ClassCounts) -> bool {
        CharClass::ALL
            .iter()
            .all(|&class| counts.get(class) >= self.minimum(class))
    }

    /// Checks the requirements can be met for `length` symbols from `alphabet`.
    pub fn check_possible(&self, alphabet: &Alphabet, length: usize) -> Result<()> {
        match self.total() {
            Some(total) if total <= length => {}
            Some(total) => {
                return Err(Error::RequirementsImpossible(format!(
                    "minimums sum to {total} but length is {length}"
                )));
            }
            None => {
                return Err(Error::RequirementsImpossible(
                    "minimums overflow when summed".to_string(),
                ));
            }
        }
        for class in CharClass::ALL {
            if self.minimum(class) > 0 && !alphabet.contains_class(class) {
                return Err(Error::RequirementsImpossible(format!(
                    "alphabet has no {class:?} symbols"
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn check_length(length: usize) -> Result<()> {
    if length == 0 || length > MAX_SECRET_LEN {
        return Err(Error::invalid(format!(
            "length {length} outside 1..={MAX_SECRET_LEN}"
        )));
    }
    Ok(())
}

/// Builds secrets from an entropy source.
///
/// The source is chosen at construction; the generator holds no other
/// state between calls beyond a count of secrets produced.
pub struct SecretGenerator<S: EntropySource> {
    source: S,
    generated: u64,
}

impl<S: EntropySource> SecretGenerator<S> {
    /// Creates a generator over the given source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            generated: 0,
        }
    }

    /// Secrets produced so far.
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Generates one secret of exactly `length` symbols.
    pub fn generate(&mut self, alphabet: &Alphabet, length: usize) -> Result<String> {
        let indices = self.generate_indices(alphabet, length)?;
        Ok(render(alphabet, &indices))
    }

    /// Generates `count` independent secrets.
    ///
    /// On failure nothing is returned; secrets drawn before the failure
    /// are dropped.
    pub fn generate_multiple(
        &mut self,
        alphabet: &Alphabet,
        length: usize,
        count: usize,
    ) -> Result<Vec<String>> {
        check_length(length)?;
        if count == 0 || count > MAX_MULTI_COUNT {
            return Err(Error::invalid(format!(
                "count {count} outside 1..={MAX_MULTI_COUNT}"
            )));
        }

        (0..count)
            .map(|_| self.generate(alphabet, length))
            .collect()
    }

    /// Generates a secret meeting per-class minimums.
    ///
    /// Required positions are picked by a sampler-driven shuffle and
    /// seeded from each class's sub-alphabet; the rest are drawn from the
    /// full alphabet. Each attempt has a budget of rejected bytes so a
    /// degenerate source cannot stall the call.
    pub fn generate_constrained(
        &mut self,
        alphabet: &Alphabet,
        length: usize,
        requirements: &CharacterRequirements,
    ) -> Result<String> {
        check_length(length)?;
        requirements.check_possible(alphabet, length)?;

        for attempt in 1..=MAX_CONSTRAINED_ATTEMPTS {
            let mut budget = REJECTIONS_PER_SYMBOL * length as u64;
            if let Some(bytes) = self.constrained_attempt(alphabet, length, requirements, &mut budget)? {
                debug_assert!(requirements.satisfied_by(&ClassCounts::of(&bytes)));
                self.generated += 1;
                tracing::trace!(attempt, length, "constrained secret generated");
                return Ok(bytes.into_iter().map(char::from).collect());
            }
            tracing::debug!(attempt, "constrained attempt exceeded rejection budget");
        }

        tracing::warn!(
            attempts = MAX_CONSTRAINED_ATTEMPTS,
            "constrained generation exhausted its attempts"
        );
        Err(Error::ExhaustedAttempts {
            attempts: MAX_CONSTRAINED_ATTEMPTS,
        })
    }

    /// Draws symbol indices for one secret.
    pub(crate) fn generate_indices(
        &mut self,
        alphabet: &Alphabet,
        length: usize,
    ) -> Result<Vec<usize>> {
        check_length(length)?;

        let budget = STALL_REJECTIONS_PER_SYMBOL * length as u64;
        let mut sampler = RejectionSampler::with_budget(alphabet.len(), budget)?;
        let mut indices = vec![0usize; length];
        if sampler.fill(&mut self.source, &mut indices)? == Draw::BudgetExceeded {
            tracing::warn!(
                rejected = sampler.rejected(),
                source = self.source.name(),
                "entropy source stalled above the rejection boundary"
            );
            return Err(EntropyError::Stalled {
                rejected: sampler.rejected(),
            }
            .into());
        }

        self.generated += 1;
        Ok(indices)
    }

    fn constrained_attempt(
        &mut self,
        alphabet: &Alphabet,
        length: usize,
        requirements: &CharacterRequirements,
        budget: &mut u64,
    ) -> Result<Option<Vec<u8>>> {
        // Fisher-Yates over positions; the first `total` slots take the
        // required symbols.
        let mut positions: Vec<usize> = (0..length).collect();
        for i in (1..length).rev() {
            let Some(j) = self.draw_one(i + 1, budget)? else {
                return Ok(None);
            };
            positions.swap(i, j);
        }

        let mut out = vec![0u8; length];
        let mut filled = vec![false; length];
        let mut cursor = 0;

        for class in CharClass::ALL {
            let minimum = requirements.minimum(class);
            if minimum == 0 {
                continue;
            }
            let subset = alphabet.subset(class);
            let mut picks = vec![0usize; minimum];
            if !self.draw_many(subset.len(), &mut picks, budget)? {
                return Ok(None);
            }
            for pick in picks {
                let pos = positions[cursor];
                out[pos] = subset[pick];
                filled[pos] = true;
                cursor += 1;
            }
        }

        let mut rest = vec![0usize; length - cursor];
        if !self.draw_many(alphabet.len(), &mut rest, budget)? {
            return Ok(None);
        }
        let open = filled.iter().enumerate().filter(|&(_, &f)| !f).map(|(i, _)| i);
        for (pos, index) in open.zip(rest) {
            out[pos] = alphabet.symbol(index);
        }

        Ok(Some(out))
    }

    fn draw_one(&mut self, n: usize, budget: &mut u64) -> Result<Option<usize>> {
        let mut out = [0usize; 1];
        Ok(self.draw_many(n, &mut out, budget)?.then_some(out[0]))
    }

    fn draw_many(&mut self, n: usize, out: &mut [usize], budget: &mut u64) -> Result<bool> {
        let mut sampler = RejectionSampler::with_budget(n, *budget)?;
        let draw = sampler.fill(&mut self.source, out)?;
        *budget = budget.saturating_sub(sampler.rejected());
        Ok(draw == Draw::Complete)
    }
}

impl<S: EntropySource> std::fmt::Debug for SecretGenerator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretGenerator")
            .field("source", &self.source.name())
            .field("generated", &self.generated)
            .finish()
    }
}

/// Maps indices to their alphabet symbols.
pub(crate) fn render(alphabet: &Alphabet, indices: &[usize]) -> String {
    indices.iter().map(|&i| char::from(alphabet.symbol(i))).collect()
}
