//! Short code assignment.
//!
//! A [`Generator`] is a pure randomness source. [`assign_code`] combines it
//! with the set of codes already in use to pick the code for a new link,
//! honouring a user-preferred code when one is given.

pub mod random;
pub mod seq;

use pinhole_core::{LinkError, Result, ShortCode};
use std::collections::{HashMap, HashSet};
use std::hash::BuildHasher;
use tracing::{debug, warn};

pub use crate::random::UuidGenerator;
pub use crate::seq::SeqGenerator;

/// Upper bound on random draws before [`assign_code`] gives up.
pub const MAX_ATTEMPTS: usize = 10;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// Uniqueness against existing links is checked by [`assign_code`].
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;
    /// Draws a new candidate code.
    fn generate(&self) -> Self::Output;
}

/// The set of codes a new code must not collide with.
pub trait KnownCodes {
    fn contains_code(&self, code: &str) -> bool;
}

impl<S: BuildHasher> KnownCodes for HashSet<ShortCode, S> {
    fn contains_code(&self, code: &str) -> bool {
        self.contains(code)
    }
}

impl<V, S: BuildHasher> KnownCodes for HashMap<ShortCode, V, S> {
    fn contains_code(&self, code: &str) -> bool {
        self.contains_key(code)
    }
}

/// Picks the code for a new link.
///
/// A `preferred` code is taken as-is if it is non-empty and unused;
/// otherwise the call fails with [`LinkError::CodeConflict`]. Without a
/// preference, up to [`MAX_ATTEMPTS`] codes are drawn from `generator`
/// and the first unused one wins; if all collide the call fails with
/// [`LinkError::GenerationExhausted`].
pub fn assign_code<G, K>(generator: &G, preferred: Option<&str>, existing: &K) -> Result<ShortCode>
where
    G: Generator + ?Sized,
    K: KnownCodes + ?Sized,
{
    if let Some(preferred) = preferred {
        if preferred.is_empty() || existing.contains_code(preferred) {
            return Err(LinkError::CodeConflict(preferred.to_string()));
        }
        return Ok(ShortCode::new(preferred));
    }

    for attempt in 1..=MAX_ATTEMPTS {
        let code: ShortCode = generator.generate().into();
        if !existing.contains_code(code.as_str()) {
            return Ok(code);
        }
        debug!(code = %code, attempt, "generated short code collides, drawing again");
    }

    warn!(attempts = MAX_ATTEMPTS, "short code generation exhausted");
    Err(LinkError::GenerationExhausted {
        attempts: MAX_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Always produces the same code.
    struct FixedGenerator(&'static str);

    impl Generator for FixedGenerator {
        type Output = ShortCode;

        fn generate(&self) -> ShortCode {
            ShortCode::new(self.0)
        }
    }

    /// Counts draws and yields `taken` for the first `collisions` of them.
    struct CollidingGenerator {
        draws: AtomicUsize,
        collisions: usize,
    }

    impl Generator for CollidingGenerator {
        type Output = ShortCode;

        fn generate(&self) -> ShortCode {
            let draw = self.draws.fetch_add(1, Ordering::SeqCst);
            if draw < self.collisions {
                ShortCode::new("taken")
            } else {
                ShortCode::new(format!("fresh{draw}"))
            }
        }
    }

    fn codes(items: &[&str]) -> HashSet<ShortCode> {
        items.iter().map(|c| ShortCode::new(*c)).collect()
    }

    #[test]
    fn preferred_code_is_used_when_free() {
        let code = assign_code(&FixedGenerator("gen000"), Some("mycode"), &codes(&[])).unwrap();
        assert_eq!(code.as_str(), "mycode");
    }

    #[test]
    fn preferred_code_conflicts_with_existing() {
        let err = assign_code(&FixedGenerator("gen000"), Some("mycode"), &codes(&["mycode"]))
            .unwrap_err();
        assert_eq!(err, LinkError::CodeConflict("mycode".to_string()));
    }

    #[test]
    fn empty_preferred_code_is_a_conflict() {
        let err = assign_code(&FixedGenerator("gen000"), Some(""), &codes(&[])).unwrap_err();
        assert!(matches!(err, LinkError::CodeConflict(_)));
    }

    #[test]
    fn generated_code_retries_past_collisions() {
        let generator = CollidingGenerator {
            draws: AtomicUsize::new(0),
            collisions: 3,
        };
        let code = assign_code(&generator, None, &codes(&["taken"])).unwrap();
        assert_eq!(code.as_str(), "fresh3");
        assert_eq!(generator.draws.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn generation_gives_up_after_bounded_attempts() {
        let generator = CollidingGenerator {
            draws: AtomicUsize::new(0),
            collisions: usize::MAX,
        };
        let err = assign_code(&generator, None, &codes(&["taken"])).unwrap_err();
        assert_eq!(
            err,
            LinkError::GenerationExhausted {
                attempts: MAX_ATTEMPTS
            }
        );
        assert_eq!(generator.draws.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[test]
    fn works_against_index_maps() {
        let mut index = HashMap::new();
        index.insert(ShortCode::new("gen000"), 0usize);
        let err = assign_code(&FixedGenerator("gen000"), None, &index).unwrap_err();
        assert!(matches!(err, LinkError::GenerationExhausted { .. }));
    }
}
