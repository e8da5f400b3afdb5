use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

use crate::domain::EntityKind;

const URL_SAFE_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

pub const DEFAULT_ID_LENGTH: usize = 6;

/// Source of opaque identifiers for newly created records.
///
/// Implementations are not required to remember what they issued; the store rejects repeats and
/// asks again.
pub trait IdentifierGenerator: Send + Sync {
    fn generate(&self, kind: EntityKind) -> String;
}

/// Short random identifiers drawn from a URL-safe alphabet.
#[derive(Clone, Debug)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    pub fn with_length(length: usize) -> Self {
        Self { length: length.max(1) }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::with_length(DEFAULT_ID_LENGTH)
    }
}

impl IdentifierGenerator for RandomIdGenerator {
    fn generate(&self, _kind: EntityKind) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| URL_SAFE_ALPHABET[rng.gen_range(0..URL_SAFE_ALPHABET.len())] as char)
            .collect()
    }
}

/// Deterministic `C1, C2, ...` / `P1, P2, ...` identifiers for fixtures and tests.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    categories: AtomicU64,
    products: AtomicU64,
}

impl IdentifierGenerator for SequentialIdGenerator {
    fn generate(&self, kind: EntityKind) -> String {
        let (prefix, counter) = match kind {
            EntityKind::Category => ('C', &self.categories),
            EntityKind::Product => ('P', &self.products),
        };
        let next = counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}{next}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{IdentifierGenerator, RandomIdGenerator, SequentialIdGenerator};
    use crate::domain::EntityKind;

    #[test]
    fn random_ids_are_url_safe_and_sized() {
        let generator = RandomIdGenerator::default();
        let ids: HashSet<String> =
            (0..200).map(|_| generator.generate(EntityKind::Product)).collect();

        assert!(ids.len() > 190, "random ids should rarely collide");
        for id in ids {
            assert_eq!(id.len(), 6);
            assert!(id.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'));
        }
    }

    #[test]
    fn sequential_ids_count_per_kind() {
        let generator = SequentialIdGenerator::default();

        assert_eq!(generator.generate(EntityKind::Category), "C1");
        assert_eq!(generator.generate(EntityKind::Product), "P1");
        assert_eq!(generator.generate(EntityKind::Category), "C2");
        assert_eq!(generator.generate(EntityKind::Product), "P2");
    }
}
