use crate::Generator;
use pinhole_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic generator using a sequential counter.
///
/// This generator produces codes like "t00000", "t00001", etc., padding the
/// counter so that prefix and counter together fill the requested length.
/// Handy for tests and local runs where predictable codes are wanted.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    /// Creates a new sequential generator with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a new sequential generator starting from a specific counter
    /// value.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    type Output = ShortCode;

    fn generate(&self, length: usize) -> Self::Output {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        let width = length.saturating_sub(self.prefix.len());
        ShortCode::new_unchecked(format!("{}{:0width$}", self.prefix, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_sequential_codes() {
        let generator = SeqGenerator::with_prefix("t");

        assert_eq!(generator.generate(6).as_str(), "t00000");
        assert_eq!(generator.generate(6).as_str(), "t00001");
        assert_eq!(generator.generate(6).as_str(), "t00002");
    }

    #[test]
    fn padding_follows_requested_length() {
        let generator = SeqGenerator::with_prefix("ab");

        assert_eq!(generator.generate(6).as_str(), "ab0000");
        assert_eq!(generator.generate(8).as_str(), "ab000001");
    }

    #[test]
    fn counter_wider_than_length_is_not_truncated() {
        let generator = SeqGenerator::with_offset("x", 123_456);
        assert_eq!(generator.generate(4).as_str(), "x123456");
    }

    #[test]
    fn with_offset() {
        let generator = SeqGenerator::with_offset("t", 1000);

        assert_eq!(generator.generate(6).as_str(), "t01000");
        assert_eq!(generator.generate(6).as_str(), "t01001");
    }

    #[test]
    fn clone_preserves_counter_state() {
        let generator = SeqGenerator::with_prefix("t");
        generator.generate(6);
        generator.generate(6);

        let cloned = generator.clone();

        assert_eq!(generator.generate(6).as_str(), "t00002");
        assert_eq!(cloned.generate(6).as_str(), "t00002");
    }
}
