pub mod random;
pub mod seq;

pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use pinhole_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage:
/// a candidate may collide with a code already in the record set, and it is
/// up to the caller to check and draw again.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Generates a candidate code of `length` characters.
    fn generate(&self, length: usize) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_generator<G: Generator>(_: &G) {}

    #[test]
    fn implementations_satisfy_the_trait() {
        assert_generator(&RandomGenerator::with_seed(1));
        assert_generator(&SeqGenerator::with_prefix("t"));
    }
}
