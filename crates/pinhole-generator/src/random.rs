use crate::Generator;
use pinhole_core::ShortCode;
use uuid::Uuid;

/// Length of codes produced by [`UuidGenerator::new`].
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Hex characters in the simple form of a UUID.
const MAX_CODE_LENGTH: usize = 32;

/// Draws codes from the leading hex characters of a random v4 UUID.
///
/// Six characters give 16^6 (about 16.7M) possible codes, so collisions
/// are rare but possible; [`assign_code`](crate::assign_code) retries them.
#[derive(Debug, Clone, Copy)]
pub struct UuidGenerator {
    length: usize,
}

impl UuidGenerator {
    pub fn new() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
        }
    }

    /// Creates a generator producing codes of `length` characters,
    /// clamped to `1..=32`.
    pub fn with_length(length: usize) -> Self {
        Self {
            length: length.clamp(1, MAX_CODE_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for UuidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for UuidGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        let mut buf = Uuid::encode_buffer();
        let hex = Uuid::new_v4().simple().encode_lower(&mut buf);
        ShortCode::new(&hex[..self.length])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_codes_are_six_hex_chars() {
        let generator = UuidGenerator::new();
        for _ in 0..100 {
            let code = generator.generate();
            assert_eq!(code.as_str().len(), 6);
            assert!(code.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn successive_codes_differ() {
        let generator = UuidGenerator::new();
        let first = generator.generate();
        let second = generator.generate();
        // 1 in 16.7M chance of a false failure
        assert_ne!(first, second);
    }

    #[test]
    fn length_is_clamped() {
        assert_eq!(UuidGenerator::with_length(0).length(), 1);
        assert_eq!(UuidGenerator::with_length(64).length(), 32);
        assert_eq!(UuidGenerator::with_length(12).generate().as_str().len(), 12);
    }
}
