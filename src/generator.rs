use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PassEditError, Result};

const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SPECIAL: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
const LOOKALIKE: &str = "0Oo1lI|";

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 128;

/// Options for random password generation. Also persisted as the generator
/// defaults in settings.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordGenerator {
    pub length: usize,
    pub lower: bool,
    pub upper: bool,
    pub digits: bool,
    pub special: bool,
    pub exclude_lookalike: bool,
}

impl Default for PasswordGenerator {
    fn default() -> Self {
        Self {
            length: 20,
            lower: true,
            upper: true,
            digits: true,
            special: false,
            exclude_lookalike: false,
        }
    }
}

impl PasswordGenerator {
    /// Character groups for every enabled class, lookalikes already removed.
    fn groups(&self) -> Vec<Vec<char>> {
        [
            (self.lower, LOWER),
            (self.upper, UPPER),
            (self.digits, DIGITS),
            (self.special, SPECIAL),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, chars)| {
            chars
                .chars()
                .filter(|c| !(self.exclude_lookalike && LOOKALIKE.contains(*c)))
                .collect::<Vec<char>>()
        })
        .filter(|group| !group.is_empty())
        .collect()
    }

    pub fn pool_size(&self) -> usize {
        self.groups().iter().map(Vec::len).sum()
    }

    /// Estimated strength of a generated password in bits.
    pub fn entropy_bits(&self) -> f64 {
        let pool = self.pool_size();
        if pool == 0 {
            return 0.0;
        }
        self.length as f64 * (pool as f64).log2()
    }

    pub fn generate(&self) -> Result<String> {
        self.generate_with(&mut rand::thread_rng())
    }

    /// Every enabled class contributes at least one character.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
        let groups = self.groups();
        if groups.is_empty() {
            return Err(PassEditError::Generator(
                "no character classes selected".to_string(),
            ));
        }
        if self.length == 0 || self.length < groups.len() {
            return Err(PassEditError::Generator(format!(
                "length {} is too short for {} character classes",
                self.length,
                groups.len()
            )));
        }
        if self.length > MAX_LENGTH {
            return Err(PassEditError::Generator(format!(
                "length {} exceeds the maximum of {MAX_LENGTH}",
                self.length
            )));
        }

        let mut password: Vec<char> = Vec::with_capacity(self.length);
        for group in &groups {
            if let Some(c) = group.choose(rng) {
                password.push(*c);
            }
        }
        let pool: Vec<char> = groups.concat();
        while password.len() < self.length {
            if let Some(c) = pool.choose(rng) {
                password.push(*c);
            }
        }
        password.shuffle(rng);
        Ok(password.into_iter().collect())
    }

    pub fn adjust_length(&mut self, delta: isize) {
        let next = self.length.saturating_add_signed(delta);
        self.length = next.clamp(MIN_LENGTH, MAX_LENGTH);
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn default_generates_requested_length() {
        let gen = PasswordGenerator::default();
        let pw = gen.generate().unwrap();
        assert_eq!(pw.chars().count(), 20);
        assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn every_enabled_class_is_present() {
        let gen = PasswordGenerator {
            length: 4,
            special: true,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let pw = gen.generate_with(&mut rng).unwrap();
            assert!(pw.chars().any(|c| c.is_ascii_lowercase()));
            assert!(pw.chars().any(|c| c.is_ascii_uppercase()));
            assert!(pw.chars().any(|c| c.is_ascii_digit()));
            assert!(pw.chars().any(|c| SPECIAL.contains(c)));
        }
    }

    #[test]
    fn lookalikes_are_excluded() {
        let gen = PasswordGenerator {
            length: 64,
            exclude_lookalike: true,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let pw = gen.generate_with(&mut rng).unwrap();
            assert!(!pw.chars().any(|c| LOOKALIKE.contains(c)), "{pw}");
        }
    }

    #[test]
    fn no_classes_is_an_error() {
        let gen = PasswordGenerator {
            lower: false,
            upper: false,
            digits: false,
            special: false,
            ..Default::default()
        };
        assert!(matches!(gen.generate(), Err(PassEditError::Generator(_))));
        assert_eq!(gen.entropy_bits(), 0.0);
    }

    #[test]
    fn length_shorter_than_classes_is_an_error() {
        let gen = PasswordGenerator {
            length: 2,
            ..Default::default()
        };
        assert!(gen.generate().is_err());
    }

    #[test]
    fn length_above_maximum_is_an_error() {
        let gen = PasswordGenerator {
            length: usize::MAX,
            ..Default::default()
        };
        assert!(matches!(gen.generate(), Err(PassEditError::Generator(_))));
        let gen = PasswordGenerator {
            length: MAX_LENGTH + 1,
            ..Default::default()
        };
        assert!(gen.generate().is_err());
        let gen = PasswordGenerator {
            length: MAX_LENGTH,
            ..Default::default()
        };
        assert_eq!(gen.generate().unwrap().chars().count(), MAX_LENGTH);
    }

    #[test]
    fn entropy_uses_pool_size() {
        let gen = PasswordGenerator {
            length: 10,
            upper: false,
            digits: false,
            ..Default::default()
        };
        assert_eq!(gen.pool_size(), 26);
        let expected = 10.0 * 26f64.log2();
        assert!((gen.entropy_bits() - expected).abs() < 1e-9);
    }

    #[test]
    fn adjust_length_clamps() {
        let mut gen = PasswordGenerator::default();
        gen.adjust_length(-100);
        assert_eq!(gen.length, MIN_LENGTH);
        gen.adjust_length(1000);
        assert_eq!(gen.length, MAX_LENGTH);
    }
}
