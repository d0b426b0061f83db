//! Client-side password strength estimate.

const COMMON: [&str; 3] = ["password", "123456", "qwerty"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Checks {
    /// At least 12 characters.
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub number: bool,
    pub special: bool,
    /// Contains none of the most common passwords.
    pub no_common: bool,
}

impl Checks {
    pub fn passed(&self) -> usize {
        [
            self.length,
            self.uppercase,
            self.lowercase,
            self.number,
            self.special,
            self.no_common,
        ]
        .iter()
        .filter(|&&c| c)
        .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl Strength {
    fn from_passed(passed: usize) -> Self {
        match passed {
            0..=2 => Strength::Weak,
            3..=4 => Strength::Medium,
            _ => Strength::Strong,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub checks: Checks,
    pub strength: Strength,
    /// `length × log2(pool)` where the pool sums the character classes used.
    pub entropy_bits: f64,
}

/// Length is counted in UTF-16 code units, as a browser `input` reports it,
/// so a character outside the BMP counts twice.
pub fn assess(password: &str) -> Assessment {
    let lower = password.to_lowercase();
    let length = password.encode_utf16().count();
    let checks = Checks {
        length: length >= 12,
        uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
        lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
        number: password.chars().any(|c| c.is_ascii_digit()),
        special: password.chars().any(|c| !c.is_ascii_alphanumeric()),
        no_common: !COMMON.iter().any(|w| lower.contains(w)),
    };

    let pool = [
        (checks.lowercase, 26),
        (checks.uppercase, 26),
        (checks.number, 10),
        (checks.special, 32),
    ]
    .iter()
    .filter(|(used, _)| *used)
    .map(|(_, size)| size)
    .sum::<u32>()
    .max(1);

    Assessment {
        checks,
        strength: Strength::from_passed(checks.passed()),
        entropy_bits: length as f64 * f64::from(pool).log2(),
    }
}
