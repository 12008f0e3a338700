//! Byte signatures with wildcards

use crate::core::types::{MemoryError, MemoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One position of a [`Pattern`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternToken {
    Byte(u8),
    Wildcard,
}

impl PatternToken {
    /// Whether `byte` satisfies this token
    #[inline]
    pub fn matches(&self, byte: u8) -> bool {
        match self {
            PatternToken::Byte(expected) => *expected == byte,
            PatternToken::Wildcard => true,
        }
    }
}

impl FromStr for PatternToken {
    type Err = MemoryError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token == "??" || token == "?" {
            return Ok(PatternToken::Wildcard);
        }

        // Hex bytes must be exactly 2 characters
        if token.len() != 2 {
            return Err(MemoryError::InvalidPattern(format!(
                "Invalid hex byte '{}': must be 2 digits",
                token
            )));
        }

        let decoded = hex::decode(token)
            .map_err(|err| MemoryError::InvalidPattern(format!("Invalid hex '{}': {}", token, err)))?;
        Ok(PatternToken::Byte(decoded[0]))
    }
}

impl fmt::Display for PatternToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternToken::Byte(byte) => write!(f, "{:02X}", byte),
            PatternToken::Wildcard => f.write_str("??"),
        }
    }
}

/// A non-empty sequence of byte and wildcard tokens, e.g. `"48 8B ?? ?? 89"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    tokens: Vec<PatternToken>,
}

impl Pattern {
    /// Builds a pattern from tokens; an empty pattern is rejected
    pub fn new(tokens: Vec<PatternToken>) -> MemoryResult<Self> {
        if tokens.is_empty() {
            return Err(MemoryError::InvalidPattern("Empty pattern".to_string()));
        }
        Ok(Pattern { tokens })
    }

    /// A pattern matching exactly `bytes`
    pub fn from_bytes(bytes: &[u8]) -> MemoryResult<Self> {
        Pattern::new(bytes.iter().copied().map(PatternToken::Byte).collect())
    }

    /// Get the pattern length
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Compares the pattern against the start of `window`.
    ///
    /// A window shorter than the pattern never matches.
    #[inline]
    pub fn matches(&self, window: &[u8]) -> bool {
        window.len() >= self.tokens.len()
            && self
                .tokens
                .iter()
                .zip(window)
                .all(|(token, &byte)| token.matches(byte))
    }
}

impl FromStr for Pattern {
    type Err = MemoryError;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        let tokens = pattern
            .split_whitespace()
            .map(str::parse)
            .collect::<MemoryResult<Vec<PatternToken>>>()?;
        Pattern::new(tokens)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Pattern {
    type Error = MemoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pattern() {
        let pattern: Pattern = "48 8b ?? ? 89".parse().unwrap();
        assert_eq!(
            pattern.tokens(),
            &[
                PatternToken::Byte(0x48),
                PatternToken::Byte(0x8B),
                PatternToken::Wildcard,
                PatternToken::Wildcard,
                PatternToken::Byte(0x89),
            ]
        );
        assert_eq!(pattern.len(), 5);
        assert_eq!(pattern.to_string(), "48 8B ?? ?? 89");
    }

    #[test]
    fn test_whitespace_is_flexible() {
        let pattern: Pattern = "  DE\tAD \n BE  EF ".parse().unwrap();
        assert_eq!(pattern, Pattern::from_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap());
    }

    #[test]
    fn test_invalid_patterns() {
        for bad in ["", "   ", "DE A", "DEAD", "GG", "0x", "?? ???", "DE AD ZZ"] {
            let err = bad.parse::<Pattern>().unwrap_err();
            assert!(
                matches!(err, MemoryError::InvalidPattern(_)),
                "{:?} should be rejected",
                bad
            );
        }
        assert!(Pattern::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_matches_window() {
        let pattern: Pattern = "DE AD ?? EF".parse().unwrap();
        assert!(pattern.matches(&[0xDE, 0xAD, 0x00, 0xEF]));
        assert!(pattern.matches(&[0xDE, 0xAD, 0xBE, 0xEF, 0x90]));
        assert!(!pattern.matches(&[0xDE, 0xAD, 0xBE, 0xEE]));
        assert!(!pattern.matches(&[0xDE, 0xAD, 0xBE]));
    }

    #[test]
    fn test_serde_as_string() {
        let pattern: Pattern = "90 ?? C3".parse().unwrap();
        let json = serde_json::to_string(&pattern).unwrap();
        assert_eq!(json, "\"90 ?? C3\"");
        let back: Pattern = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pattern);
        assert!(serde_json::from_str::<Pattern>("\"9\"").is_err());
    }
}
