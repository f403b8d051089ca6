//! Alphabets and character classes.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest alphabet accepted by the generator.
pub const MAX_ALPHABET_LEN: usize = 128;

/// Lowercase ASCII letters.
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
/// Uppercase ASCII letters.
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Decimal digits.
pub const DIGITS: &str = "0123456789";
/// Printable ASCII punctuation.
pub const SYMBOLS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Character class used by composition requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharClass {
    /// `a` to `z`.
    Lowercase,
    /// `A` to `Z`.
    Uppercase,
    /// `0` to `9`.
    Digit,
    /// Everything else.
    Symbol,
}

impl CharClass {
    /// All classes, in record order.
    pub const ALL: [CharClass; 4] = [
        CharClass::Lowercase,
        CharClass::Uppercase,
        CharClass::Digit,
        CharClass::Symbol,
    ];

    /// Classifies a byte. Anything that is not a letter or digit is a symbol.
    pub fn of(byte: u8) -> Self {
        match byte {
            b'a'..=b'z' => CharClass::Lowercase,
            b'A'..=b'Z' => CharClass::Uppercase,
            b'0'..=b'9' => CharClass::Digit,
            _ => CharClass::Symbol,
        }
    }
}

/// Per-class symbol counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    /// Lowercase letters.
    pub lowercase: usize,
    /// Uppercase letters.
    pub uppercase: usize,
    /// Digits.
    pub digits: usize,
    /// Other symbols.
    pub symbols: usize,
}

impl ClassCounts {
    /// Counts classes in a string of ASCII symbols.
    pub fn of(text: &[u8]) -> Self {
        let mut counts = Self::default();
        for &b in text {
            *counts.get_mut(CharClass::of(b)) += 1;
        }
        counts
    }

    /// Count for one class.
    pub fn get(&self, class: CharClass) -> usize {
        match class {
            CharClass::Lowercase => self.lowercase,
            CharClass::Uppercase => self.uppercase,
            CharClass::Digit => self.digits,
            CharClass::Symbol => self.symbols,
        }
    }

    fn get_mut(&mut self, class: CharClass) -> &mut usize {
        match class {
            CharClass::Lowercase => &mut self.lowercase,
            CharClass::Uppercase => &mut self.uppercase,
            CharClass::Digit => &mut self.digits,
            CharClass::Symbol => &mut self.symbols,
        }
    }
}

/// A validated set of ASCII symbols to draw from.
///
/// Symbols are indexed by position. Duplicates are allowed by
/// [`Alphabet::new`] and simply weight that symbol more heavily;
/// [`Alphabet::normalize`] removes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
}

impl Alphabet {
    /// Validates an alphabet: 1 to 128 printable ASCII symbols (32..=126).
    ///
    /// Control bytes are refused; the record stores secrets NUL-terminated.
    pub fn new(symbols: impl AsRef<[u8]>) -> Result<Self> {
        let symbols = symbols.as_ref();
        if symbols.is_empty() {
            return Err(Error::invalid("alphabet is empty"));
        }
        if symbols.len() > MAX_ALPHABET_LEN {
            return Err(Error::invalid(format!(
                "alphabet has {} symbols, maximum is {MAX_ALPHABET_LEN}",
                symbols.len()
            )));
        }
        if let Some(b) = symbols.iter().find(|b| !is_printable(**b)) {
            return Err(Error::invalid(format!(
                "byte 0x{b:02x} in alphabet is not printable ASCII"
            )));
        }
        Ok(Self {
            symbols: symbols.to_vec(),
        })
    }

    /// Builds an alphabet from free-form input: printable ASCII only
    /// (32..=126), deduplicated and sorted by byte value.
    pub fn normalize(input: &str) -> Result<Self> {
        let mut seen = [false; 128];
        for &b in input.as_bytes() {
            if !is_printable(b) {
                return Err(Error::invalid(format!(
                    "byte 0x{b:02x} is not printable ASCII"
                )));
            }
            seen[b as usize] = true;
        }

        let symbols: Vec<u8> = (32u8..=126).filter(|&b| seen[b as usize]).collect();
        Self::new(symbols)
    }

    /// Lowercase, uppercase and digits (62 symbols).
    pub fn alphanumeric() -> Self {
        Self::from_parts(&[LOWERCASE, UPPERCASE, DIGITS])
    }

    /// All printable ASCII except space (94 symbols).
    pub fn printable() -> Self {
        Self::from_parts(&[LOWERCASE, UPPERCASE, DIGITS, SYMBOLS])
    }

    /// Lowercase hexadecimal digits.
    pub fn hex() -> Self {
        Self::from_parts(&["0123456789abcdef"])
    }

    /// Looks up a named preset.
    pub fn preset(name: &str) -> Option<Self> {
        let alphabet = match name {
            "lowercase" => Self::from_parts(&[LOWERCASE]),
            "uppercase" => Self::from_parts(&[UPPERCASE]),
            "digits" => Self::from_parts(&[DIGITS]),
            "symbols" => Self::from_parts(&[SYMBOLS]),
            "alphanumeric" => Self::alphanumeric(),
            "printable" => Self::printable(),
            "hex" => Self::hex(),
            _ => return None,
        };
        Some(alphabet)
    }

    fn from_parts(parts: &[&str]) -> Self {
        Self {
            symbols: parts.iter().flat_map(|p| p.bytes()).collect(),
        }
    }

    /// Number of symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a validated alphabet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Raw symbol bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.symbols
    }

    /// Symbol at `index`.
    #[inline]
    pub fn symbol(&self, index: usize) -> u8 {
        self.symbols[index]
    }

    /// Position of the first occurrence of `byte`.
    pub fn index_of(&self, byte: u8) -> Option<usize> {
        self.symbols.iter().position(|&s| s == byte)
    }

    /// Symbols belonging to one class, in alphabet order.
    pub fn subset(&self, class: CharClass) -> Vec<u8> {
        self.symbols
            .iter()
            .copied()
            .filter(|&b| CharClass::of(b) == class)
            .collect()
    }

    /// True if at least one symbol belongs to `class`.
    pub fn contains_class(&self, class: CharClass) -> bool {
        self.symbols.iter().any(|&b| CharClass::of(b) == class)
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Validated as ASCII, so this is always UTF-8.
        f.write_str(&String::from_utf8_lossy(&self.symbols))
    }
}

fn is_printable(byte: u8) -> bool {
    (32..=126).contains(&byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_sizes() {
        assert_eq!(Alphabet::alphanumeric().len(), 62);
        assert_eq!(Alphabet::printable().len(), 94);
        assert_eq!(Alphabet::hex().len(), 16);
        assert_eq!(Alphabet::preset("lowercase").unwrap().len(), 26);
        assert!(Alphabet::preset("emoji").is_none());
    }

    #[test]
    fn test_normalize_dedups_and_sorts() {
        let alphabet = Alphabet::normalize("cbaabc!").unwrap();
        assert_eq!(alphabet.as_bytes(), b"!abc");
    }

    #[test]
    fn test_normalize_rejects_control_bytes() {
        assert!(matches!(
            Alphabet::normalize("ab\tc"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(Alphabet::normalize(""), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_new_validates_size() {
        assert!(Alphabet::new("").is_err());
        assert!(Alphabet::new(vec![b'a'; 129]).is_err());
        assert!(Alphabet::new(vec![b'a'; 128]).is_ok());
    }

    #[test]
    fn test_new_rejects_control_bytes() {
        for bad in [&b"\0a"[..], b"ab\n", b"\x7f", b"a\xff"] {
            assert!(matches!(Alphabet::new(bad), Err(Error::InvalidArgument(_))));
        }
        assert_eq!(Alphabet::new(" ~").unwrap().len(), 2);
    }

    #[test]
    fn test_class_counts() {
        let counts = ClassCounts::of(b"aB3$xY9!");
        assert_eq!(counts.lowercase, 2);
        assert_eq!(counts.uppercase, 2);
        assert_eq!(counts.digits, 2);
        assert_eq!(counts.symbols, 2);
    }

    #[test]
    fn test_subset_by_class() {
        let alphabet = Alphabet::new("aB3$").unwrap();
        assert_eq!(alphabet.subset(CharClass::Digit), b"3");
        assert!(!Alphabet::new("abc").unwrap().contains_class(CharClass::Symbol));
    }
}
