use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the fixed sets of characters a password can be composed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterClass {
    Upper,
    Lower,
    Digit,
    Symbol,
}

static UPPER: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];
static LOWER: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];
static DIGIT: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];
static SYMBOL: &[char] = &[
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '-', '_', '=', '+', '[', ']', '{', '}', ';',
    ':', ',', '.', '<', '>', '?', '~',
];

impl CharacterClass {
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Upper,
        CharacterClass::Lower,
        CharacterClass::Digit,
        CharacterClass::Symbol,
    ];

    /// The characters of this class, in a fixed order.
    pub fn chars(self) -> &'static [char] {
        match self {
            CharacterClass::Upper => UPPER,
            CharacterClass::Lower => LOWER,
            CharacterClass::Digit => DIGIT,
            CharacterClass::Symbol => SYMBOL,
        }
    }

    pub fn len(self) -> usize {
        self.chars().len()
    }

    pub fn contains(self, ch: char) -> bool {
        self.chars().contains(&ch)
    }

    pub fn name(self) -> &'static str {
        match self {
            CharacterClass::Upper => "upper",
            CharacterClass::Lower => "lower",
            CharacterClass::Digit => "digit",
            CharacterClass::Symbol => "symbol",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown character class {0:?} (expected one of: upper, lower, digit, symbol)")]
pub struct UnknownClass(String);

impl FromStr for CharacterClass {
    type Err = UnknownClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upper" | "uppercase" => Ok(CharacterClass::Upper),
            "lower" | "lowercase" => Ok(CharacterClass::Lower),
            "digit" | "digits" | "number" | "numbers" => Ok(CharacterClass::Digit),
            "symbol" | "symbols" => Ok(CharacterClass::Symbol),
            _ => Err(UnknownClass(s.to_owned())),
        }
    }
}

/// The set of classes chosen for a single request.
///
/// Insertion order is kept (it decides which class receives its guaranteed character first) and
/// inserting a class twice has no effect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassSelection(Vec<CharacterClass>);

impl ClassSelection {
    pub fn new() -> ClassSelection {
        ClassSelection(Vec::new())
    }

    pub fn all() -> ClassSelection {
        CharacterClass::ALL.into_iter().collect()
    }

    /// Add a class to the selection.
    ///
    /// Returns `false` if the class was already selected.
    pub fn insert(&mut self, class: CharacterClass) -> bool {
        if self.0.contains(&class) {
            false
        } else {
            self.0.push(class);
            true
        }
    }

    pub fn contains(&self, class: CharacterClass) -> bool {
        self.0.contains(&class)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = CharacterClass> + '_ {
        self.0.iter().copied()
    }

    /// All characters of the selected classes, concatenated in selection order.
    ///
    /// Characters shared by two classes would appear twice; nothing is deduplicated.
    pub fn pool(&self) -> Vec<char> {
        let mut pool = Vec::with_capacity(self.0.iter().map(|c| c.len()).sum());
        for class in &self.0 {
            pool.extend_from_slice(class.chars());
        }
        pool
    }
}

impl FromIterator<CharacterClass> for ClassSelection {
    fn from_iter<I: IntoIterator<Item = CharacterClass>>(iter: I) -> Self {
        let mut selection = ClassSelection::new();
        for class in iter {
            selection.insert(class);
        }
        selection
    }
}

impl<'a> IntoIterator for &'a ClassSelection {
    type Item = CharacterClass;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, CharacterClass>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
