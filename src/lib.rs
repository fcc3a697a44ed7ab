//! Password generation from selectable character classes.
//!
//! [`SecureRandom`] turns a stream of random words into unbiased bounded integers, and
//! [`PasswordComposer`] builds passwords from them that contain at least one character from every
//! selected [`CharacterClass`].

use std::time::SystemTimeError;

mod character_class;
pub mod password_generation;
pub mod secure_random;

pub use character_class::{CharacterClass, ClassSelection, UnknownClass};
pub use password_generation::{GenerationRequest, PasswordComposer};
pub use secure_random::{EntropySource, OsEntropy, PseudoEntropy, SecureRandom, SystemEntropy};

/// A freshly generated password.
///
/// `Debug` output is opaque, so the value doesn't end up in logs by accident.
#[derive(Clone, Eq, PartialEq)]
pub struct GeneratedPassword(String);

opaque_debug::implement!(GeneratedPassword);

impl GeneratedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid password request: {0}")]
    InvalidRequest(#[from] InvalidRequest),
    #[error("randomness unavailable: {0}")]
    RandomnessUnavailable(#[from] EntropyError),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRequest {
    #[error("no character classes were selected")]
    EmptySelection,
    #[error(
        "a length of {length} cannot hold one character from each of the {classes} selected \
         classes"
    )]
    LengthTooShort { length: usize, classes: usize },
    #[error("a length of {0} is larger than the largest supported length")]
    LengthTooLarge(usize),
}

/// The random source failed to produce data.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct EntropyError(EntropyErrorRepr);

impl EntropyError {
    /// Wrap a failure from a custom [`EntropySource`].
    pub fn other(err: impl Into<anyhow::Error>) -> EntropyError {
        EntropyError(EntropyErrorRepr::Other(err.into()))
    }
}

impl From<EntropyErrorRepr> for EntropyError {
    fn from(err: EntropyErrorRepr) -> EntropyError {
        EntropyError(err)
    }
}

#[derive(Debug, thiserror::Error)]
enum EntropyErrorRepr {
    #[error("the operating system random source failed: {0}")]
    Os(#[source] rand::Error),
    #[error("could not read the system clock to seed the fallback generator: {0}")]
    Clock(#[source] SystemTimeError),
    #[error("{0}")]
    Other(#[source] anyhow::Error),
}
