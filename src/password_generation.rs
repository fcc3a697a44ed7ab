//! Utilities for generating passwords.

use crate::secure_random::{EntropySource, SecureRandom, SystemEntropy};
use crate::{ClassSelection, EntropyError, GeneratedPassword, GenerationError, InvalidRequest};

/// What to generate: a length, and the classes every password must draw from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub length: usize,
    pub selection: ClassSelection,
}

impl GenerationRequest {
    pub fn new(length: usize, selection: ClassSelection) -> GenerationRequest {
        GenerationRequest { length, selection }
    }

    /// Check that the request can be satisfied: at least one class, and room for one character
    /// from each of them.
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.selection.is_empty() {
            return Err(InvalidRequest::EmptySelection);
        }
        if self.length < self.selection.len() {
            return Err(InvalidRequest::LengthTooShort {
                length: self.length,
                classes: self.selection.len(),
            });
        }
        bound_of(self.length)?;
        Ok(())
    }
}

/// Builds passwords that contain at least one character of every selected class.
///
/// Each password is assembled in three steps:
/// * one character drawn from each selected class, in selection order;
/// * the remaining positions drawn from all selected characters together;
/// * a Fisher–Yates shuffle over the whole thing, so the guaranteed characters don't sit at the
///   front.
///
/// The pool for the second step is the plain concatenation of the classes. A character present in
/// two selected classes would be twice as likely to be picked there; the built-in classes don't
/// overlap.
#[derive(Debug)]
pub struct PasswordComposer<S = SystemEntropy> {
    rng: SecureRandom<S>,
}

impl PasswordComposer<SystemEntropy> {
    pub fn from_system() -> Result<PasswordComposer<SystemEntropy>, EntropyError> {
        Ok(PasswordComposer::new(SecureRandom::from_system()?))
    }
}

impl<S: EntropySource> PasswordComposer<S> {
    pub fn new(rng: SecureRandom<S>) -> PasswordComposer<S> {
        PasswordComposer { rng }
    }

    /// Whether passwords are coming from the non-cryptographic fallback source.
    pub fn is_fallback(&self) -> bool {
        self.rng.is_fallback()
    }

    pub fn into_inner(self) -> SecureRandom<S> {
        self.rng
    }

    /// Generate one password.
    ///
    /// Invalid requests are rejected before any randomness is used. If the random source fails
    /// part way through, the error is returned and nothing of the partial password escapes.
    pub fn generate(
        &mut self,
        request: &GenerationRequest,
    ) -> Result<GeneratedPassword, GenerationError> {
        request.validate()?;
        tracing::debug!(
            length = request.length,
            classes = request.selection.len(),
            fallback = self.rng.is_fallback(),
            "generating password"
        );

        let mut buffer = Vec::with_capacity(request.length);
        for class in &request.selection {
            buffer.push(*choose(&mut self.rng, class.chars())?);
        }

        let pool = request.selection.pool();
        while buffer.len() < request.length {
            buffer.push(*choose(&mut self.rng, &pool)?);
        }

        shuffle(&mut self.rng, &mut buffer)?;
        Ok(GeneratedPassword(buffer.into_iter().collect()))
    }
}

/// Pick one element uniformly. `items` must be non-empty.
fn choose<'a, S, T>(rng: &mut SecureRandom<S>, items: &'a [T]) -> Result<&'a T, GenerationError>
where
    S: EntropySource,
{
    debug_assert!(!items.is_empty());
    let index = rng.next_bounded_int(bound_of(items.len())?)?;
    Ok(&items[index as usize])
}

/// Fisher–Yates: walk from the last index down to 1, swapping each position with a uniformly
/// chosen position at or before it. Every permutation is equally likely.
///
/// Slices longer than `u32::MAX` are rejected with [`InvalidRequest::LengthTooLarge`] before
/// anything is drawn.
pub fn shuffle<S, T>(rng: &mut SecureRandom<S>, items: &mut [T]) -> Result<(), GenerationError>
where
    S: EntropySource,
{
    bound_of(items.len())?;
    for i in (1..items.len()).rev() {
        let j = rng.next_bounded_int(bound_of(i + 1)?)? as usize;
        items.swap(i, j);
    }
    Ok(())
}

fn bound_of(len: usize) -> Result<u32, InvalidRequest> {
    u32::try_from(len).map_err(|_| InvalidRequest::LengthTooLarge(len))
}
