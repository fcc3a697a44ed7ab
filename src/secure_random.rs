//! Unbiased bounded random integers on top of an injectable entropy source.

use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

use crate::{EntropyError, EntropyErrorRepr};

/// Size of the space a single `draw32` covers, i.e. `u32::MAX + 1`.
const WORD_SPACE: u64 = 1 << 32;

/// A supplier of uniformly random 32-bit words.
pub trait EntropySource {
    /// Draw one word. A failing source reports the failure instead of returning made-up data.
    fn draw32(&mut self) -> Result<u32, EntropyError>;

    /// Whether the words are fit for security-sensitive use.
    ///
    /// Sources returning `false` get the weaker scaling path in [`SecureRandom`].
    fn is_cryptographic(&self) -> bool {
        true
    }
}

/// The operating system's CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy(OsRng);

impl OsEntropy {
    pub fn new() -> OsEntropy {
        OsEntropy(OsRng)
    }
}

impl EntropySource for OsEntropy {
    fn draw32(&mut self) -> Result<u32, EntropyError> {
        let mut word = [0u8; 4];
        self.0
            .try_fill_bytes(&mut word)
            .map_err(EntropyErrorRepr::Os)?;
        Ok(u32::from_le_bytes(word))
    }
}

/// General-purpose pseudorandom words. Not suitable for secrets; only used when the OS source is
/// missing, or with a fixed seed in tests.
#[derive(Clone, Debug)]
pub struct PseudoEntropy(StdRng);

impl PseudoEntropy {
    pub fn seeded(seed: u64) -> PseudoEntropy {
        PseudoEntropy(StdRng::seed_from_u64(seed))
    }

    /// Seed from the wall clock and the process id.
    pub fn from_clock() -> Result<PseudoEntropy, EntropyError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(EntropyErrorRepr::Clock)?;
        let seed = (since_epoch.as_nanos() as u64) ^ (u64::from(process::id()) << 32);
        Ok(PseudoEntropy::seeded(seed))
    }
}

impl EntropySource for PseudoEntropy {
    fn draw32(&mut self) -> Result<u32, EntropyError> {
        Ok(self.0.next_u32())
    }

    fn is_cryptographic(&self) -> bool {
        false
    }
}

/// The strongest source this environment offers: the primary (normally the OS) source, or the
/// pseudorandom fallback when the primary could not produce a word.
#[derive(Clone, Debug)]
pub enum SystemEntropy<P = OsEntropy> {
    Primary(P),
    Fallback(PseudoEntropy),
}

impl SystemEntropy<OsEntropy> {
    /// Probe the OS source, and fall back to [`PseudoEntropy`] if it cannot produce a word.
    ///
    /// Fails only if the fallback cannot be seeded either.
    pub fn detect() -> Result<SystemEntropy<OsEntropy>, EntropyError> {
        SystemEntropy::detect_from(OsEntropy::new())
    }
}

impl<P: EntropySource> SystemEntropy<P> {
    /// Same as [`SystemEntropy::detect`], with `primary` standing in for the OS source.
    pub fn detect_from(mut primary: P) -> Result<SystemEntropy<P>, EntropyError> {
        match primary.draw32() {
            Ok(_) => Ok(SystemEntropy::Primary(primary)),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "OS random source unavailable; falling back to a non-cryptographic generator"
                );
                Ok(SystemEntropy::Fallback(PseudoEntropy::from_clock()?))
            }
        }
    }
}

impl<P: EntropySource> EntropySource for SystemEntropy<P> {
    fn draw32(&mut self) -> Result<u32, EntropyError> {
        match self {
            SystemEntropy::Primary(primary) => primary.draw32(),
            SystemEntropy::Fallback(pseudo) => pseudo.draw32(),
        }
    }

    fn is_cryptographic(&self) -> bool {
        match self {
            SystemEntropy::Primary(primary) => primary.is_cryptographic(),
            SystemEntropy::Fallback(pseudo) => pseudo.is_cryptographic(),
        }
    }
}

/// Uniform integers in `[0, max)` without modulo bias.
#[derive(Debug)]
pub struct SecureRandom<S = SystemEntropy> {
    source: S,
}

impl SecureRandom<SystemEntropy> {
    pub fn from_system() -> Result<SecureRandom<SystemEntropy>, EntropyError> {
        Ok(SecureRandom::new(SystemEntropy::detect()?))
    }
}

impl<S: EntropySource> SecureRandom<S> {
    pub fn new(source: S) -> SecureRandom<S> {
        SecureRandom { source }
    }

    /// `true` when the underlying source is the weaker, non-cryptographic one.
    pub fn is_fallback(&self) -> bool {
        !self.source.is_cryptographic()
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Return an integer uniformly distributed over `[0, max)`. A `max` of zero yields zero
    /// without touching the source.
    ///
    /// With a cryptographic source, words at or above the largest multiple of `max` that fits in
    /// the word space are thrown away and redrawn, so every residue is equally likely. Fewer than
    /// two draws are needed on average for any `max`. With a weak source the word is scaled into
    /// range instead.
    pub fn next_bounded_int(&mut self, max: u32) -> Result<u32, EntropyError> {
        if max == 0 {
            return Ok(0);
        }
        if !self.source.is_cryptographic() {
            let uniform01 = f64::from(self.source.draw32()?) / WORD_SPACE as f64;
            return Ok((uniform01 * f64::from(max)).floor() as u32);
        }

        let max = u64::from(max);
        let bound = (WORD_SPACE / max) * max;
        loop {
            let word = u64::from(self.source.draw32()?);
            if word < bound {
                return Ok((word % max) as u32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(Vec<u32>);

    impl EntropySource for Scripted {
        fn draw32(&mut self) -> Result<u32, EntropyError> {
            Ok(self.0.remove(0))
        }
    }

    #[test]
    fn zero_bound_draws_nothing() {
        let mut rng = SecureRandom::new(Scripted(vec![]));
        assert_eq!(rng.next_bounded_int(0).unwrap(), 0);
    }

    #[test]
    fn rejects_words_beyond_largest_multiple() {
        // floor(2^32 / 3) * 3 == u32::MAX, so u32::MAX itself is the only rejected word.
        let mut rng = SecureRandom::new(Scripted(vec![u32::MAX, 5]));
        assert_eq!(rng.next_bounded_int(3).unwrap(), 2);
        assert!(rng.into_inner().0.is_empty());
    }

    #[test]
    fn rejects_upper_third_for_large_bound() {
        let max = 3 << 30;
        let mut rng = SecureRandom::new(Scripted(vec![max, u32::MAX, max - 1]));
        assert_eq!(rng.next_bounded_int(max).unwrap(), max - 1);
    }

    #[test]
    fn accepted_word_is_reduced() {
        let mut rng = SecureRandom::new(Scripted(vec![1_000_003]));
        assert_eq!(rng.next_bounded_int(10).unwrap(), 3);
    }

    #[test]
    fn power_of_two_bound_never_rejects() {
        let mut rng = SecureRandom::new(Scripted(vec![u32::MAX]));
        assert_eq!(rng.next_bounded_int(16).unwrap(), 15);
    }

    #[test]
    fn pseudo_source_is_fallback() {
        let rng = SecureRandom::new(PseudoEntropy::seeded(7));
        assert!(rng.is_fallback());
        assert!(!SecureRandom::new(OsEntropy::new()).is_fallback());
    }

    struct Broken;

    impl EntropySource for Broken {
        fn draw32(&mut self) -> Result<u32, EntropyError> {
            Err(EntropyError::other(anyhow::anyhow!("no entropy device")))
        }
    }

    #[test]
    fn failed_primary_switches_to_fallback() {
        let entropy = SystemEntropy::detect_from(Broken).unwrap();
        assert!(matches!(entropy, SystemEntropy::Fallback(_)));
        assert!(!entropy.is_cryptographic());

        let mut rng = SecureRandom::new(entropy);
        assert!(rng.is_fallback());
        for _ in 0..100 {
            assert!(rng.next_bounded_int(26).unwrap() < 26);
        }
    }

    #[test]
    fn working_primary_is_kept() {
        let entropy = SystemEntropy::detect_from(Scripted(vec![1, 2])).unwrap();
        let mut rng = SecureRandom::new(entropy);
        assert!(!rng.is_fallback());
        // The probe used the first word.
        assert_eq!(rng.next_bounded_int(10).unwrap(), 2);
        assert!(matches!(rng.into_inner(), SystemEntropy::Primary(_)));
    }

    #[test]
    fn detect_finds_the_os_source() {
        let entropy = SystemEntropy::detect().unwrap();
        assert!(matches!(entropy, SystemEntropy::Primary(_)));
        assert!(!SecureRandom::from_system().unwrap().is_fallback());
    }

    #[test]
    fn fallback_scales_without_rejection() {
        struct Weak(Vec<u32>);
        impl EntropySource for Weak {
            fn draw32(&mut self) -> Result<u32, EntropyError> {
                Ok(self.0.remove(0))
            }
            fn is_cryptographic(&self) -> bool {
                false
            }
        }

        let mut rng = SecureRandom::new(Weak(vec![0, 1 << 31, u32::MAX]));
        assert_eq!(rng.next_bounded_int(10).unwrap(), 0);
        assert_eq!(rng.next_bounded_int(10).unwrap(), 5);
        assert_eq!(rng.next_bounded_int(10).unwrap(), 9);
    }

    #[test]
    fn pseudo_entropy_is_deterministic_per_seed() {
        let mut a = PseudoEntropy::seeded(42);
        let mut b = PseudoEntropy::seeded(42);
        for _ in 0..16 {
            assert_eq!(a.draw32().unwrap(), b.draw32().unwrap());
        }
    }

    #[test]
    fn os_source_stays_in_range() {
        let mut rng = SecureRandom::new(OsEntropy::new());
        for max in [1, 2, 3, 7, 26, 88, 1000, u32::MAX] {
            for _ in 0..200 {
                assert!(rng.next_bounded_int(max).unwrap() < max);
            }
        }
        for _ in 0..100 {
            assert_eq!(rng.next_bounded_int(1).unwrap(), 0);
        }
    }
}
