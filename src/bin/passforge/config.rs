//! Defaults and length policy, read from a YAML file.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use passforge::{CharacterClass, ClassSelection};

use crate::ProgError;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub length: usize,
    pub min_length: usize,
    pub max_length: usize,
    pub classes: Vec<CharacterClass>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            length: 16,
            min_length: 4,
            max_length: 128,
            classes: CharacterClass::ALL.to_vec(),
        }
    }
}

impl Config {
    /// Load from the given path, or from the default location if it exists, or fall back to the
    /// built-in defaults.
    pub(crate) fn load(path: Option<PathBuf>) -> Result<Config, ProgError> {
        let path = match path {
            Some(p) => p,
            None => match default_config_path() {
                Some(p) if p.is_file() => p,
                _ => {
                    tracing::debug!("no configuration file; using built-in defaults");
                    return Ok(Config::default());
                }
            },
        };
        Config::from_file(&path).map_err(|err| ProgError::Config(path, err))
    }

    fn from_file(path: &Path) -> anyhow::Result<Config> {
        let file = File::open(path).context("failed to open the configuration file")?;
        let config: Config =
            serde_yaml::from_reader(file).context("failed to parse the configuration file")?;
        config.check()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.min_length > self.max_length {
            anyhow::bail!(
                "`min_length` ({}) is larger than `max_length` ({})",
                self.min_length,
                self.max_length
            );
        }
        if !self.allows(self.length) {
            anyhow::bail!(
                "`length` ({}) is outside of `min_length`..=`max_length` ({}..={})",
                self.length,
                self.min_length,
                self.max_length
            );
        }
        if self.classes.is_empty() {
            anyhow::bail!("`classes` must name at least one character class");
        }
        Ok(())
    }

    pub(crate) fn allows(&self, length: usize) -> bool {
        (self.min_length..=self.max_length).contains(&length)
    }

    /// Enforce the length policy. This happens before a request reaches the composer, which only
    /// knows about the class-coverage rule.
    pub(crate) fn check_length(&self, length: usize) -> Result<(), ProgError> {
        if self.allows(length) {
            Ok(())
        } else {
            Err(ProgError::LengthOutOfPolicy {
                length,
                min: self.min_length,
                max: self.max_length,
            })
        }
    }

    pub(crate) fn selection(&self) -> ClassSelection {
        self.classes.iter().copied().collect()
    }
}

fn default_config_path() -> Option<PathBuf> {
    let home = env::var_os("HOME")?;
    let mut p = PathBuf::from(home);
    p.push(".passforge");
    p.push("config.yaml");
    Some(p)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn missing_keys_take_defaults() {
        let file = write_config("length: 24\nclasses: [lower, digit]\n");
        let config = Config::load(Some(file.path().to_owned())).unwrap();
        assert_eq!(config.length, 24);
        assert_eq!(config.min_length, 4);
        assert_eq!(config.max_length, 128);
        assert_eq!(
            config.selection().iter().collect::<Vec<_>>(),
            vec![CharacterClass::Lower, CharacterClass::Digit]
        );
    }

    #[test]
    fn rejects_inverted_bounds() {
        let file = write_config("min_length: 20\nmax_length: 10\n");
        assert!(matches!(
            Config::load(Some(file.path().to_owned())),
            Err(ProgError::Config(..))
        ));
    }

    #[test]
    fn rejects_default_length_outside_bounds() {
        let file = write_config("length: 200\n");
        assert!(Config::load(Some(file.path().to_owned())).is_err());
    }

    #[test]
    fn rejects_empty_classes_and_unknown_keys() {
        let file = write_config("classes: []\n");
        assert!(Config::load(Some(file.path().to_owned())).is_err());
        let file = write_config("lenght: 12\n");
        assert!(Config::load(Some(file.path().to_owned())).is_err());
        let file = write_config("classes: [emoji]\n");
        assert!(Config::load(Some(file.path().to_owned())).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        let err = Config::load(Some(path)).unwrap_err();
        assert!(matches!(err, ProgError::Config(..)));
        let message = err.to_string();
        assert!(message.contains("failed to open the configuration file: "), "{message}");
        #[cfg(unix)]
        assert!(message.contains("No such file"), "{message}");
    }

    #[test]
    fn parse_errors_carry_the_yaml_cause() {
        let file = write_config("length: [oops\n");
        let message = Config::load(Some(file.path().to_owned()))
            .unwrap_err()
            .to_string();
        let cause = message
            .split("failed to parse the configuration file: ")
            .nth(1)
            .unwrap_or_else(|| panic!("no cause in {message:?}"));
        assert!(!cause.trim().is_empty(), "{message}");
    }

    #[test]
    fn length_policy() {
        let config = Config::default();
        assert!(config.check_length(4).is_ok());
        assert!(config.check_length(128).is_ok());
        assert!(matches!(
            config.check_length(3),
            Err(ProgError::LengthOutOfPolicy {
                length: 3,
                min: 4,
                max: 128
            })
        ));
        assert!(config.check_length(129).is_err());
    }
}
