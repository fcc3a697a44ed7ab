use anyhow::Context;
use dialoguer::theme::ColorfulTheme;

use passforge::{CharacterClass, ClassSelection};

use crate::config::Config;

pub(crate) fn select_classes(config: &Config) -> Result<ClassSelection, crate::ProgError> {
    let items = CharacterClass::ALL.map(|class| format!("{class} ({} characters)", class.len()));
    let defaults = CharacterClass::ALL.map(|class| config.classes.contains(&class));
    loop {
        let chosen = dialoguer::MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt("Character classes")
            .items(&items)
            .defaults(&defaults)
            .interact_opt()
            .context("failed to query your selection")?
            .ok_or(crate::ProgError::SelectionCancelled)?;
        if chosen.is_empty() {
            eprintln!("Pick at least one character class.");
            continue;
        }
        return Ok(chosen.into_iter().map(|i| CharacterClass::ALL[i]).collect());
    }
}

pub(crate) fn select_length(
    config: &Config,
    selection: &ClassSelection,
) -> Result<usize, crate::ProgError> {
    let floor = config.min_length.max(selection.len());
    let default = config.length.max(floor);
    let length = dialoguer::Input::<usize>::with_theme(&ColorfulTheme::default())
        .with_prompt("Length")
        .default(default)
        .validate_with(|length: &usize| -> Result<(), String> {
            if *length < floor || *length > config.max_length {
                Err(format!(
                    "pick a length between {} and {}",
                    floor, config.max_length
                ))
            } else {
                Ok(())
            }
        })
        .interact_text()
        .context("failed to read the length")?;
    Ok(length)
}
