use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::Context;
use serde::Serialize;

use passforge::{
    CharacterClass, ClassSelection, GeneratedPassword, GenerationRequest, PasswordComposer,
};

use crate::config::Config;
use crate::{GenerateArgs, ProgError};

pub(crate) fn generate(args: GenerateArgs) -> Result<(), ProgError> {
    let config = Config::load(args.config)?;
    let length = args.length.unwrap_or(config.length);
    config.check_length(length)?;

    let flagged = [
        (args.upper, CharacterClass::Upper),
        (args.lower, CharacterClass::Lower),
        (args.digits, CharacterClass::Digit),
        (args.symbols, CharacterClass::Symbol),
    ];
    let selection: ClassSelection = if flagged.iter().any(|(on, _)| *on) {
        flagged
            .into_iter()
            .filter_map(|(on, class)| on.then_some(class))
            .collect()
    } else {
        config.selection()
    };

    let mut composer = new_composer()?;
    let request = GenerationRequest::new(length, selection);
    let passwords = (0..args.count)
        .map(|_| composer.generate(&request))
        .collect::<Result<Vec<_>, _>>()?;

    if args.copy {
        if let Some(password) = passwords.first() {
            send_to_clipboard(password.as_str().as_bytes())?;
            eprintln!("Copied to the clipboard.");
        }
    } else if args.json {
        let output = JsonOutput {
            passwords: passwords.iter().map(GeneratedPassword::as_str).collect(),
            length,
            classes: request.selection.iter().collect(),
            fallback: composer.is_fallback(),
        };
        let stdout = io::stdout().lock();
        serde_json::to_writer_pretty(stdout, &output)
            .context("failed to write passwords as JSON to stdout")?;
        println!();
    } else {
        let mut stdout = io::stdout().lock();
        for password in &passwords {
            writeln!(stdout, "{}", password.as_str()).context("failed to write to stdout")?;
        }
    }
    Ok(())
}

pub(crate) fn interactive(config_path: Option<PathBuf>) -> Result<(), ProgError> {
    let config = Config::load(config_path)?;
    let selection = crate::select::select_classes(&config)?;
    let length = crate::select::select_length(&config, &selection)?;

    let mut composer = new_composer()?;
    let password = composer.generate(&GenerationRequest::new(length, selection))?;
    println!("{}", password.as_str());

    let copy = dialoguer::Confirm::new()
        .with_prompt("Copy to the clipboard?")
        .default(false)
        .interact()
        .context("failed to prompt you, somehow")?;
    if copy {
        send_to_clipboard(password.as_str().as_bytes())?;
        eprintln!("Copied to the clipboard.");
    }
    Ok(())
}

fn new_composer() -> Result<PasswordComposer, ProgError> {
    let composer = PasswordComposer::from_system()?;
    if composer.is_fallback() {
        eprintln!(
            "{} the system random source is unavailable; these passwords come from a \
             non-cryptographic generator.",
            console::style("warning:").yellow().bold()
        );
    }
    Ok(composer)
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    passwords: Vec<&'a str>,
    length: usize,
    classes: Vec<CharacterClass>,
    fallback: bool,
}

fn send_to_clipboard(data: &[u8]) -> anyhow::Result<()> {
    let mut cmd = clipboard_cmd();
    let mut child = cmd
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start {:?}", cmd.get_program()))?;
    child
        .stdin
        .take()
        .context("clipboard command has no stdin")?
        .write_all(data)
        .context("failed to write to the clipboard command")?;
    let status = child.wait().context("failed to wait for the clipboard command")?;
    if !status.success() {
        anyhow::bail!("{:?} exited with {}", cmd.get_program(), status);
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn clipboard_cmd() -> Command {
    Command::new("pbcopy")
}

#[cfg(not(target_os = "macos"))]
fn clipboard_cmd() -> Command {
    let mut cmd = Command::new("xsel");
    cmd.arg("-b");
    cmd
}
