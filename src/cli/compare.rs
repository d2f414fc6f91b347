use std::io::{BufRead, IsTerminal};

use colored::Colorize;
use zeroize::Zeroize;

use crate::error::{PassEditError, Result};
use crate::pairing::PasswordForm;
use crate::status::{MatchStatus, RepeatIndicator};

/// Run both texts through a linked pair of fields and report the repeat status.
pub fn status_of(primary: &str, repeat: &str) -> Result<MatchStatus> {
    let mut form = PasswordForm::new(false);
    let primary_id = form.add_field();
    let repeat_id = form.add_field();
    form.link(primary_id, repeat_id)?;
    form.set_primary_text(primary_id, primary)?;
    form.set_repeat_text(repeat_id, repeat)?;
    form.status(repeat_id)?
        .ok_or_else(|| PassEditError::Other("repeat field lost its pairing".to_string()))
}

fn read_line(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed_len);
    Ok(line)
}

pub fn run() -> Result<()> {
    let (mut primary, mut repeat) = if std::io::stdin().is_terminal() {
        (
            rpassword::prompt_password("Password: ")?,
            rpassword::prompt_password("Repeat password: ")?,
        )
    } else {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        (read_line(&mut input)?, read_line(&mut input)?)
    };

    let status = status_of(&primary, &repeat);
    primary.zeroize();
    repeat.zeroize();
    let status = status?;

    let label = status.to_string();
    let label = match status {
        MatchStatus::ExactMatch => label.green().bold(),
        MatchStatus::MatchingPrefix => label.yellow().bold(),
        MatchStatus::Mismatch => label.red().bold(),
        MatchStatus::Empty => label.dimmed(),
    };
    match RepeatIndicator::from(status).tooltip() {
        Some(tip) => println!("{label}  {tip}"),
        None => println!("{label}"),
    }

    match status {
        MatchStatus::ExactMatch => Ok(()),
        MatchStatus::Empty => Err(PassEditError::Other("repeat password is empty".to_string())),
        MatchStatus::MatchingPrefix | MatchStatus::Mismatch => {
            Err(PassEditError::Other("passwords do not match".to_string()))
        }
    }
}
