use tracing::info;

use crate::error::{PassEditError, Result};
use crate::generator::{MAX_LENGTH, MIN_LENGTH};
use crate::settings::{load_settings, save_settings, settings_path, Settings};

pub fn run(auto_sync: Option<bool>, length: Option<usize>, special: Option<bool>) -> Result<()> {
    let mut settings = load_settings();
    if apply(&mut settings, auto_sync, length, special)? {
        save_settings(&settings)?;
        info!(path = %settings_path().display(), "settings saved");
    }

    println!("Settings:   {}", settings_path().display());
    println!("Auto-sync:  {}", if settings.security.passwords_repeat { "on" } else { "off" });
    let g = &settings.generator;
    println!("Generator:  length {}", g.length);
    println!(
        "            lower={} upper={} digits={} special={} exclude-lookalike={}",
        g.lower, g.upper, g.digits, g.special, g.exclude_lookalike
    );
    Ok(())
}

/// Returns true if anything changed. A rejected length leaves `settings` untouched.
fn apply(
    settings: &mut Settings,
    auto_sync: Option<bool>,
    length: Option<usize>,
    special: Option<bool>,
) -> Result<bool> {
    if let Some(length) = length {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
            return Err(PassEditError::Settings(format!(
                "length must be between {MIN_LENGTH} and {MAX_LENGTH}, got {length}"
            )));
        }
    }

    let before = settings.clone();
    if let Some(on) = auto_sync {
        settings.security.passwords_repeat = on;
    }
    if let Some(length) = length {
        settings.generator.length = length;
    }
    if let Some(on) = special {
        settings.generator.special = on;
    }
    Ok(*settings != before)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_reports_changes() {
        let mut s = Settings::default();
        assert!(!apply(&mut s, None, None, None).unwrap());
        assert!(apply(&mut s, Some(true), None, None).unwrap());
        assert!(s.security.passwords_repeat);
        assert!(!apply(&mut s, Some(true), Some(20), None).unwrap());
        assert!(apply(&mut s, None, Some(32), Some(true)).unwrap());
        assert_eq!(s.generator.length, 32);
        assert!(s.generator.special);
    }

    #[test]
    fn apply_rejects_out_of_range_length() {
        let mut s = Settings::default();
        for bad in [0, MIN_LENGTH - 1, MAX_LENGTH + 1, usize::MAX] {
            let err = apply(&mut s, Some(true), Some(bad), None).unwrap_err();
            assert!(matches!(err, PassEditError::Settings(_)));
        }
        assert_eq!(s, Settings::default());
        assert!(apply(&mut s, None, Some(MIN_LENGTH), None).unwrap());
        assert!(apply(&mut s, None, Some(MAX_LENGTH), None).unwrap());
    }
}
