use tracing::info;

use crate::error::Result;
use crate::generator::PasswordGenerator;
use crate::settings::load_settings;

/// Flags given on the command line; `None`/`false` keeps the configured default.
#[derive(Debug, Default)]
pub struct GenerateFlags {
    pub length: Option<usize>,
    pub no_lower: bool,
    pub no_upper: bool,
    pub no_digits: bool,
    pub special: bool,
    pub exclude_lookalike: bool,
}

fn apply_flags(mut generator: PasswordGenerator, flags: &GenerateFlags) -> PasswordGenerator {
    if let Some(length) = flags.length {
        generator.length = length;
    }
    if flags.no_lower {
        generator.lower = false;
    }
    if flags.no_upper {
        generator.upper = false;
    }
    if flags.no_digits {
        generator.digits = false;
    }
    if flags.special {
        generator.special = true;
    }
    if flags.exclude_lookalike {
        generator.exclude_lookalike = true;
    }
    generator
}

pub fn run(flags: &GenerateFlags) -> Result<()> {
    let generator = apply_flags(load_settings().generator, flags);
    let password = generator.generate()?;
    info!(
        length = generator.length,
        entropy = generator.entropy_bits(),
        "generated password"
    );
    println!("{password}");
    Ok(())
}
