use std::fmt;

/// Feedback state of a repeat field relative to its primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Empty,
    MatchingPrefix,
    Mismatch,
    ExactMatch,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchStatus::Empty => "Empty",
            MatchStatus::MatchingPrefix => "MatchingPrefix",
            MatchStatus::Mismatch => "Mismatch",
            MatchStatus::ExactMatch => "ExactMatch",
        };
        f.write_str(name)
    }
}

/// Compare the repeat text against the primary text.
/// An empty repeat is always `Empty`, even when the primary has text.
pub fn compute_status(primary: &str, repeat: &str) -> MatchStatus {
    if repeat.is_empty() {
        MatchStatus::Empty
    } else if repeat == primary {
        MatchStatus::ExactMatch
    } else if primary.starts_with(repeat) {
        MatchStatus::MatchingPrefix
    } else {
        MatchStatus::Mismatch
    }
}

/// Indicator shown next to a repeat field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatIndicator {
    None,
    CorrectSoFar,
    Error,
}

impl RepeatIndicator {
    pub fn tooltip(self) -> Option<&'static str> {
        match self {
            RepeatIndicator::None => None,
            RepeatIndicator::CorrectSoFar => Some("Passwords match so far"),
            RepeatIndicator::Error => Some("Passwords do not match"),
        }
    }

    /// Background colour as (r, g, b).
    pub fn rgb(self) -> Option<(u8, u8, u8)> {
        match self {
            RepeatIndicator::None => None,
            RepeatIndicator::CorrectSoFar => Some((255, 205, 15)),
            RepeatIndicator::Error => Some((255, 125, 125)),
        }
    }
}

impl From<MatchStatus> for RepeatIndicator {
    fn from(status: MatchStatus) -> Self {
        match status {
            MatchStatus::Empty | MatchStatus::ExactMatch => RepeatIndicator::None,
            MatchStatus::MatchingPrefix => RepeatIndicator::CorrectSoFar,
            MatchStatus::Mismatch => RepeatIndicator::Error,
        }
    }
}
