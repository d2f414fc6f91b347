use std::fmt;

use zeroize::Zeroize;

/// Handle to a field inside a `PasswordForm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub(crate) usize);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Shown,
}

impl Visibility {
    pub fn from_shown(shown: bool) -> Self {
        if shown {
            Visibility::Shown
        } else {
            Visibility::Hidden
        }
    }

    pub fn is_shown(self) -> bool {
        self == Visibility::Shown
    }
}

/// Which side of a repeat pairing a field is on, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Standalone,
    Primary { repeat: FieldId },
    Repeat { primary: FieldId },
}

/// How the generator action of a field reacts when triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorMode {
    Disabled,
    /// The host opens the generator popup for this field.
    Popup,
    /// Only a `GeneratorToggled` event is emitted; the host decides what to show.
    SignalOnly,
}

#[derive(Debug)]
pub struct PasswordField {
    text: String,
    visibility: Visibility,
    enabled: bool,
    role: Role,
    generator: GeneratorMode,
}

impl PasswordField {
    pub(crate) fn new() -> Self {
        Self {
            text: String::new(),
            visibility: Visibility::Hidden,
            enabled: true,
            role: Role::Standalone,
            generator: GeneratorMode::Disabled,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_shown(&self) -> bool {
        self.visibility.is_shown()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn generator_mode(&self) -> GeneratorMode {
        self.generator
    }

    /// Repeat fields hide the visibility toggle; it is driven by the primary.
    pub fn shows_toggle_action(&self) -> bool {
        !matches!(self.role, Role::Repeat { .. })
    }

    pub fn shows_generator_action(&self) -> bool {
        self.shows_toggle_action() && self.generator != GeneratorMode::Disabled
    }

    /// Replace the text, wiping the old buffer. Returns false if nothing changed.
    pub(crate) fn replace_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text.zeroize();
        self.text.push_str(text);
        true
    }

    pub(crate) fn set_visibility(&mut self, visibility: Visibility) -> bool {
        let changed = self.visibility != visibility;
        self.visibility = visibility;
        changed
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        changed
    }

    pub(crate) fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub(crate) fn set_generator_mode(&mut self, mode: GeneratorMode) {
        self.generator = mode;
    }
}

impl Drop for PasswordField {
    fn drop(&mut self) {
        self.text.zeroize();
    }
}
