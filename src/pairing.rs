use tracing::{debug, warn};

use crate::error::{PassEditError, Result};
use crate::field::{FieldId, GeneratorMode, PasswordField, Role, Visibility};
use crate::status::{compute_status, MatchStatus};

/// Notification sent to observers after a form operation. Never carries password text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    TextChanged { field: FieldId },
    VisibilityChanged { field: FieldId, shown: bool },
    EnabledChanged { field: FieldId, enabled: bool },
    StatusChanged { field: FieldId, status: MatchStatus },
    GeneratorToggled { field: FieldId },
}

/// What the host should do after the generator action of a field fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorTrigger {
    Popup,
    Signal,
    Unavailable,
}

type Listener = Box<dyn FnMut(&FieldEvent)>;

/// Owns password fields and the repeat pairings between them.
///
/// A field is either standalone, the primary of exactly one repeat field, or
/// the repeat of exactly one primary. Every text or visibility change goes
/// through the form so the repeat status is kept current and observers hear
/// about it.
pub struct PasswordForm {
    fields: Vec<PasswordField>,
    last_status: Vec<Option<MatchStatus>>,
    auto_sync: bool,
    listeners: Vec<Listener>,
}

impl PasswordForm {
    pub fn new(auto_sync: bool) -> Self {
        Self {
            fields: Vec::new(),
            last_status: Vec::new(),
            auto_sync,
            listeners: Vec::new(),
        }
    }

    pub fn add_field(&mut self) -> FieldId {
        self.fields.push(PasswordField::new());
        self.last_status.push(None);
        FieldId(self.fields.len() - 1)
    }

    pub fn field(&self, id: FieldId) -> Result<&PasswordField> {
        self.fields.get(id.0).ok_or(PassEditError::UnknownField(id))
    }

    pub fn text(&self, id: FieldId) -> Result<&str> {
        Ok(self.field(id)?.text())
    }

    pub fn is_shown(&self, id: FieldId) -> Result<bool> {
        Ok(self.field(id)?.is_shown())
    }

    pub fn auto_sync(&self) -> bool {
        self.auto_sync
    }

    /// Switch auto-sync mode. Pairs currently shown in cleartext pick up the
    /// new mode right away: the repeat is locked and mirrored when turning it
    /// on, and unlocked when turning it off.
    pub fn set_auto_sync(&mut self, enabled: bool) {
        if self.auto_sync == enabled {
            return;
        }
        debug!(enabled, "auto-sync mode changed");
        self.auto_sync = enabled;

        for idx in 0..self.fields.len() {
            let Role::Primary { repeat } = self.fields[idx].role() else {
                continue;
            };
            if !self.fields[idx].is_shown() {
                continue;
            }
            let primary = FieldId(idx);
            let repeat_enabled = !enabled;
            if self.fields[repeat.0].set_enabled(repeat_enabled) {
                self.emit(FieldEvent::EnabledChanged {
                    field: repeat,
                    enabled: repeat_enabled,
                });
            }
            if enabled {
                self.mirror_text(primary, repeat);
            }
            self.refresh_status(repeat);
        }
    }

    /// Register an observer. Observers are called in registration order.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&FieldEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Pair `primary` with `repeat`. Re-linking the same pair is a no-op.
    pub fn link(&mut self, primary: FieldId, repeat: FieldId) -> Result<()> {
        if primary == repeat {
            return Err(PassEditError::SelfLink(primary));
        }
        let primary_role = self.field(primary)?.role();
        let repeat_role = self.field(repeat)?.role();

        if primary_role == (Role::Primary { repeat }) && repeat_role == (Role::Repeat { primary }) {
            return Ok(());
        }
        if primary_role != Role::Standalone {
            warn!(%primary, %repeat, "link refused, primary already paired");
            return Err(PassEditError::AlreadyLinked(primary));
        }
        if repeat_role != Role::Standalone {
            warn!(%primary, %repeat, "link refused, repeat already paired");
            return Err(PassEditError::AlreadyLinked(repeat));
        }

        self.fields[primary.0].set_role(Role::Primary { repeat });
        let repeat_field = &mut self.fields[repeat.0];
        repeat_field.set_role(Role::Repeat { primary });
        repeat_field.set_generator_mode(GeneratorMode::Disabled);
        debug!(%primary, %repeat, "fields linked");

        self.refresh_status(repeat);
        Ok(())
    }

    /// Dissolve the pairing `id` takes part in. The former repeat becomes
    /// standalone and editable again.
    pub fn unlink(&mut self, id: FieldId) -> Result<()> {
        let (primary, repeat) = match self.field(id)?.role() {
            Role::Standalone => return Ok(()),
            Role::Primary { repeat } => (id, repeat),
            Role::Repeat { primary } => (primary, id),
        };
        self.fields[primary.0].set_role(Role::Standalone);
        self.fields[repeat.0].set_role(Role::Standalone);
        self.last_status[repeat.0] = None;
        if self.fields[repeat.0].set_enabled(true) {
            self.emit(FieldEvent::EnabledChanged {
                field: repeat,
                enabled: true,
            });
        }
        debug!(%primary, %repeat, "fields unlinked");
        Ok(())
    }

    /// Set the text of a field according to its role.
    pub fn set_text(&mut self, id: FieldId, text: &str) -> Result<()> {
        match self.field(id)?.role() {
            Role::Repeat { .. } => self.set_repeat_text(id, text),
            Role::Standalone | Role::Primary { .. } => self.set_primary_text(id, text),
        }
    }

    /// Update a primary (or standalone) field. With auto-sync on and the
    /// repeat shown in cleartext, the repeat mirrors the new text.
    pub fn set_primary_text(&mut self, primary: FieldId, text: &str) -> Result<()> {
        let role = self.field(primary)?.role();
        if let Role::Repeat { .. } = role {
            return Err(PassEditError::NotPrimary(primary));
        }
        if self.fields[primary.0].replace_text(text) {
            self.emit(FieldEvent::TextChanged { field: primary });
        }
        if let Role::Primary { repeat } = role {
            if self.auto_sync && self.fields[repeat.0].is_shown() {
                self.mirror_text(primary, repeat);
            }
            self.refresh_status(repeat);
        }
        Ok(())
    }

    pub fn set_repeat_text(&mut self, repeat: FieldId, text: &str) -> Result<()> {
        if !matches!(self.field(repeat)?.role(), Role::Repeat { .. }) {
            return Err(PassEditError::NotRepeat(repeat));
        }
        if self.fields[repeat.0].replace_text(text) {
            self.emit(FieldEvent::TextChanged { field: repeat });
        }
        self.refresh_status(repeat);
        Ok(())
    }

    /// Current status of a repeat field, `None` for fields that are not repeats.
    pub fn status(&self, id: FieldId) -> Result<Option<MatchStatus>> {
        let field = self.field(id)?;
        Ok(match field.role() {
            Role::Repeat { primary } => Some(compute_status(self.fields[primary.0].text(), field.text())),
            _ => None,
        })
    }

    /// Show or hide a password. Called on a repeat field, acts on its primary.
    pub fn toggle_visibility(&mut self, id: FieldId, shown: bool) -> Result<()> {
        let primary = match self.field(id)?.role() {
            Role::Repeat { primary } => primary,
            _ => id,
        };
        let visibility = Visibility::from_shown(shown);
        if self.fields[primary.0].set_visibility(visibility) {
            self.emit(FieldEvent::VisibilityChanged { field: primary, shown });
        }

        let Role::Primary { repeat } = self.fields[primary.0].role() else {
            return Ok(());
        };
        if self.fields[repeat.0].set_visibility(visibility) {
            self.emit(FieldEvent::VisibilityChanged { field: repeat, shown });
        }
        let enabled = !(self.auto_sync && shown);
        if self.fields[repeat.0].set_enabled(enabled) {
            self.emit(FieldEvent::EnabledChanged { field: repeat, enabled });
        }
        if self.auto_sync && shown {
            self.mirror_text(primary, repeat);
        }
        debug!(%primary, %repeat, shown, auto_sync = self.auto_sync, "visibility toggled");
        self.refresh_status(repeat);
        Ok(())
    }

    pub fn enable_password_generator(&mut self, id: FieldId, signal_only: bool) -> Result<()> {
        let field = self.field(id)?;
        if !field.shows_toggle_action() {
            return Err(PassEditError::NotPrimary(id));
        }
        let mode = if signal_only {
            GeneratorMode::SignalOnly
        } else {
            GeneratorMode::Popup
        };
        self.fields[id.0].set_generator_mode(mode);
        Ok(())
    }

    pub fn trigger_generator(&mut self, id: FieldId) -> Result<GeneratorTrigger> {
        let field = self.field(id)?;
        if !field.shows_generator_action() {
            return Ok(GeneratorTrigger::Unavailable);
        }
        Ok(match field.generator_mode() {
            GeneratorMode::Disabled => GeneratorTrigger::Unavailable,
            GeneratorMode::Popup => GeneratorTrigger::Popup,
            GeneratorMode::SignalOnly => {
                self.emit(FieldEvent::GeneratorToggled { field: id });
                GeneratorTrigger::Signal
            }
        })
    }

    /// Put a generated password into a primary and its repeat partner.
    pub fn apply_generated(&mut self, id: FieldId, password: &str) -> Result<()> {
        self.set_primary_text(id, password)?;
        if let Role::Primary { repeat } = self.fields[id.0].role() {
            self.set_repeat_text(repeat, password)?;
        }
        Ok(())
    }

    fn mirror_text(&mut self, from: FieldId, to: FieldId) {
        let (source, target) = if from.0 < to.0 {
            let (left, right) = self.fields.split_at_mut(to.0);
            (&left[from.0], &mut right[0])
        } else {
            let (left, right) = self.fields.split_at_mut(from.0);
            (&right[0], &mut left[to.0])
        };
        if target.replace_text(source.text()) {
            self.emit(FieldEvent::TextChanged { field: to });
        }
    }

    fn refresh_status(&mut self, repeat: FieldId) {
        let Ok(Some(status)) = self.status(repeat) else {
            return;
        };
        if self.last_status[repeat.0] != Some(status) {
            self.last_status[repeat.0] = Some(status);
            debug!(field = %repeat, %status, "repeat status changed");
            self.emit(FieldEvent::StatusChanged { field: repeat, status });
        }
    }

    fn emit(&mut self, event: FieldEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn paired(auto_sync: bool) -> (PasswordForm, FieldId, FieldId) {
        let mut form = PasswordForm::new(auto_sync);
        let primary = form.add_field();
        let repeat = form.add_field();
        form.link(primary, repeat).unwrap();
        (form, primary, repeat)
    }

    fn recorder(form: &mut PasswordForm) -> Rc<RefCell<Vec<FieldEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        form.subscribe(move |e| sink.borrow_mut().push(*e));
        events
    }

    #[test]
    fn link_sets_roles_and_hides_repeat_actions() {
        let (mut form, primary, repeat) = paired(false);
        form.enable_password_generator(primary, false).unwrap();
        assert_eq!(form.field(primary).unwrap().role(), Role::Primary { repeat });
        assert_eq!(form.field(repeat).unwrap().role(), Role::Repeat { primary });
        assert!(form.field(primary).unwrap().shows_generator_action());
        assert!(!form.field(repeat).unwrap().shows_toggle_action());
        assert!(matches!(
            form.enable_password_generator(repeat, false),
            Err(PassEditError::NotPrimary(_))
        ));
    }

    #[test]
    fn second_link_on_same_repeat_fails() {
        let (mut form, _primary, repeat) = paired(false);
        let other = form.add_field();
        let err = form.link(other, repeat).unwrap_err();
        assert!(matches!(err, PassEditError::AlreadyLinked(id) if id == repeat));
    }

    #[test]
    fn linking_a_paired_primary_again_fails() {
        let (mut form, primary, _repeat) = paired(false);
        let other = form.add_field();
        assert!(matches!(form.link(primary, other), Err(PassEditError::AlreadyLinked(id)) if id == primary));
        // A repeat cannot become a primary either.
        let (mut form, _p, repeat) = paired(false);
        let other = form.add_field();
        assert!(matches!(form.link(repeat, other), Err(PassEditError::AlreadyLinked(id)) if id == repeat));
    }

    #[test]
    fn relinking_same_pair_is_ok() {
        let (mut form, primary, repeat) = paired(false);
        assert!(form.link(primary, repeat).is_ok());
    }

    #[test]
    fn self_and_unknown_links_fail() {
        let mut form = PasswordForm::new(false);
        let a = form.add_field();
        assert!(matches!(form.link(a, a), Err(PassEditError::SelfLink(_))));
        assert!(matches!(form.link(a, FieldId(9)), Err(PassEditError::UnknownField(_))));
    }

    #[test]
    fn unlink_allows_relinking() {
        let (mut form, primary, repeat) = paired(false);
        let other = form.add_field();
        form.unlink(repeat).unwrap();
        assert_eq!(form.field(primary).unwrap().role(), Role::Standalone);
        assert_eq!(form.status(repeat).unwrap(), None);
        form.link(other, repeat).unwrap();
        assert_eq!(form.field(repeat).unwrap().role(), Role::Repeat { primary: other });
    }

    #[test]
    fn status_tracks_both_fields() {
        let (mut form, primary, repeat) = paired(false);
        assert_eq!(form.status(repeat).unwrap(), Some(MatchStatus::Empty));
        form.set_primary_text(primary, "Sunshine1").unwrap();
        form.set_repeat_text(repeat, "Sun").unwrap();
        assert_eq!(form.status(repeat).unwrap(), Some(MatchStatus::MatchingPrefix));
        form.set_repeat_text(repeat, "Sunshine1").unwrap();
        assert_eq!(form.status(repeat).unwrap(), Some(MatchStatus::ExactMatch));
        form.set_primary_text(primary, "Moonshine").unwrap();
        assert_eq!(form.status(repeat).unwrap(), Some(MatchStatus::Mismatch));
        assert_eq!(form.status(primary).unwrap(), None);
    }

    #[test]
    fn status_events_fire_only_on_change() {
        let (mut form, primary, repeat) = paired(false);
        let events = recorder(&mut form);
        form.set_primary_text(primary, "abc").unwrap();
        form.set_repeat_text(repeat, "a").unwrap();
        form.set_repeat_text(repeat, "ab").unwrap();
        form.set_repeat_text(repeat, "abc").unwrap();

        let statuses: Vec<MatchStatus> = events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                FieldEvent::StatusChanged { status, .. } => Some(*status),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![MatchStatus::MatchingPrefix, MatchStatus::ExactMatch]);
    }

    #[test]
    fn set_text_dispatches_by_role() {
        let (mut form, primary, repeat) = paired(false);
        form.set_text(primary, "abc").unwrap();
        form.set_text(repeat, "x").unwrap();
        assert_eq!(form.text(primary).unwrap(), "abc");
        assert_eq!(form.status(repeat).unwrap(), Some(MatchStatus::Mismatch));
        assert!(matches!(form.set_repeat_text(primary, "a"), Err(PassEditError::NotRepeat(_))));
        assert!(matches!(form.set_primary_text(repeat, "a"), Err(PassEditError::NotPrimary(_))));
    }

    #[test]
    fn auto_sync_show_disables_and_mirrors_repeat() {
        let (mut form, primary, repeat) = paired(true);
        form.set_primary_text(primary, "secret").unwrap();
        form.set_repeat_text(repeat, "sec").unwrap();

        form.toggle_visibility(primary, true).unwrap();
        let r = form.field(repeat).unwrap();
        assert!(r.is_shown());
        assert!(!r.is_enabled());
        assert_eq!(r.text(), "secret");
        assert_eq!(form.status(repeat).unwrap(), Some(MatchStatus::ExactMatch));

        // While shown, primary edits are mirrored.
        form.set_primary_text(primary, "secret2").unwrap();
        assert_eq!(form.text(repeat).unwrap(), "secret2");

        form.toggle_visibility(primary, false).unwrap();
        let r = form.field(repeat).unwrap();
        assert!(!r.is_shown());
        assert!(r.is_enabled());

        // Hidden again: no more mirroring.
        form.set_primary_text(primary, "secret23").unwrap();
        assert_eq!(form.text(repeat).unwrap(), "secret2");
        assert_eq!(form.status(repeat).unwrap(), Some(MatchStatus::MatchingPrefix));
    }

    #[test]
    fn without_auto_sync_repeat_stays_independent() {
        let (mut form, primary, repeat) = paired(false);
        form.set_primary_text(primary, "secret").unwrap();
        form.toggle_visibility(primary, true).unwrap();
        let r = form.field(repeat).unwrap();
        assert!(r.is_shown());
        assert!(r.is_enabled());
        assert_eq!(r.text(), "");
        form.set_primary_text(primary, "other").unwrap();
        assert_eq!(form.text(repeat).unwrap(), "");
    }

    #[test]
    fn toggle_on_repeat_acts_on_primary() {
        let (mut form, primary, repeat) = paired(false);
        form.toggle_visibility(repeat, true).unwrap();
        assert!(form.is_shown(primary).unwrap());
        assert!(form.is_shown(repeat).unwrap());
    }

    #[test]
    fn toggle_emits_visibility_and_enabled_events() {
        let (mut form, primary, repeat) = paired(true);
        let events = recorder(&mut form);
        form.toggle_visibility(primary, true).unwrap();
        let events = events.borrow();
        assert!(events.contains(&FieldEvent::VisibilityChanged { field: primary, shown: true }));
        assert!(events.contains(&FieldEvent::VisibilityChanged { field: repeat, shown: true }));
        assert!(events.contains(&FieldEvent::EnabledChanged { field: repeat, enabled: false }));
    }

    #[test]
    fn generator_trigger_modes() {
        let (mut form, primary, repeat) = paired(false);
        assert_eq!(form.trigger_generator(primary).unwrap(), GeneratorTrigger::Unavailable);
        form.enable_password_generator(primary, false).unwrap();
        assert_eq!(form.trigger_generator(primary).unwrap(), GeneratorTrigger::Popup);
        assert_eq!(form.trigger_generator(repeat).unwrap(), GeneratorTrigger::Unavailable);

        let events = recorder(&mut form);
        form.enable_password_generator(primary, true).unwrap();
        assert_eq!(form.trigger_generator(primary).unwrap(), GeneratorTrigger::Signal);
        assert_eq!(*events.borrow(), vec![FieldEvent::GeneratorToggled { field: primary }]);
    }

    #[test]
    fn apply_generated_fills_both_fields() {
        let (mut form, primary, repeat) = paired(false);
        form.set_repeat_text(repeat, "old").unwrap();
        form.apply_generated(primary, "N3w-P4ss").unwrap();
        assert_eq!(form.text(primary).unwrap(), "N3w-P4ss");
        assert_eq!(form.text(repeat).unwrap(), "N3w-P4ss");
        assert_eq!(form.status(repeat).unwrap(), Some(MatchStatus::ExactMatch));
    }

    #[test]
    fn switching_auto_sync_while_shown_updates_repeat() {
        let (mut form, primary, repeat) = paired(true);
        form.set_primary_text(primary, "abc").unwrap();
        form.toggle_visibility(primary, true).unwrap();
        assert!(!form.field(repeat).unwrap().is_enabled());

        let events = recorder(&mut form);
        form.set_auto_sync(false);
        assert!(form.field(repeat).unwrap().is_enabled());
        assert!(events
            .borrow()
            .contains(&FieldEvent::EnabledChanged { field: repeat, enabled: true }));

        // Unlocked: primary edits no longer reach the repeat, which is editable.
        form.set_primary_text(primary, "abcd").unwrap();
        assert_eq!(form.text(repeat).unwrap(), "abc");
        form.set_repeat_text(repeat, "abcd").unwrap();
        assert_eq!(form.status(repeat).unwrap(), Some(MatchStatus::ExactMatch));

        form.set_repeat_text(repeat, "x").unwrap();
        events.borrow_mut().clear();
        form.set_auto_sync(true);
        let r = form.field(repeat).unwrap();
        assert!(!r.is_enabled());
        assert_eq!(r.text(), "abcd");
        assert_eq!(form.status(repeat).unwrap(), Some(MatchStatus::ExactMatch));
        let events = events.borrow();
        assert!(events.contains(&FieldEvent::EnabledChanged { field: repeat, enabled: false }));
        assert!(events.contains(&FieldEvent::TextChanged { field: repeat }));
        assert!(events.contains(&FieldEvent::StatusChanged {
            field: repeat,
            status: MatchStatus::ExactMatch
        }));
    }

    #[test]
    fn switching_auto_sync_while_hidden_changes_nothing() {
        let (mut form, primary, repeat) = paired(false);
        form.set_primary_text(primary, "abc").unwrap();
        let events = recorder(&mut form);
        form.set_auto_sync(true);
        assert!(form.auto_sync());
        assert!(form.field(repeat).unwrap().is_enabled());
        assert_eq!(form.text(repeat).unwrap(), "");
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn unlink_reenables_disabled_repeat() {
        let (mut form, primary, repeat) = paired(true);
        form.toggle_visibility(primary, true).unwrap();
        assert!(!form.field(repeat).unwrap().is_enabled());
        form.unlink(primary).unwrap();
        assert!(form.field(repeat).unwrap().is_enabled());
        assert_eq!(form.field(repeat).unwrap().role(), Role::Standalone);
    }
}
