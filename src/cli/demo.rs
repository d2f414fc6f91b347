use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::edit::TextCursor;
use crate::error::Result;
use crate::field::{FieldId, Role};
use crate::generator::PasswordGenerator;
use crate::pairing::{FieldEvent, GeneratorTrigger, PasswordForm};
use crate::popup::{GeneratorPopup, PopupAction};
use crate::settings::{load_settings, Settings};
use crate::status::{MatchStatus, RepeatIndicator};
use crate::tui::{centered_rect, map_key, render_field, run_view, FieldCommand, FieldView, FormView, Theme, ViewAction};

const PRIMARY: usize = 0;
const REPEAT: usize = 1;

struct DemoForm {
    form: PasswordForm,
    ids: [FieldId; 2],
    cursors: [TextCursor; 2],
    focus: usize,
    popup: Option<GeneratorPopup>,
    generator: PasswordGenerator,
    theme: Theme,
    /// Latest status announced by the form.
    status: Rc<Cell<Option<MatchStatus>>>,
    notice: Option<&'static str>,
    confirmed: bool,
}

impl DemoForm {
    fn new(settings: &Settings) -> Result<Self> {
        let mut form = PasswordForm::new(settings.security.passwords_repeat);
        let status = Rc::new(Cell::new(None));
        let seen = Rc::clone(&status);
        form.subscribe(move |event| {
            debug!(?event, "form event");
            if let FieldEvent::StatusChanged { status, .. } = event {
                seen.set(Some(*status));
            }
        });

        let primary = form.add_field();
        let repeat = form.add_field();
        form.link(primary, repeat)?;
        form.enable_password_generator(primary, false)?;

        Ok(Self {
            form,
            ids: [primary, repeat],
            cursors: [TextCursor::default(); 2],
            focus: PRIMARY,
            popup: None,
            generator: settings.generator.clone(),
            theme: Theme::default(),
            status,
            notice: None,
            confirmed: false,
        })
    }

    fn focused(&self) -> FieldId {
        self.ids[self.focus]
    }

    fn repeat_linked(&self) -> bool {
        self.form
            .field(self.ids[REPEAT])
            .map(|f| matches!(f.role(), Role::Repeat { .. }))
            .unwrap_or(false)
    }

    /// Focus can only rest on a field that is linked and enabled.
    fn focusable(&self, idx: usize) -> bool {
        (idx == PRIMARY || self.repeat_linked())
            && self.form.field(self.ids[idx]).map(|f| f.is_enabled()).unwrap_or(false)
    }

    fn move_focus(&mut self) {
        let next = if self.focus == PRIMARY { REPEAT } else { PRIMARY };
        if self.focusable(next) {
            self.focus = next;
        }
    }

    /// Drop or restore the repeat field. Without it the primary alone is confirmed.
    fn toggle_repeat(&mut self) -> Result<()> {
        let [primary, repeat] = self.ids;
        if self.repeat_linked() {
            self.form.unlink(primary)?;
            self.status.set(None);
            self.focus = PRIMARY;
            self.notice = Some("Repeat check off");
        } else {
            self.form.link(primary, repeat)?;
            let shown = self.form.is_shown(primary)?;
            self.form.toggle_visibility(primary, shown)?;
            self.notice = Some("Repeat check on");
        }
        Ok(())
    }

    fn clamp_cursors(&mut self) -> Result<()> {
        for (cursor, id) in self.cursors.iter_mut().zip(self.ids) {
            cursor.clamp(self.form.text(id)?);
        }
        Ok(())
    }

    fn edit(&mut self, code: KeyCode) -> Result<()> {
        let id = self.focused();
        if !self.form.field(id)?.is_enabled() {
            return Ok(());
        }
        let mut text = self.form.text(id)?.to_string();
        if let Some(mut edited) = self.cursors[self.focus].apply(&text, code) {
            self.form.set_text(id, &edited)?;
            edited.zeroize();
        }
        text.zeroize();
        Ok(())
    }

    fn submit(&mut self) -> Result<ViewAction> {
        if !self.repeat_linked() {
            if self.form.text(self.ids[PRIMARY])?.is_empty() {
                self.notice = Some("Enter a password");
                return Ok(ViewAction::Continue);
            }
            self.confirmed = true;
            return Ok(ViewAction::Close);
        }
        match self.form.status(self.ids[REPEAT])? {
            Some(MatchStatus::ExactMatch) => {
                self.confirmed = true;
                return Ok(ViewAction::Close);
            }
            Some(MatchStatus::Empty) | None => self.notice = Some("Repeat the password to confirm it"),
            Some(_) => self.notice = Some("Passwords do not match"),
        }
        Ok(ViewAction::Continue)
    }

    fn handle_popup_key(&mut self, code: KeyCode) -> Result<()> {
        let Some(popup) = self.popup.as_mut() else {
            return Ok(());
        };
        match popup.handle_key(code) {
            PopupAction::Continue => {}
            PopupAction::Apply => {
                let mut password = popup.candidate().to_string();
                let target = popup.target();
                self.generator = popup.options().clone();
                self.popup = None;
                self.form.apply_generated(target, &password)?;
                password.zeroize();
                for (cursor, id) in self.cursors.iter_mut().zip(self.ids) {
                    *cursor = TextCursor::at_end(self.form.text(id)?);
                }
                info!(field = %target, "generated password applied");
            }
            PopupAction::Close => self.popup = None,
        }
        Ok(())
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let form_area = centered_rect(72, 9, area);
        let [header_area, _gap, primary_area, repeat_area, tooltip_area, notice_area, _gap2, hints_area, _pad] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .areas(form_area);

        frame.render_widget(
            Paragraph::new(Span::styled("Set a password", self.theme.header)).alignment(Alignment::Center),
            header_area,
        );

        let rows = [("Password:", primary_area), ("Repeat:", repeat_area)];
        let visible_rows = if self.repeat_linked() { 2 } else { 1 };
        for (idx, (label, row)) in rows.into_iter().enumerate().take(visible_rows) {
            let id = self.ids[idx];
            let Ok(field) = self.form.field(id) else {
                continue;
            };
            let view = FieldView {
                label,
                field,
                status: self.form.status(id).ok().flatten(),
                cursor: (self.focus == idx && self.popup.is_none()).then(|| self.cursors[idx].pos()),
            };
            render_field(frame, row, &self.theme, &view);
        }

        let tooltip = self
            .status
            .get()
            .map(RepeatIndicator::from)
            .and_then(RepeatIndicator::tooltip)
            .unwrap_or("");
        frame.render_widget(Paragraph::new(tooltip).style(self.theme.footer), tooltip_area);

        if let Some(notice) = self.notice {
            frame.render_widget(
                Paragraph::new(Span::styled(notice, Style::new().fg(Color::Red))).alignment(Alignment::Center),
                notice_area,
            );
        }

        frame.render_widget(
            Paragraph::new(" Tab=next ^H/F2=show ^G/F3=gen F4=auto-sync F5=repeat Enter=ok Esc=quit")
                .style(self.theme.footer)
                .alignment(Alignment::Center),
            hints_area,
        );
    }
}

impl FormView for DemoForm {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        self.draw_form(frame, area);
        if let Some(popup) = &self.popup {
            popup.draw(frame, area, &self.theme);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<ViewAction> {
        if self.popup.is_some() {
            self.handle_popup_key(key.code)?;
            return Ok(ViewAction::Continue);
        }

        self.notice = None;
        match map_key(key) {
            FieldCommand::ToggleVisibility => {
                let primary = self.ids[PRIMARY];
                let shown = !self.form.is_shown(primary)?;
                self.form.toggle_visibility(primary, shown)?;
                if !self.form.field(self.focused())?.is_enabled() {
                    self.focus = PRIMARY;
                }
            }
            FieldCommand::Generate => match self.form.trigger_generator(self.focused())? {
                GeneratorTrigger::Popup => {
                    let target = self.focused();
                    let shown = self.form.is_shown(target)?;
                    self.popup = Some(GeneratorPopup::open(target, self.generator.clone(), shown));
                }
                GeneratorTrigger::Signal => {}
                GeneratorTrigger::Unavailable => self.notice = Some("No generator for this field"),
            },
            FieldCommand::ToggleAutoSync => {
                let enabled = !self.form.auto_sync();
                self.form.set_auto_sync(enabled);
                if !self.focusable(self.focus) {
                    self.focus = PRIMARY;
                }
                self.notice = Some(if enabled { "Auto-sync on" } else { "Auto-sync off" });
            }
            FieldCommand::ToggleRepeat => self.toggle_repeat()?,
            FieldCommand::NextField | FieldCommand::PrevField => self.move_focus(),
            FieldCommand::Submit => return self.submit(),
            FieldCommand::Cancel => return Ok(ViewAction::Close),
            FieldCommand::Edit(code) => self.edit(code)?,
        }
        self.clamp_cursors()?;
        Ok(ViewAction::Continue)
    }
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let mut demo = DemoForm::new(&settings)?;
    run_view(&mut demo)?;

    if demo.confirmed {
        let length = demo.form.text(demo.ids[PRIMARY])?.chars().count();
        println!("Password confirmed ({length} characters).");
    } else {
        println!("Cancelled.");
    }
    Ok(())
}
