use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use zeroize::Zeroize;

use crate::field::FieldId;
use crate::generator::PasswordGenerator;
use crate::tui::{centered_rect, Theme};

pub enum PopupAction {
    Continue,
    /// Apply the candidate to the target field.
    Apply,
    Close,
}

/// Generator popup opened from a field's generate action.
pub struct GeneratorPopup {
    target: FieldId,
    options: PasswordGenerator,
    candidate: String,
    shown: bool,
    error: Option<String>,
}

impl GeneratorPopup {
    /// `shown` follows the target field's visibility.
    pub fn open(target: FieldId, options: PasswordGenerator, shown: bool) -> Self {
        let mut popup = Self {
            target,
            options,
            candidate: String::new(),
            shown,
            error: None,
        };
        popup.regenerate();
        popup
    }

    pub fn target(&self) -> FieldId {
        self.target
    }

    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    pub fn options(&self) -> &PasswordGenerator {
        &self.options
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn regenerate(&mut self) {
        self.candidate.zeroize();
        match self.options.generate() {
            Ok(pw) => {
                self.candidate = pw;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> PopupAction {
        match code {
            KeyCode::Esc => return PopupAction::Close,
            KeyCode::Enter => {
                if self.error.is_none() && !self.candidate.is_empty() {
                    return PopupAction::Apply;
                }
            }
            KeyCode::Char('r') => self.regenerate(),
            KeyCode::Char('+') | KeyCode::Right => {
                self.options.adjust_length(1);
                self.regenerate();
            }
            KeyCode::Char('-') | KeyCode::Left => {
                self.options.adjust_length(-1);
                self.regenerate();
            }
            KeyCode::Char('l') => self.toggle(|o| &mut o.lower),
            KeyCode::Char('u') => self.toggle(|o| &mut o.upper),
            KeyCode::Char('d') => self.toggle(|o| &mut o.digits),
            KeyCode::Char('s') => self.toggle(|o| &mut o.special),
            KeyCode::Char('x') => self.toggle(|o| &mut o.exclude_lookalike),
            KeyCode::Char('v') => self.shown = !self.shown,
            _ => {}
        }
        PopupAction::Continue
    }

    fn toggle(&mut self, flag: impl FnOnce(&mut PasswordGenerator) -> &mut bool) {
        let value = flag(&mut self.options);
        *value = !*value;
        self.regenerate();
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = centered_rect(60, 11, area);
        let block = Block::default()
            .title(" Generate password ")
            .borders(Borders::ALL)
            .border_style(theme.popup_border);
        let inner = block.inner(popup_area);
        frame.render_widget(Clear, popup_area);
        frame.render_widget(block, popup_area);

        let [password_area, info_area, _gap, classes_area, error_area, _gap2, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
            ])
            .areas(inner);

        let password = if self.shown {
            Span::styled(self.candidate.as_str(), theme.input_focused)
        } else {
            Span::styled(crate::tui::display_text(&self.candidate, false, None), theme.input_focused)
        };
        frame.render_widget(Paragraph::new(password), password_area);

        frame.render_widget(
            Paragraph::new(format!(
                "Length: {}   Entropy: {:.0} bit",
                self.options.length,
                self.options.entropy_bits()
            )),
            info_area,
        );

        let o = &self.options;
        let classes = vec![
            Line::from(vec![
                checkbox("l", "a-z", o.lower),
                checkbox("u", "A-Z", o.upper),
                checkbox("d", "0-9", o.digits),
            ]),
            Line::from(vec![
                checkbox("s", "/*_&...", o.special),
                checkbox("x", "exclude lookalikes", o.exclude_lookalike),
            ]),
        ];
        frame.render_widget(Paragraph::new(classes), classes_area);

        if let Some(err) = self.error() {
            frame.render_widget(
                Paragraph::new(Span::styled(err, Style::new().fg(Color::Red))),
                error_area,
            );
        }

        frame.render_widget(
            Paragraph::new(" Enter=apply  r=regenerate  +/-=length  v=show  Esc=close")
                .style(theme.footer),
            hints_area,
        );
    }
}

fn checkbox(key: &str, label: &str, checked: bool) -> Span<'static> {
    let mark = if checked { "x" } else { " " };
    let style = if checked {
        Style::new().add_modifier(Modifier::BOLD)
    } else {
        Style::new()
    };
    Span::styled(format!("[{mark}] {label} ({key})  "), style)
}

impl Drop for GeneratorPopup {
    fn drop(&mut self) {
        self.candidate.zeroize();
    }
}
