use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::error::Result;
use crate::field::PasswordField;
use crate::status::{MatchStatus, RepeatIndicator};

pub const MASK_CHAR: char = '\u{25cf}';
pub const CURSOR_CHAR: char = '\u{2588}';

const LABEL_WIDTH: u16 = 18;

/// Styles injected into the field renderer, in place of toolkit stylesheets.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub footer: Style,
    pub label: Style,
    pub label_focused: Style,
    pub input: Style,
    pub input_focused: Style,
    pub input_disabled: Style,
    pub action: Style,
    pub popup_border: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header: Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            footer: Style::new().fg(Color::DarkGray),
            label: Style::new(),
            label_focused: Style::new().add_modifier(Modifier::BOLD),
            input: Style::new().fg(Color::Gray),
            input_focused: Style::new()
                .bg(Color::Rgb(40, 40, 60))
                .add_modifier(Modifier::BOLD),
            input_disabled: Style::new().fg(Color::DarkGray),
            action: Style::new().fg(Color::Cyan),
            popup_border: Style::new().fg(Color::Yellow),
        }
    }
}

impl Theme {
    /// Input style with the repeat feedback background applied on top.
    pub fn input_style(&self, focused: bool, enabled: bool, indicator: RepeatIndicator) -> Style {
        let base = if !enabled {
            self.input_disabled
        } else if focused {
            self.input_focused
        } else {
            self.input
        };
        match indicator.rgb() {
            Some((r, g, b)) => base.bg(Color::Rgb(r, g, b)).fg(Color::Black),
            None => base,
        }
    }
}

pub fn indicator_mark(indicator: RepeatIndicator) -> &'static str {
    match indicator {
        RepeatIndicator::None => " ",
        RepeatIndicator::CorrectSoFar => "\u{2713}",
        RepeatIndicator::Error => "\u{2717}",
    }
}

/// Text as drawn in the input box: masked unless shown, with an optional block cursor.
pub fn display_text(value: &str, shown: bool, cursor: Option<usize>) -> String {
    let mut display = if shown {
        value.to_string()
    } else {
        MASK_CHAR.to_string().repeat(value.chars().count())
    };
    if let Some(cursor_pos) = cursor {
        let byte_pos = display
            .char_indices()
            .nth(cursor_pos)
            .map(|(i, _)| i)
            .unwrap_or(display.len());
        display.insert(byte_pos, CURSOR_CHAR);
    }
    display
}

/// Everything the renderer needs to draw one password field.
pub struct FieldView<'a> {
    pub label: &'a str,
    pub field: &'a PasswordField,
    pub status: Option<MatchStatus>,
    /// Cursor position when the field has focus.
    pub cursor: Option<usize>,
}

/// Draw a password field on one row: label, input box, feedback mark and
/// action hints. Repeat fields get no toggle or generator hints.
pub fn render_field(frame: &mut Frame, area: Rect, theme: &Theme, view: &FieldView<'_>) {
    let field = view.field;
    let focused = view.cursor.is_some();
    let indicator = view
        .status
        .map(RepeatIndicator::from)
        .unwrap_or(RepeatIndicator::None);

    let mut actions: Vec<Span> = vec![Span::raw(format!(" {} ", indicator_mark(indicator)))];
    if field.shows_toggle_action() {
        let eye = if field.is_shown() { "[^H hide]" } else { "[^H show]" };
        actions.push(Span::styled(eye, theme.action));
    }
    if field.shows_generator_action() {
        actions.push(Span::styled(" [^G gen]", theme.action));
    }
    let actions_width: u16 = actions.iter().map(|s| s.width() as u16).sum();

    let [label_area, input_area, actions_area] = Layout::horizontal([
        Constraint::Length(LABEL_WIDTH),
        Constraint::Fill(1),
        Constraint::Length(actions_width),
    ])
    .areas(area);

    let label_style = if focused { theme.label_focused } else { theme.label };
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("{:<width$}", view.label, width = LABEL_WIDTH as usize),
            label_style,
        )),
        label_area,
    );

    let cursor = view.cursor.filter(|_| field.is_enabled());
    let display = display_text(field.text(), field.is_shown(), cursor);
    let padded = format!("{:<width$}", display, width = input_area.width as usize);
    frame.render_widget(
        Paragraph::new(Span::styled(
            padded,
            theme.input_style(focused, field.is_enabled(), indicator),
        )),
        input_area,
    );

    frame.render_widget(Paragraph::new(Line::from(actions)), actions_area);
}

/// Centered sub-rectangle of `area`, in absolute cells.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Field-level commands recognised by the key map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCommand {
    ToggleVisibility,
    Generate,
    ToggleAutoSync,
    ToggleRepeat,
    NextField,
    PrevField,
    Submit,
    Cancel,
    Edit(KeyCode),
}

/// Ctrl+H / Ctrl+G mirror the desktop shortcuts. F2 / F3 cover terminals that
/// report Ctrl+H as Backspace.
pub fn map_key(key: KeyEvent) -> FieldCommand {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('h') if ctrl => FieldCommand::ToggleVisibility,
        KeyCode::Char('g') if ctrl => FieldCommand::Generate,
        KeyCode::F(2) => FieldCommand::ToggleVisibility,
        KeyCode::F(3) => FieldCommand::Generate,
        KeyCode::F(4) => FieldCommand::ToggleAutoSync,
        KeyCode::F(5) => FieldCommand::ToggleRepeat,
        KeyCode::Tab | KeyCode::Down => FieldCommand::NextField,
        KeyCode::BackTab | KeyCode::Up => FieldCommand::PrevField,
        KeyCode::Enter => FieldCommand::Submit,
        KeyCode::Esc => FieldCommand::Cancel,
        code => FieldCommand::Edit(code),
    }
}

pub enum ViewAction {
    Continue,
    Close,
}

pub trait FormView {
    fn draw(&mut self, frame: &mut Frame);
    fn handle_key(&mut self, key: KeyEvent) -> Result<ViewAction>;
}

/// Run an interactive view. Sets up the terminal, event loop, and panic hook,
/// then restores the terminal on exit.
pub fn run_view(view: &mut dyn FormView) -> Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| view.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }
                match view.handle_key(key) {
                    Ok(ViewAction::Close) => break Ok(()),
                    Ok(ViewAction::Continue) => {}
                    Err(e) => break Err(e),
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}
