use crossterm::event::KeyCode;

/// Char-indexed cursor for single-line editing of a field's text.
///
/// The form owns the text; `apply` computes the edited text and leaves it to
/// the caller to push it back through the form so the repeat status updates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TextCursor {
    pos: usize,
}

impl TextCursor {
    pub fn at_end(text: &str) -> Self {
        Self {
            pos: text.chars().count(),
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Keep the cursor inside the text after it changed from elsewhere.
    pub fn clamp(&mut self, text: &str) {
        self.pos = self.pos.min(text.chars().count());
    }

    /// Apply an editing key. Returns the new text if it changed.
    pub fn apply(&mut self, text: &str, code: KeyCode) -> Option<String> {
        self.clamp(text);
        let len = text.chars().count();
        match code {
            KeyCode::Char(c) => {
                let mut edited = text.to_string();
                edited.insert(byte_pos(text, self.pos), c);
                self.pos += 1;
                Some(edited)
            }
            KeyCode::Backspace => {
                if self.pos == 0 {
                    return None;
                }
                self.pos -= 1;
                let mut edited = text.to_string();
                edited.remove(byte_pos(text, self.pos));
                Some(edited)
            }
            KeyCode::Delete => {
                if self.pos >= len {
                    return None;
                }
                let mut edited = text.to_string();
                edited.remove(byte_pos(text, self.pos));
                Some(edited)
            }
            KeyCode::Left => {
                self.pos = self.pos.saturating_sub(1);
                None
            }
            KeyCode::Right => {
                self.pos = (self.pos + 1).min(len);
                None
            }
            KeyCode::Home => {
                self.pos = 0;
                None
            }
            KeyCode::End => {
                self.pos = len;
                None
            }
            _ => None,
        }
    }
}

/// Convert a char-index cursor position to a byte offset.
fn byte_pos(s: &str, cursor: usize) -> usize {
    s.char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
