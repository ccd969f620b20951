// Cursor-driven editing shared by every dialog.
// Rows are either free text or a choice cycled with Left/Right.
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Result of pressing submit in a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The server accepted the change
    Saved,
    /// Local validation failed; nothing was sent
    Rejected,
    /// The server (or transport) refused; the error is shown inline
    Failed,
    /// Submit is disabled right now
    Ignored,
}

pub trait EditableForm {
    fn row_count(&self) -> usize;

    /// Text buffer behind a row, `None` for choice rows
    fn text_at(&mut self, row: usize) -> Option<&mut String>;

    fn cycle_choice(&mut self, _row: usize, _forward: bool) {}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
}

fn char_len(form: &mut impl EditableForm, row: usize) -> Option<usize> {
    form.text_at(row).map(|text| text.chars().count())
}

fn byte_index(text: &str, char_pos: usize) -> usize {
    text.char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

impl Cursor {
    pub fn reset(&mut self) {
        *self = Cursor::default();
    }

    // Keeps the column if the next row is long enough
    pub fn move_down(&mut self, form: &mut impl EditableForm) {
        let last = form.row_count().saturating_sub(1);
        self.y = (self.y + 1).min(last);
        self.x = self.x.min(char_len(form, self.y).unwrap_or(0));
    }

    pub fn move_up(&mut self, form: &mut impl EditableForm) {
        self.y = self.y.saturating_sub(1);
        self.x = self.x.min(char_len(form, self.y).unwrap_or(0));
    }

    pub fn move_left(&mut self, form: &mut impl EditableForm) {
        match char_len(form, self.y) {
            Some(_) => self.x = self.x.saturating_sub(1),
            None => form.cycle_choice(self.y, false),
        }
    }

    pub fn move_right(&mut self, form: &mut impl EditableForm) {
        match char_len(form, self.y) {
            Some(len) => self.x = (self.x + 1).min(len),
            None => form.cycle_choice(self.y, true),
        }
    }

    pub fn insert(&mut self, form: &mut impl EditableForm, to_insert: char) {
        if char_len(form, self.y).is_none() {
            if to_insert == ' ' {
                form.cycle_choice(self.y, true);
            }
            return;
        }
        let x = self.x;
        if let Some(text) = form.text_at(self.y) {
            let x = x.min(text.chars().count());
            let at = byte_index(text, x);
            text.insert(at, to_insert);
            self.x = x + 1;
        }
    }

    // Backspace: removes the char left of the cursor
    pub fn delete_char(&mut self, form: &mut impl EditableForm) {
        if self.x == 0 {
            return;
        }
        let x = self.x;
        if let Some(text) = form.text_at(self.y) {
            let x = x.min(text.chars().count());
            if x == 0 {
                return;
            }
            let at = byte_index(text, x - 1);
            text.remove(at);
            self.x = x - 1;
        }
    }
}

/// One rendered row of a dialog
pub struct FormRow {
    pub prefix: String,
    pub placeholder: String,
    pub value: String,
    pub masked: bool,
    pub choice: bool,
}

impl FormRow {
    pub fn text(prefix: &str, placeholder: &str, value: &str) -> FormRow {
        FormRow {
            prefix: prefix.into(),
            placeholder: placeholder.into(),
            value: value.into(),
            masked: false,
            choice: false,
        }
    }

    pub fn secret(prefix: &str, placeholder: &str, value: &str) -> FormRow {
        FormRow {
            masked: true,
            ..FormRow::text(prefix, placeholder, value)
        }
    }

    pub fn choice(prefix: &str, value: &str) -> FormRow {
        FormRow {
            choice: true,
            ..FormRow::text(prefix, "", value)
        }
    }
}

const GRAY_TEXT: Style = Style::new().fg(Color::Rgb(62, 62, 62));
const WHITE_TEXT: Style = Style::new().fg(Color::White);
const BLACK_ON_WHITE: Style = Style::new().fg(Color::Black).bg(Color::White);

// Returns the UI lines for a dialog: its rows, the inline error and the help text
pub fn get_form_ui<'a>(
    rows: &[FormRow],
    cursor: Cursor,
    error_message: Option<&'a str>,
    help: &'a str,
) -> Vec<Line<'a>> {
    let mut text = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let mut spans = vec![Span::styled(row.prefix.clone(), WHITE_TEXT)];
        let selected = cursor.y == i;
        let value = if row.masked {
            "*".repeat(row.value.chars().count())
        } else {
            row.value.clone()
        };

        if row.choice {
            let style = if selected { BLACK_ON_WHITE } else { WHITE_TEXT };
            spans.push(Span::styled(format!("< {value} >"), style));
        } else if value.is_empty() {
            if selected {
                // First placeholder char is highlighted, the rest is gray
                spans.push(Span::styled(
                    row.placeholder.chars().take(1).collect::<String>(),
                    BLACK_ON_WHITE,
                ));
                spans.push(Span::styled(
                    row.placeholder.chars().skip(1).collect::<String>(),
                    GRAY_TEXT,
                ));
                if row.placeholder.is_empty() {
                    spans.push(Span::styled(" ", BLACK_ON_WHITE));
                }
            } else {
                spans.push(Span::styled(row.placeholder.clone(), GRAY_TEXT));
            }
        } else if selected {
            let len = value.chars().count();
            spans.push(Span::styled(
                value.chars().take(cursor.x).collect::<String>(),
                WHITE_TEXT,
            ));
            spans.push(Span::styled(
                value.chars().skip(cursor.x).take(1).collect::<String>(),
                BLACK_ON_WHITE,
            ));
            spans.push(Span::styled(
                value.chars().skip(cursor.x + 1).collect::<String>(),
                WHITE_TEXT,
            ));
            if cursor.x >= len {
                spans.push(Span::styled(" ", BLACK_ON_WHITE));
            }
        } else {
            spans.push(Span::styled(value, WHITE_TEXT));
        }

        text.push(Line::from(spans));
    }

    text.push(Line::raw(""));

    if let Some(error_message) = error_message {
        text.push(Line::from(vec![Span::styled(
            error_message,
            Style::new().fg(Color::Red),
        )]));
        text.push(Line::raw(""));
    }

    text.push(Line::from(vec![Span::styled(help, WHITE_TEXT)]));

    text
}
