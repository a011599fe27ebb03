use crate::error::{ScriptError, StackItem};

/// Character cursor over script source with 1-based line/column tracking
/// and single-level pushback.
///
/// The parser never needs more than one character of lookahead: `$`, `%`,
/// `(`, `)`, `,` and `\` are all unambiguous lead characters.
pub struct Reader {
    chars: Vec<char>,
    idx: usize,
    line: u32,
    column: u32,
    prev_line: u32,
    prev_column: u32,
}

impl Reader {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            idx: 0,
            line: 1,
            column: 1,
            prev_line: 1,
            prev_column: 1,
        }
    }

    /// Read the next character, or `None` at end of input.
    pub fn read(&mut self) -> Option<char> {
        let ch = *self.chars.get(self.idx)?;
        self.idx += 1;
        self.prev_line = self.line;
        self.prev_column = self.column;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Rewind exactly one previously read character.
    pub fn unread(&mut self) {
        if self.idx > 0 {
            self.idx -= 1;
            self.line = self.prev_line;
            self.column = self.prev_column;
        }
    }

    /// Read exactly `count` characters, failing with an end-of-file error
    /// if the input is exhausted first. Used for fixed-width escape digits.
    pub fn read_multi(&mut self, count: usize) -> Result<String, ScriptError> {
        let mut text = String::with_capacity(count);
        for _ in 0..count {
            match self.read() {
                Some(ch) => text.push(ch),
                None => return Err(ScriptError::EndOfFile { item: self.item() }),
            }
        }
        Ok(text)
    }

    /// Position of the next character to be read.
    pub fn item(&self) -> StackItem {
        StackItem::new(self.line, self.column)
    }

    /// Position of the character returned by the most recent `read()`.
    pub fn last_item(&self) -> StackItem {
        StackItem::new(self.prev_line, self.prev_column)
    }
}
