use std::fmt;

use serde::{Deserialize, Serialize};

/// Diagnostic label for a source position, optionally carrying the name of
/// the function call the position belongs to.
///
/// Rendered as `line:column` or `line:column:$name`. Line and column are
/// 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackItem {
    pub line: u32,
    pub column: u32,
    pub name: Option<String>,
}

impl StackItem {
    pub fn new(line: u32, column: u32) -> Self {
        Self {
            line,
            column,
            name: None,
        }
    }

    pub fn named(line: u32, column: u32, name: impl Into<String>) -> Self {
        Self {
            line,
            column,
            name: Some(name.into()),
        }
    }
}

impl fmt::Display for StackItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{}:${}", self.line, self.column, name),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}

/// All failure conditions of the script engine.
///
/// Every variant carries the position it is anchored to. Parse-time errors
/// abort parsing of the whole script; `Runtime` only fails the evaluation
/// attempt that raised it, the parse tree stays valid.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// Source ended while a variable, function call or escape was still open.
    /// Anchored at the position where the unterminated construct began.
    EndOfFile { item: StackItem },
    /// An unexpected character was encountered.
    Syntax { item: StackItem, message: String },
    /// Malformed `\uXXXX` escape; `raw` is the captured escape text.
    UnicodeEscape { item: StackItem, raw: String },
    /// `$name(` where `name` is not registered. The item carries the name.
    UnknownFunction { item: StackItem },
    /// A registered function was called with the wrong number of arguments.
    Arity {
        item: StackItem,
        expected: String,
        count: usize,
    },
    /// A registered callable failed during evaluation. The item is the
    /// call-stack top at the time of failure.
    Runtime { item: StackItem, message: String },
}

impl ScriptError {
    pub fn syntax(item: StackItem, message: impl Into<String>) -> Self {
        Self::Syntax {
            item,
            message: message.into(),
        }
    }

    pub fn unexpected_char(item: StackItem, ch: char) -> Self {
        Self::Syntax {
            item,
            message: format!("Unexpected character '{ch}'"),
        }
    }

    /// The position the error is anchored to.
    pub fn item(&self) -> &StackItem {
        match self {
            Self::EndOfFile { item }
            | Self::Syntax { item, .. }
            | Self::UnicodeEscape { item, .. }
            | Self::UnknownFunction { item }
            | Self::Arity { item, .. }
            | Self::Runtime { item, .. } => item,
        }
    }

    /// True for errors raised while parsing, false for evaluation failures.
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, Self::Runtime { .. })
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfFile { item } => {
                write!(f, "{item}: Unexpected end of script")
            }
            Self::Syntax { item, message } => write!(f, "{item}: {message}"),
            Self::UnicodeEscape { item, raw } => {
                write!(f, "{item}: Invalid unicode character '\\u{raw}'")
            }
            Self::UnknownFunction { item } => {
                let name = item.name.as_deref().unwrap_or("");
                write!(f, "{item}: Unknown function '${name}'")
            }
            Self::Arity {
                item,
                expected,
                count,
            } => {
                let name = item.name.as_deref().unwrap_or("");
                write!(
                    f,
                    "{item}: Wrong number of arguments for ${name}: Expected {expected}, got {count}"
                )
            }
            Self::Runtime { item, message } => write!(f, "{item}: {message}"),
        }
    }
}

impl std::error::Error for ScriptError {}
