use crate::ast::Expression;
use crate::error::ScriptError;
use crate::eval::Evaluator;
use crate::metadata::{MULTI_VALUED_JOINER, normalize_tagname};

/// An expression interpreted as an ordered sequence of values.
///
/// When the expression is syntactically a single bare variable reference and
/// the separator is the canonical multi-value joiner, the variable's value
/// list is taken from the context directly. Splitting a joined rendering
/// instead would be lossy whenever a value itself contains the separator.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiValue {
    values: Vec<String>,
    separator: String,
}

impl MultiValue {
    /// Build from a raw argument expression and an optional separator
    /// expression (`None` means the canonical joiner).
    pub fn new(
        ev: &mut Evaluator,
        multi: &Expression,
        separator: Option<&Expression>,
    ) -> Result<Self, ScriptError> {
        let separator = match separator {
            Some(expression) => expression.eval(ev)?,
            None => MULTI_VALUED_JOINER.to_string(),
        };
        let values = if separator == MULTI_VALUED_JOINER
            && let Some(name) = multi.as_single_variable()
        {
            ev.context().getall(&normalize_tagname(name)).to_vec()
        } else {
            // Fall back to evaluating and splitting when the haystack is a
            // composite expression or the separator was overridden.
            let evaluated = multi.eval(ev)?;
            if evaluated.is_empty() {
                Vec::new()
            } else if separator.is_empty() {
                vec![evaluated]
            } else {
                evaluated
                    .split(separator.as_str())
                    .map(str::to_string)
                    .collect()
            }
        };
        Ok(Self { values, separator })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }

    /// Joined rendering, skipping empty elements.
    pub fn join(&self) -> String {
        let mut out = String::new();
        for value in self.values.iter().filter(|value| !value.is_empty()) {
            if !out.is_empty() {
                out.push_str(&self.separator);
            }
            out.push_str(value);
        }
        out
    }
}
