/// Functions whose first argument is a tag or variable name. Used to enable
/// tag-name completion inside the first parameter position. This is
/// configuration data, independent of what is actually registered.
pub const TAG_NAME_FIRST_ARG_FUNCTIONS: [&str; 8] = [
    "set",
    "get",
    "unset",
    "getunset",
    "delete",
    "setmulti",
    "copy",
    "copymerge",
];

/// What kind of completion the cursor position calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    Default,
    FunctionName,
    Variable,
    TagNameArg,
}

/// Detection result. `function_name` and `arg_index` are only present in
/// `TagNameArg` mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextDetails {
    pub mode: CompletionMode,
    pub function_name: Option<String>,
    pub arg_index: Option<usize>,
}

impl ContextDetails {
    fn plain(mode: CompletionMode) -> Self {
        Self {
            mode,
            function_name: None,
            arg_index: None,
        }
    }
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Classifies the edit position from the text to the left of the cursor.
///
/// The modes are checked in fixed priority order: function name, then
/// variable, then tag-name argument, then default. The detector is a pure
/// function of the left-context string and holds no state.
#[derive(Debug, Default)]
pub struct ContextDetector;

impl ContextDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn mode(&self, left_text: &str) -> CompletionMode {
        self.detect(left_text).mode
    }

    pub fn detect(&self, left_text: &str) -> ContextDetails {
        if self.is_function_context(left_text) {
            return ContextDetails::plain(CompletionMode::FunctionName);
        }
        if self.is_variable_context(left_text) {
            return ContextDetails::plain(CompletionMode::Variable);
        }
        if let Some(function_name) = self.tag_arg_function(left_text) {
            return ContextDetails {
                mode: CompletionMode::TagNameArg,
                function_name: Some(function_name),
                arg_index: Some(0),
            };
        }
        ContextDetails::plain(CompletionMode::Default)
    }

    fn is_function_context(&self, left_text: &str) -> bool {
        // A trailing `$` run always starts a new function name, `$$` included.
        left_text.trim_end().ends_with('$') || self.is_partial_function_context(left_text)
    }

    /// A partially typed function name like `$s` or `$se`.
    fn is_partial_function_context(&self, left_text: &str) -> bool {
        let Some(idx) = left_text.rfind('$') else {
            return false;
        };
        let part = &left_text[idx + 1..];
        !part.is_empty() && part.chars().all(is_identifier_char)
    }

    fn is_variable_context(&self, left_text: &str) -> bool {
        let stripped = left_text.trim_end();
        if !stripped.ends_with('%') {
            return self.is_partial_variable_context(left_text);
        }
        if stripped.ends_with("%%") {
            // A doubled percent is a literal escape unless the text before
            // the final `%` ends with a closed variable, in which case a new
            // variable is starting right after a completed one.
            let before = &stripped[..stripped.len() - 1];
            return ends_with_closed_variable(before);
        }
        true
    }

    /// A partially typed variable name like `%f` or `%fo`.
    fn is_partial_variable_context(&self, left_text: &str) -> bool {
        let Some(idx) = left_text.rfind('%') else {
            return false;
        };
        let part = &left_text[idx + 1..];
        !part.is_empty() && part.chars().all(|ch| is_identifier_char(ch) || ch == ':')
    }

    /// Scan `$` occurrences right to left for an open call to a tag-name
    /// function whose first argument the cursor is still inside. Candidates
    /// that are unknown, malformed (doubled opening paren), already closed
    /// or past their first argument are skipped and the scan continues.
    fn tag_arg_function(&self, left_text: &str) -> Option<String> {
        let chars: Vec<char> = left_text.chars().collect();
        for dollar_idx in (0..chars.len()).rev() {
            if chars[dollar_idx] != '$' {
                continue;
            }
            let mut name_end = dollar_idx + 1;
            while name_end < chars.len() && is_identifier_char(chars[name_end]) {
                name_end += 1;
            }
            if name_end == dollar_idx + 1 || chars.get(name_end) != Some(&'(') {
                continue;
            }
            let name: String = chars[dollar_idx + 1..name_end].iter().collect();
            if !TAG_NAME_FIRST_ARG_FUNCTIONS.contains(&name.as_str()) {
                continue;
            }
            if chars.get(name_end + 1) == Some(&'(') {
                continue;
            }
            if cursor_in_first_argument(&chars[name_end + 1..]) {
                return Some(name);
            }
        }
        None
    }
}

/// True when the text after an opening paren contains no top-level comma and
/// does not close the call.
fn cursor_in_first_argument(rest: &[char]) -> bool {
    let mut depth = 0usize;
    for &ch in rest {
        match ch {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            ',' if depth == 0 => return false,
            _ => {}
        }
    }
    true
}

/// True when `text` ends with a complete `%name%` reference.
fn ends_with_closed_variable(text: &str) -> bool {
    let mut chars = text.chars().rev();
    if chars.next() != Some('%') {
        return false;
    }
    let mut name_len = 0usize;
    for ch in chars {
        if ch == '%' {
            return name_len > 0;
        }
        if is_identifier_char(ch) || ch == ':' {
            name_len += 1;
        } else {
            return false;
        }
    }
    false
}
