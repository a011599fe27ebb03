use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use tgs_core::ast::{Expression, Node};
use tgs_core::parser::Parser;
use tgs_core::registry::FunctionRegistry;
use tgs_core::util::FastHashSet;

/// Static `$set(name,` heads in raw text. The character class covers ASCII
/// identifiers plus Latin-extended and CJK ranges; `%variable%` first
/// arguments are excluded because `%` is not in the class.
static SET_VARIABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new("\\$set\\(\\s*([A-Za-z0-9_\u{00C0}-\u{017F}\u{4E00}-\u{9FFF}]+)\\s*,")
        .expect("static pattern is valid")
});

/// Extracts the user-defined variable names a script introduces via
/// `$set(name, ...)`.
///
/// Three strategies run unconditionally and their results are unioned:
///
/// 1. full parse, for accuracy on nested and cross-line constructs;
/// 2. per-line parse, so one line broken mid-edit does not block the others;
/// 3. a regex fallback that still works when even single lines fail to
///    parse, as long as the `$set(name,` head is intact.
///
/// Live typing constantly produces transiently invalid scripts, so all
/// parse failures are swallowed; this is a best-effort analysis, not a
/// validator.
pub struct VariableExtractor<'r> {
    registry: &'r FunctionRegistry,
}

impl<'r> VariableExtractor<'r> {
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        Self { registry }
    }

    pub fn extract(&self, script: &str) -> FastHashSet<String> {
        let mut names = FastHashSet::default();
        self.collect_from_full_parse(script, &mut names);
        self.collect_from_line_parse(script, &mut names);
        self.collect_from_regex(script, &mut names);
        names
    }

    pub(crate) fn collect_from_full_parse(&self, script: &str, out: &mut FastHashSet<String>) {
        match Parser::new(self.registry).parse(script) {
            Ok(expression) => collect_from_ast(&expression, out),
            Err(err) => trace!(%err, "full parse failed, relying on other strategies"),
        }
    }

    pub(crate) fn collect_from_line_parse(&self, script: &str, out: &mut FastHashSet<String>) {
        let parser = Parser::new(self.registry);
        for line in script.lines() {
            if line.is_empty() {
                continue;
            }
            match parser.parse(line) {
                Ok(expression) => collect_from_ast(&expression, out),
                Err(err) => trace!(%err, line, "line parse failed, skipping line"),
            }
        }
    }

    pub(crate) fn collect_from_regex(&self, script: &str, out: &mut FastHashSet<String>) {
        for captures in SET_VARIABLE_PATTERN.captures_iter(script) {
            out.insert(captures[1].to_string());
        }
    }
}

/// Collect static names from `$set` calls, recursing into every argument of
/// every function so nested and indirect `$set`s are found too. Only first
/// arguments composed purely of text nodes qualify; a dynamic name such as
/// `$set($if(...), ...)` cannot be statically determined.
fn collect_from_ast(expression: &Expression, out: &mut FastHashSet<String>) {
    for node in expression.nodes() {
        if let Node::Function(call) = node {
            if call.name == "set"
                && let Some(static_name) = call.args.first().and_then(Expression::static_text)
            {
                let trimmed = static_name.trim();
                if !trimmed.is_empty() {
                    out.insert(trimmed.to_string());
                }
            }
            for arg in &call.args {
                collect_from_ast(arg, out);
            }
        }
    }
}
