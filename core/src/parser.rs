use crate::ast::{Expression, FunctionCall, Node};
use crate::error::{ScriptError, StackItem};
use crate::reader::Reader;
use crate::registry::FunctionRegistry;

/// Tagger script parser.
///
/// Grammar:
/// ```text
/// unicodechar ::= '\u' [a-fA-F0-9]{4}
/// text        ::= [^$%] | '\$' | '\%' | '\(' | '\)' | '\,' | unicodechar
/// argtext     ::= [^$%(),] | '\$' | '\%' | '\(' | '\)' | '\,' | unicodechar
/// identifier  ::= [a-zA-Z0-9_]
/// variable    ::= '%' (identifier | ':')+ '%'
/// function    ::= '$' (identifier)+ '(' (argument (',' argument)*)? ')'
/// expression  ::= (variable | function | text)*
/// argument    ::= (variable | function | argtext)*
/// ```
///
/// Function names and argument counts are validated against the registry at
/// parse time; evaluation never sees an unknown name or an out-of-bounds
/// call that was present in the source.
pub struct Parser<'r> {
    registry: &'r FunctionRegistry,
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        Self { registry }
    }

    pub fn parse(&self, source: &str) -> Result<Expression, ScriptError> {
        let mut reader = Reader::new(source);
        let (expression, _) = self.parse_expression(&mut reader, true)?;
        Ok(expression)
    }

    /// Parse an expression and return it together with the terminator that
    /// ended it: `None` at end of input, `Some(',')` or `Some(')')` inside
    /// an argument list.
    fn parse_expression(
        &self,
        reader: &mut Reader,
        top: bool,
    ) -> Result<(Expression, Option<char>), ScriptError> {
        let mut nodes = Vec::new();
        loop {
            match reader.read() {
                None => {
                    if top {
                        return Ok((Expression(nodes), None));
                    }
                    return Err(ScriptError::EndOfFile {
                        item: reader.item(),
                    });
                }
                Some(ch) if !top && (ch == ',' || ch == ')') => {
                    return Ok((Expression(nodes), Some(ch)));
                }
                Some('$') => nodes.push(Node::Function(self.parse_function(reader)?)),
                Some('%') => nodes.push(Node::Variable(self.parse_variable(reader)?)),
                Some(_) => {
                    reader.unread();
                    nodes.push(Node::Text(self.parse_text(reader, top)?));
                }
            }
        }
    }

    /// Called with the `$` already consumed.
    fn parse_function(&self, reader: &mut Reader) -> Result<FunctionCall, ScriptError> {
        let start = reader.last_item();
        let mut name = String::new();
        loop {
            match reader.read() {
                Some('(') => break,
                None => {
                    return Err(ScriptError::EndOfFile { item: start });
                }
                Some(ch) if is_identifier_char(ch) => name.push(ch),
                Some(ch) => {
                    return Err(ScriptError::unexpected_char(reader.last_item(), ch));
                }
            }
        }
        if !self.registry.contains(&name) {
            return Err(ScriptError::UnknownFunction {
                item: StackItem::named(start.line, start.column, &name),
            });
        }
        let args = self.parse_arguments(reader)?;
        FunctionCall::new(&name, args, start.line, start.column, self.registry)
    }

    fn parse_arguments(&self, reader: &mut Reader) -> Result<Vec<Expression>, ScriptError> {
        let mut results = Vec::new();
        loop {
            let (expression, terminator) = self.parse_expression(reader, false)?;
            results.push(expression);
            if terminator == Some(')') {
                // Only an empty expression as the sole argument is the same
                // as no argument given.
                if results.len() == 1 && results[0].is_empty() {
                    return Ok(Vec::new());
                }
                return Ok(results);
            }
        }
    }

    /// Called with the opening `%` already consumed.
    fn parse_variable(&self, reader: &mut Reader) -> Result<String, ScriptError> {
        let start = reader.last_item();
        let mut name = String::new();
        loop {
            match reader.read() {
                Some('%') => return Ok(name),
                None => {
                    return Err(ScriptError::EndOfFile { item: start });
                }
                Some(ch) if is_identifier_char(ch) || ch == ':' => name.push(ch),
                Some(ch) => {
                    return Err(ScriptError::unexpected_char(reader.last_item(), ch));
                }
            }
        }
    }

    fn parse_text(&self, reader: &mut Reader, top: bool) -> Result<String, ScriptError> {
        let mut text = String::new();
        loop {
            match reader.read() {
                None => break,
                Some('\\') => text.push(self.parse_escape(reader)?),
                Some('(') if !top => {
                    return Err(ScriptError::unexpected_char(reader.last_item(), '('));
                }
                Some(ch) if ch == '$' || ch == '%' || (!top && (ch == ',' || ch == ')')) => {
                    reader.unread();
                    break;
                }
                Some(ch) => text.push(ch),
            }
        }
        Ok(text)
    }

    /// Called with the `\` already consumed.
    fn parse_escape(&self, reader: &mut Reader) -> Result<char, ScriptError> {
        let start = reader.last_item();
        match reader.read() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('u') => {
                let digits = reader.read_multi(4)?;
                u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(ScriptError::UnicodeEscape {
                        item: start,
                        raw: digits,
                    })
            }
            None => Err(ScriptError::EndOfFile { item: start }),
            Some(ch) if matches!(ch, '$' | '%' | '(' | ')' | ',' | '\\') => Ok(ch),
            Some(ch) => Err(ScriptError::unexpected_char(reader.last_item(), ch)),
        }
    }
}
