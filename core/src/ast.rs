use serde::{Deserialize, Serialize};

use crate::error::{ScriptError, StackItem};
use crate::eval::Evaluator;
use crate::metadata::normalize_tagname;
use crate::registry::FunctionRegistry;

/// One node of a parsed script.
///
/// Nodes are immutable after parsing and may be evaluated many times
/// against different contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Literal text; evaluates to itself.
    Text(String),
    /// `%name%` reference; resolves the normalized tag name against the
    /// context. Missing tags evaluate to empty, never an error.
    Variable(String),
    /// `$name(...)` call.
    Function(FunctionCall),
}

impl Node {
    pub fn eval(&self, ev: &mut Evaluator) -> Result<String, ScriptError> {
        match self {
            Node::Text(text) => Ok(text.clone()),
            Node::Variable(name) => Ok(ev.context().get(&normalize_tagname(name))),
            Node::Function(call) => call.eval(ev),
        }
    }
}

/// A validated function call. Construction fails immediately when the name
/// is unknown or the argument count violates the registered bound, so an
/// out-of-contract call never survives into an AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
    pub item: StackItem,
}

impl FunctionCall {
    pub fn new(
        name: &str,
        args: Vec<Expression>,
        line: u32,
        column: u32,
        registry: &FunctionRegistry,
    ) -> Result<Self, ScriptError> {
        let item = StackItem::named(line, column, name);
        let Some(entry) = registry.lookup(name) else {
            return Err(ScriptError::UnknownFunction { item });
        };
        if let Some(bounds) = entry.bounds
            && !bounds.contains(args.len())
        {
            return Err(ScriptError::Arity {
                item,
                expected: bounds.describe(),
                count: args.len(),
            });
        }
        Ok(Self {
            name: name.to_string(),
            args,
            item,
        })
    }

    pub fn eval(&self, ev: &mut Evaluator) -> Result<String, ScriptError> {
        ev.call_function(self)
    }
}

/// Ordered node sequence; the top-level parse result is always an
/// `Expression`. Evaluates to the left-to-right concatenation of its
/// children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expression(pub Vec<Node>);

impl Expression {
    pub fn eval(&self, ev: &mut Evaluator) -> Result<String, ScriptError> {
        let mut out = String::new();
        for node in &self.0 {
            out.push_str(&node.eval(ev)?);
        }
        Ok(out)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The variable name if this expression is syntactically a single bare
    /// `%name%` reference.
    pub fn as_single_variable(&self) -> Option<&str> {
        match self.0.as_slice() {
            [Node::Variable(name)] => Some(name),
            _ => None,
        }
    }

    /// Concatenated literal content if the expression is composed entirely
    /// of `Text` nodes. A variable or nested call anywhere makes the
    /// expression dynamic and yields `None`.
    pub fn static_text(&self) -> Option<String> {
        let mut out = String::new();
        for node in &self.0 {
            match node {
                Node::Text(text) => out.push_str(text),
                _ => return None,
            }
        }
        Some(out)
    }
}
