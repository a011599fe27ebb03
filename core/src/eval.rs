use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::{debug, trace};
use twox_hash::XxHash64;

use crate::ast::{Expression, FunctionCall};
use crate::error::{ScriptError, StackItem};
use crate::metadata::Metadata;
use crate::parser::Parser;
use crate::registry::{FunctionImpl, FunctionRegistry};

/// Upper bound on cached parsed scripts. The realistic working set is the
/// handful of scripts the user currently has active, so the cache is kept
/// small and evicts the least recently touched entry instead of growing
/// without bound.
const PARSE_CACHE_CAPACITY: usize = 32;

struct CachedScript {
    ast: Arc<Expression>,
    touched: AtomicU64,
}

static PARSE_CACHE: Lazy<DashMap<u64, CachedScript>> = Lazy::new(DashMap::new);
static TOUCH_COUNTER: AtomicU64 = AtomicU64::new(0);

fn content_hash(source: &str) -> u64 {
    let mut hasher = XxHash64::default();
    source.hash(&mut hasher);
    hasher.finish()
}

fn touch() -> u64 {
    TOUCH_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Fetch the parsed form of `source` from the process-wide cache, parsing
/// and inserting on a miss. Cached ASTs are immutable and shared across
/// concurrent evaluations; a racing double-parse is harmless since parsing
/// is idempotent and side-effect free.
fn cached_parse(source: &str, registry: &FunctionRegistry) -> Result<Arc<Expression>, ScriptError> {
    let key = content_hash(source);
    if let Some(entry) = PARSE_CACHE.get(&key) {
        entry.touched.store(touch(), Ordering::Relaxed);
        trace!(key, "script parse cache hit");
        return Ok(Arc::clone(&entry.ast));
    }
    debug!(key, "script parse cache miss");
    let ast = Arc::new(Parser::new(registry).parse(source)?);
    if PARSE_CACHE.len() >= PARSE_CACHE_CAPACITY {
        evict_least_recent();
    }
    PARSE_CACHE.insert(
        key,
        CachedScript {
            ast: Arc::clone(&ast),
            touched: AtomicU64::new(touch()),
        },
    );
    Ok(ast)
}

fn evict_least_recent() {
    let mut oldest: Option<(u64, u64)> = None;
    for entry in PARSE_CACHE.iter() {
        let touched = entry.touched.load(Ordering::Relaxed);
        if oldest.is_none_or(|(_, t)| touched < t) {
            oldest = Some((*entry.key(), touched));
        }
    }
    if let Some((key, _)) = oldest {
        PARSE_CACHE.remove(&key);
    }
}

/// The cached AST for `source`, if present. Exposed so tests can verify
/// cache reuse by pointer identity.
pub fn cached_script(source: &str) -> Option<Arc<Expression>> {
    PARSE_CACHE
        .get(&content_hash(source))
        .map(|entry| Arc::clone(&entry.ast))
}

/// Walks parsed scripts against a metadata context.
///
/// The evaluator holds the registry for callable dispatch and a LIFO call
/// stack of the function frames currently being evaluated, used to anchor
/// runtime diagnostics. Frames are pushed before a callable is invoked and
/// popped on every exit path, so nesting stays strict even under errors.
pub struct Evaluator<'a> {
    registry: &'a FunctionRegistry,
    context: &'a mut Metadata,
    stack: Vec<StackItem>,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a FunctionRegistry, context: &'a mut Metadata) -> Self {
        Self {
            registry,
            context,
            stack: Vec::new(),
        }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        self.registry
    }

    pub fn context(&self) -> &Metadata {
        self.context
    }

    pub fn context_mut(&mut self) -> &mut Metadata {
        self.context
    }

    pub fn eval(&mut self, expression: &Expression) -> Result<String, ScriptError> {
        expression.eval(self)
    }

    /// Parse (or fetch from the cache) and evaluate a whole script.
    pub fn eval_script(&mut self, source: &str) -> Result<String, ScriptError> {
        let ast = cached_parse(source, self.registry)?;
        ast.eval(self)
    }

    /// A runtime failure anchored at the current call-stack top.
    pub fn runtime_error(&self, message: impl Into<String>) -> ScriptError {
        let item = self
            .stack
            .last()
            .cloned()
            .unwrap_or_else(|| StackItem::new(0, 0));
        ScriptError::Runtime {
            item,
            message: message.into(),
        }
    }

    /// Depth of the diagnostic call stack; only non-zero while a registered
    /// callable is running.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn call_function(&mut self, call: &FunctionCall) -> Result<String, ScriptError> {
        // The name was validated at parse time, but a cached AST may be
        // evaluated against a registry that no longer carries it.
        let Some(entry) = self.registry.lookup(&call.name) else {
            return Err(ScriptError::UnknownFunction {
                item: call.item.clone(),
            });
        };
        let imp = entry.imp;
        self.stack.push(call.item.clone());
        let result = self.dispatch(imp, call);
        self.stack.pop();
        result
    }

    fn dispatch(&mut self, imp: FunctionImpl, call: &FunctionCall) -> Result<String, ScriptError> {
        match imp {
            FunctionImpl::Eager(f) => {
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(arg.eval(self)?);
                }
                f(self, &args).map_err(|err| self.into_runtime(err))
            }
            FunctionImpl::Lazy(f) => f(self, &call.args).map_err(|err| self.into_runtime(err)),
        }
    }

    /// Convert a callable failure into a structured error. A `ScriptError`
    /// raised further down (e.g. by a lazy function evaluating one of its
    /// arguments) passes through unchanged; anything else becomes a
    /// `Runtime` error at the current frame.
    fn into_runtime(&self, err: anyhow::Error) -> ScriptError {
        match err.downcast::<ScriptError>() {
            Ok(script_err) => script_err,
            Err(other) => self.runtime_error(other.to_string()),
        }
    }
}
