use crate::ast::Expression;
use crate::eval::Evaluator;
use crate::util::FastHashMap;

/// An eagerly evaluated function receives its arguments already rendered to
/// strings.
pub type EagerFn = fn(&mut Evaluator, &[String]) -> anyhow::Result<String>;

/// A lazily evaluated function receives the raw argument expressions and
/// decides itself how and whether to evaluate them (e.g. a conditional must
/// not evaluate its untaken branch).
pub type LazyFn = fn(&mut Evaluator, &[Expression]) -> anyhow::Result<String>;

/// The argument-evaluation mode is fixed at registration time and applies
/// uniformly to every call site of the function.
#[derive(Debug, Clone, Copy)]
pub enum FunctionImpl {
    Eager(EagerFn),
    Lazy(LazyFn),
}

/// Inclusive argument-count bound. `upper == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentBounds {
    pub lower: usize,
    pub upper: Option<usize>,
}

impl ArgumentBounds {
    pub fn exactly(count: usize) -> Self {
        Self {
            lower: count,
            upper: Some(count),
        }
    }

    pub fn between(lower: usize, upper: usize) -> Self {
        Self {
            lower,
            upper: Some(upper),
        }
    }

    pub fn at_least(lower: usize) -> Self {
        Self { lower, upper: None }
    }

    pub fn contains(&self, count: usize) -> bool {
        count >= self.lower && self.upper.is_none_or(|upper| count <= upper)
    }

    /// Human-readable bound for arity error messages.
    pub fn describe(&self) -> String {
        match self.upper {
            Some(upper) if upper == self.lower => format!("exactly {}", self.lower),
            Some(upper) => format!("between {} and {}", self.lower, upper),
            None => format!("at least {}", self.lower),
        }
    }
}

/// A registered script function: the callable, its argument-evaluation mode,
/// an optional arity bound and optional documentation.
#[derive(Debug, Clone)]
pub struct FunctionEntry {
    pub name: String,
    pub imp: FunctionImpl,
    /// `None` disables argument-count checking.
    pub bounds: Option<ArgumentBounds>,
    pub documentation: Option<&'static str>,
}

impl FunctionEntry {
    pub fn eager(name: impl Into<String>, f: EagerFn, bounds: ArgumentBounds) -> Self {
        Self {
            name: name.into(),
            imp: FunctionImpl::Eager(f),
            bounds: Some(bounds),
            documentation: None,
        }
    }

    pub fn lazy(name: impl Into<String>, f: LazyFn, bounds: ArgumentBounds) -> Self {
        Self {
            name: name.into(),
            imp: FunctionImpl::Lazy(f),
            bounds: Some(bounds),
            documentation: None,
        }
    }

    pub fn with_doc(mut self, documentation: &'static str) -> Self {
        self.documentation = Some(documentation);
        self
    }

    pub fn unchecked(mut self) -> Self {
        self.bounds = None;
        self
    }

    /// True when arguments are evaluated before the callable is invoked.
    pub fn eval_args(&self) -> bool {
        matches!(self.imp, FunctionImpl::Eager(_))
    }
}

/// Name-to-entry mapping consulted by the parser (name validation, arity
/// checking) and the evaluator (callable dispatch). Populated externally;
/// the engine only depends on the lookup contract.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    entries: FastHashMap<String, FunctionEntry>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry, replacing any previous function of the same name.
    pub fn register(&mut self, entry: FunctionEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn lookup(&self, name: &str) -> Option<&FunctionEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All registered names, sorted for deterministic listings.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_describe() {
        assert_eq!(ArgumentBounds::exactly(2).describe(), "exactly 2");
        assert_eq!(ArgumentBounds::between(2, 3).describe(), "between 2 and 3");
        assert_eq!(ArgumentBounds::at_least(1).describe(), "at least 1");
    }

    #[test]
    fn bounds_contains() {
        let bounds = ArgumentBounds::between(2, 3);
        assert!(!bounds.contains(1));
        assert!(bounds.contains(2));
        assert!(bounds.contains(3));
        assert!(!bounds.contains(4));

        let open = ArgumentBounds::at_least(1);
        assert!(!open.contains(0));
        assert!(open.contains(100));
    }

    #[test]
    fn register_and_lookup() {
        fn noop(_: &mut Evaluator, _: &[String]) -> anyhow::Result<String> {
            Ok(String::new())
        }

        let mut registry = FunctionRegistry::new();
        registry.register(FunctionEntry::eager("upper", noop, ArgumentBounds::exactly(1)));
        registry.register(FunctionEntry::eager("lower", noop, ArgumentBounds::exactly(1)));

        assert!(registry.contains("upper"));
        assert!(registry.lookup("missing").is_none());
        assert_eq!(registry.names(), vec!["lower".to_string(), "upper".to_string()]);
        assert!(registry.lookup("upper").is_some_and(|e| e.eval_args()));
    }
}
