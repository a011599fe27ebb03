use tgs_core::registry::FunctionRegistry;
use tgs_core::util::{FastHashMap, FastHashSet};

use crate::context::CompletionMode;

/// Builds the flat, ordered candidate list for a detected completion
/// context.
///
/// Variable names come from three sources: the builtin tag list, the
/// user-defined names extracted from scripts, and an injected provider for
/// plugin-contributed names. Candidates are ordered by usage count
/// (descending) with ties broken alphabetically, so the output is
/// deterministic for equal inputs. Lists are recomputed fresh per request.
pub struct CompletionChoicesProvider {
    plugin_variable_names: Box<dyn Fn() -> FastHashSet<String> + Send + Sync>,
}

impl CompletionChoicesProvider {
    pub fn new(
        plugin_variable_names: impl Fn() -> FastHashSet<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            plugin_variable_names: Box::new(plugin_variable_names),
        }
    }

    pub fn build_choices(
        &self,
        mode: CompletionMode,
        user_variables: &FastHashSet<String>,
        builtin_variables: &[String],
        usage_counts: &FastHashMap<String, i64>,
        registry: &FunctionRegistry,
    ) -> Vec<String> {
        let plugin_variables = (self.plugin_variable_names)();

        let mut variables: FastHashSet<String> = FastHashSet::default();
        variables.extend(builtin_variables.iter().cloned());
        variables.extend(user_variables.iter().cloned());
        variables.extend(plugin_variables);

        let variables = ordered(variables.into_iter().collect(), usage_counts);

        match mode {
            CompletionMode::FunctionName => ordered(registry.names(), usage_counts)
                .into_iter()
                .map(|name| format!("${name}"))
                .collect(),
            CompletionMode::TagNameArg => {
                // The argument position itself is the tag name, so the
                // candidates are bare, undecorated names.
                variables
            }
            CompletionMode::Variable => variables
                .into_iter()
                .map(|name| format!("%{name}%"))
                .collect(),
            CompletionMode::Default => {
                let mut choices: Vec<String> = variables
                    .into_iter()
                    .map(|name| format!("%{name}%"))
                    .collect();
                choices.extend(
                    ordered(registry.names(), usage_counts)
                        .into_iter()
                        .map(|name| format!("${name}")),
                );
                choices
            }
        }
    }
}

/// Sort by usage count descending, name ascending on ties.
fn ordered(mut names: Vec<String>, usage_counts: &FastHashMap<String, i64>) -> Vec<String> {
    let usage = |name: &str| usage_counts.get(name).copied().unwrap_or(0);
    names.sort_by(|a, b| usage(b).cmp(&usage(a)).then_with(|| a.cmp(b)));
    names
}
