#[cfg(test)]
mod tests {
    use tgs_core::registry::FunctionRegistry;
    use tgs_core::util::{FastHashMap, FastHashSet};
    use tgs_stdlib::base_registry;

    use crate::choices::CompletionChoicesProvider;
    use crate::context::CompletionMode;

    fn set_of(names: &[&str]) -> FastHashSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn counts(pairs: &[(&str, i64)]) -> FastHashMap<String, i64> {
        pairs
            .iter()
            .map(|(name, count)| (name.to_string(), *count))
            .collect()
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn provider_with(plugin: &'static [&'static str]) -> CompletionChoicesProvider {
        CompletionChoicesProvider::new(|| plugin.iter().map(|name| name.to_string()).collect())
    }

    #[test]
    fn variables_order_by_usage_desc_then_name_asc() {
        let provider = provider_with(&["plugin_var1", "plugin_var2", "plugin_var3"]);
        let registry = FunctionRegistry::new();
        let choices = provider.build_choices(
            CompletionMode::Variable,
            &set_of(&["user_var1", "user_var2", "artist"]),
            &strings(&["artist", "album", "title", "date"]),
            &counts(&[
                ("artist", 5),
                ("album", 3),
                ("title", 1),
                ("plugin_var1", 2),
                ("user_var1", 4),
            ]),
            &registry,
        );
        assert_eq!(
            choices,
            strings(&[
                "%artist%",
                "%user_var1%",
                "%album%",
                "%plugin_var1%",
                "%title%",
                "%date%",
                "%plugin_var2%",
                "%plugin_var3%",
                "%user_var2%",
            ])
        );
    }

    #[test]
    fn ties_fall_back_to_alphabetical_order() {
        let provider = provider_with(&[]);
        let registry = FunctionRegistry::new();
        let choices = provider.build_choices(
            CompletionMode::Variable,
            &FastHashSet::default(),
            &strings(&["z_var", "a_var", "m_var"]),
            &FastHashMap::default(),
            &registry,
        );
        assert_eq!(choices, strings(&["%a_var%", "%m_var%", "%z_var%"]));
    }

    #[test]
    fn negative_usage_counts_sort_below_zero() {
        let provider = provider_with(&[]);
        let registry = FunctionRegistry::new();
        let choices = provider.build_choices(
            CompletionMode::Variable,
            &FastHashSet::default(),
            &strings(&["var1", "var2", "var3"]),
            &counts(&[("var1", -1), ("var2", 0), ("var3", 1)]),
            &registry,
        );
        assert_eq!(choices, strings(&["%var3%", "%var2%", "%var1%"]));
    }

    #[test]
    fn tag_name_arg_mode_yields_bare_names() {
        let provider = provider_with(&["plugin_var"]);
        let registry = FunctionRegistry::new();
        let choices = provider.build_choices(
            CompletionMode::TagNameArg,
            &set_of(&["user_var"]),
            &strings(&["artist"]),
            &FastHashMap::default(),
            &registry,
        );
        assert_eq!(choices, strings(&["artist", "plugin_var", "user_var"]));
    }

    #[test]
    fn function_name_mode_yields_dollar_prefixed_functions() {
        let provider = provider_with(&["plugin_var"]);
        let registry = base_registry();
        let choices = provider.build_choices(
            CompletionMode::FunctionName,
            &set_of(&["user_var"]),
            &strings(&["artist"]),
            &FastHashMap::default(),
            &registry,
        );
        assert!(choices.contains(&"$set".to_string()));
        assert!(choices.contains(&"$if".to_string()));
        assert!(choices.iter().all(|choice| choice.starts_with('$')));
    }

    #[test]
    fn default_mode_mixes_variables_and_functions() {
        let provider = provider_with(&[]);
        let registry = base_registry();
        let choices = provider.build_choices(
            CompletionMode::Default,
            &set_of(&["user_var"]),
            &strings(&["artist"]),
            &FastHashMap::default(),
            &registry,
        );
        assert!(choices.contains(&"%artist%".to_string()));
        assert!(choices.contains(&"%user_var%".to_string()));
        assert!(choices.contains(&"$noop".to_string()));
    }

    #[test]
    fn overlapping_sources_are_deduplicated() {
        let provider = provider_with(&["artist", "plugin_var"]);
        let registry = FunctionRegistry::new();
        let choices = provider.build_choices(
            CompletionMode::Variable,
            &set_of(&["artist", "user_var"]),
            &strings(&["artist", "album"]),
            &FastHashMap::default(),
            &registry,
        );
        assert_eq!(
            choices.iter().filter(|choice| *choice == "%artist%").count(),
            1
        );
        assert_eq!(
            choices,
            strings(&["%album%", "%artist%", "%plugin_var%", "%user_var%"])
        );
    }

    #[test]
    fn equal_inputs_produce_identical_output() {
        let provider = provider_with(&["p1", "p2"]);
        let registry = FunctionRegistry::new();
        let build = || {
            provider.build_choices(
                CompletionMode::Variable,
                &set_of(&["z_var", "a_var"]),
                &strings(&["m_var"]),
                &FastHashMap::default(),
                &registry,
            )
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn empty_variable_sources_leave_only_plugin_names() {
        let provider = provider_with(&["plugin_var1", "plugin_var2"]);
        let registry = FunctionRegistry::new();
        let choices = provider.build_choices(
            CompletionMode::Variable,
            &FastHashSet::default(),
            &[],
            &FastHashMap::default(),
            &registry,
        );
        assert_eq!(choices, strings(&["%plugin_var1%", "%plugin_var2%"]));
    }

    #[test]
    fn variable_names_keep_colons_and_unicode() {
        let provider = provider_with(&["tag:artist", "var_中文"]);
        let registry = FunctionRegistry::new();
        let choices = provider.build_choices(
            CompletionMode::Variable,
            &FastHashSet::default(),
            &[],
            &FastHashMap::default(),
            &registry,
        );
        assert!(choices.contains(&"%tag:artist%".to_string()));
        assert!(choices.contains(&"%var_中文%".to_string()));
    }
}
