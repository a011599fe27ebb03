#[cfg(test)]
mod tests {
    use tgs_core::util::FastHashSet;
    use tgs_stdlib::base_registry;

    use crate::extract::VariableExtractor;

    fn set_of(names: &[&str]) -> FastHashSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn well_formed_script_agrees_across_all_three_strategies() {
        let registry = base_registry();
        let extractor = VariableExtractor::new(&registry);
        let script = "$set(alpha,1) $set(beta,2) $set(gamma,3)";
        let expected = set_of(&["alpha", "beta", "gamma"]);

        let mut from_full = FastHashSet::default();
        extractor.collect_from_full_parse(script, &mut from_full);
        assert_eq!(from_full, expected);

        let mut from_line = FastHashSet::default();
        extractor.collect_from_line_parse(script, &mut from_line);
        assert_eq!(from_line, expected);

        let mut from_regex = FastHashSet::default();
        extractor.collect_from_regex(script, &mut from_regex);
        assert_eq!(from_regex, expected);

        assert_eq!(extractor.extract(script), expected);
    }

    #[test]
    fn nested_set_calls_are_discovered() {
        let registry = base_registry();
        let extractor = VariableExtractor::new(&registry);
        let script = r#"$set(outer, $if(1, $set(inner, "value"), "default"))"#;
        assert_eq!(extractor.extract(script), set_of(&["outer", "inner"]));
    }

    #[test]
    fn dynamic_first_arguments_are_excluded() {
        let registry = base_registry();
        let extractor = VariableExtractor::new(&registry);
        let script = r#"$set($if(1,"a","b"), "value")"#;
        assert!(extractor.extract(script).is_empty());
    }

    #[test]
    fn variable_first_arguments_are_excluded() {
        let registry = base_registry();
        let extractor = VariableExtractor::new(&registry);
        assert!(extractor.extract("$set(%dynamic%,x)").is_empty());
    }

    #[test]
    fn one_broken_line_does_not_block_the_others() {
        let registry = base_registry();
        let extractor = VariableExtractor::new(&registry);
        // The second line is mid-edit: an unclosed variable reference.
        let script = "$set(good,1)\n$set(partial,%unclosed";
        let names = extractor.extract(script);
        assert!(names.contains("good"));
        // The regex fallback still recovers the broken line's static name.
        assert!(names.contains("partial"));
    }

    #[test]
    fn regex_fallback_survives_unbalanced_parentheses() {
        let registry = base_registry();
        let extractor = VariableExtractor::new(&registry);
        // Nothing here parses, not even line by line.
        let script = "$if($set(rescued,1)";
        assert_eq!(extractor.extract(script), set_of(&["rescued"]));
    }

    #[test]
    fn names_may_use_latin_extended_and_cjk_characters() {
        let registry = base_registry();
        let extractor = VariableExtractor::new(&registry);
        let names = extractor.extract("$set(café,1)\n$set(曲名,2)");
        assert!(names.contains("café"));
        assert!(names.contains("曲名"));
    }

    #[test]
    fn surrounding_whitespace_is_stripped_from_static_names() {
        let registry = base_registry();
        let extractor = VariableExtractor::new(&registry);
        let names = extractor.extract("$set( padded ,1)");
        assert!(names.contains("padded"));
        assert!(!names.contains(" padded "));
    }

    #[test]
    fn non_set_functions_contribute_nothing() {
        let registry = base_registry();
        let extractor = VariableExtractor::new(&registry);
        assert!(extractor.extract("$get(artist) %title%").is_empty());
    }
}
