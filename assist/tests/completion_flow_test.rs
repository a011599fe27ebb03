//! End-to-end editor assistance flow: extract user variables from a script,
//! classify the cursor position, and build the candidate list.

use tgs_assist::{CompletionChoicesProvider, CompletionMode, ContextDetector, VariableExtractor};
use tgs_core::util::{FastHashMap, FastHashSet};
use tgs_stdlib::base_registry;

fn init_tracing() {
    // Best effort; later calls are no-ops. Run with RUST_LOG=trace to see
    // which extraction strategies kicked in.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

const SCRIPT: &str = "\
$set(albumartist_sort,$if(%albumartist%,%albumartist%,%artist%))\n\
$set(folder,%albumartist_sort%/%album%)\n";

#[test]
fn typing_a_tag_argument_offers_extracted_variables() {
    init_tracing();
    let registry = base_registry();
    let extractor = VariableExtractor::new(&registry);
    let user_variables = extractor.extract(SCRIPT);
    assert!(user_variables.contains("albumartist_sort"));
    assert!(user_variables.contains("folder"));

    // The user keeps typing on a new line: `$unset(`
    let left_text = format!("{SCRIPT}$unset(");
    let details = ContextDetector::new().detect(&left_text);
    assert_eq!(details.mode, CompletionMode::TagNameArg);
    assert_eq!(details.function_name.as_deref(), Some("unset"));
    assert_eq!(details.arg_index, Some(0));

    let provider = CompletionChoicesProvider::new(FastHashSet::default);
    let choices = provider.build_choices(
        details.mode,
        &user_variables,
        &["album".to_string(), "albumartist".to_string(), "artist".to_string()],
        &FastHashMap::default(),
        &registry,
    );
    // Bare names in tag-argument position, builtins and extracted names mixed.
    assert!(choices.contains(&"albumartist_sort".to_string()));
    assert!(choices.contains(&"artist".to_string()));
    assert!(choices.iter().all(|choice| !choice.starts_with('%')));
}

#[test]
fn typing_a_variable_reference_offers_wrapped_names() {
    init_tracing();
    let registry = base_registry();
    let extractor = VariableExtractor::new(&registry);
    let user_variables = extractor.extract(SCRIPT);

    let left_text = format!("{SCRIPT}%albumartist_s");
    let details = ContextDetector::new().detect(&left_text);
    assert_eq!(details.mode, CompletionMode::Variable);

    let provider = CompletionChoicesProvider::new(FastHashSet::default);
    let mut usage = FastHashMap::default();
    usage.insert("albumartist_sort".to_string(), 3_i64);
    let choices = provider.build_choices(
        details.mode,
        &user_variables,
        &["album".to_string()],
        &usage,
        &registry,
    );
    // The most used variable ranks first, wrapped for insertion.
    assert_eq!(choices.first().map(String::as_str), Some("%albumartist_sort%"));
}

#[test]
fn typing_a_dollar_offers_function_names() {
    init_tracing();
    let registry = base_registry();

    let details = ContextDetector::new().detect("$");
    assert_eq!(details.mode, CompletionMode::FunctionName);

    let provider = CompletionChoicesProvider::new(FastHashSet::default);
    let choices = provider.build_choices(
        details.mode,
        &FastHashSet::default(),
        &[],
        &FastHashMap::default(),
        &registry,
    );
    for expected in ["$set", "$get", "$if", "$noop", "$copymerge"] {
        assert!(choices.contains(&expected.to_string()), "missing {expected}");
    }
}

#[test]
fn a_half_typed_line_still_surfaces_older_definitions() {
    init_tracing();
    let registry = base_registry();
    let extractor = VariableExtractor::new(&registry);

    // The last line is mid-edit and does not parse.
    let script = format!("{SCRIPT}$set(work_in_progress,%unfinished");
    let user_variables = extractor.extract(&script);
    assert!(user_variables.contains("albumartist_sort"));
    assert!(user_variables.contains("folder"));
    assert!(user_variables.contains("work_in_progress"));
}
