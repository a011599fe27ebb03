pub mod control;
pub mod tags;


use tgs_core::registry::FunctionRegistry;

/// Register the base function set with the given registry.
///
/// The engine itself has no ambient function catalog; hosts compose a
/// registry from this base set plus whatever their plugins contribute.
pub fn register_base_functions(registry: &mut FunctionRegistry) {
    tags::register(registry);
    control::register(registry);
}

/// A registry pre-populated with the base function set.
pub fn base_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    register_base_functions(&mut registry);
    registry
}
