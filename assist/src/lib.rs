pub mod choices;
pub mod context;
pub mod extract;

#[cfg(test)]
mod choices_test;
#[cfg(test)]
mod extract_test;

pub use choices::CompletionChoicesProvider;
pub use context::{CompletionMode, ContextDetails, ContextDetector, TAG_NAME_FIRST_ARG_FUNCTIONS};
pub use extract::VariableExtractor;
