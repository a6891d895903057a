pub mod classifier;
pub mod matcher;

pub use classifier::InputClassifier;
pub use matcher::DefaultMatcher;
