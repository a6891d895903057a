pub mod merger;
pub mod partition;

pub use merger::AliasSetMerger;
pub use partition::AliasPartition;
