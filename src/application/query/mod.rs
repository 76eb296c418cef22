pub mod filter;
pub mod pipeline;

pub use filter::{Filter, Update, UpdateOptions};
pub use pipeline::{
    Accumulator, GROUP_KEY, GroupStage, Pipeline, ProjectStage, SortOrder, SortStage, Stage,
};

/// A raw store document: a JSON object keyed by field name.
pub type Document = serde_json::Map<String, serde_json::Value>;
