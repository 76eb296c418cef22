//! Typed aggregation pipelines.
//!
//! Stages can only be chained in the order group → project → sort → limit,
//! each step optional from the right. The builder types make any other
//! order unrepresentable, so a pipeline that reaches the store always has a
//! shape each stage can consume.

use serde_json::{Map, Value, json};

/// Field holding the grouping key in documents emitted by a group stage.
pub const GROUP_KEY: &str = "_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulator {
    /// Number of documents in the group (`$sum: 1`).
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStage {
    pub by: String,
    pub outputs: Vec<(String, Accumulator)>,
}

impl GroupStage {
    pub fn by(field: impl Into<String>) -> Self {
        Self {
            by: field.into(),
            outputs: Vec::new(),
        }
    }

    pub fn count_as(mut self, output: impl Into<String>) -> Self {
        self.outputs.push((output.into(), Accumulator::Count));
        self
    }
}

/// Reshapes each document to exactly the listed fields. Anything not
/// listed, the group key included, is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectStage {
    pub fields: Vec<(String, String)>,
}

impl ProjectStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `output` taking its value from `source` of the incoming document.
    pub fn field(mut self, output: impl Into<String>, source: impl Into<String>) -> Self {
        self.fields.push((output.into(), source.into()));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn direction(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

/// Sort keys in priority order; later keys break ties of earlier ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortStage {
    pub keys: Vec<(String, SortOrder)>,
}

impl SortStage {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            keys: vec![(field.into(), SortOrder::Ascending)],
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            keys: vec![(field.into(), SortOrder::Descending)],
        }
    }

    pub fn then_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.keys.push((field.into(), order));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Group(GroupStage),
    Project(ProjectStage),
    Sort(SortStage),
    Limit(u64),
}

impl Stage {
    /// Store-command rendering of the stage, used for tracing.
    pub fn describe(&self) -> Value {
        match self {
            Stage::Group(g) => {
                let mut body = Map::new();
                body.insert(GROUP_KEY.into(), Value::String(format!("${}", g.by)));
                for (name, acc) in &g.outputs {
                    match acc {
                        Accumulator::Count => body.insert(name.clone(), json!({ "$sum": 1 })),
                    };
                }
                json!({ "$group": body })
            }
            Stage::Project(p) => {
                let mut body = Map::new();
                for (output, source) in &p.fields {
                    body.insert(output.clone(), Value::String(format!("${source}")));
                }
                if !p.fields.iter().any(|(output, _)| output == GROUP_KEY) {
                    body.insert(GROUP_KEY.into(), json!(0));
                }
                json!({ "$project": body })
            }
            Stage::Sort(s) => {
                let mut body = Map::new();
                for (field, order) in &s.keys {
                    body.insert(field.clone(), json!(order.direction()));
                }
                json!({ "$sort": body })
            }
            Stage::Limit(n) => json!({ "$limit": n }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn group(stage: GroupStage) -> Grouped {
        Grouped {
            stages: vec![Stage::Group(stage)],
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn describe(&self) -> Value {
        Value::Array(self.stages.iter().map(Stage::describe).collect())
    }
}

pub struct Grouped {
    stages: Vec<Stage>,
}

impl Grouped {
    pub fn project(mut self, stage: ProjectStage) -> Projected {
        self.stages.push(Stage::Project(stage));
        Projected {
            stages: self.stages,
        }
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

pub struct Projected {
    stages: Vec<Stage>,
}

impl Projected {
    pub fn sort(mut self, stage: SortStage) -> Sorted {
        self.stages.push(Stage::Sort(stage));
        Sorted {
            stages: self.stages,
        }
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

pub struct Sorted {
    stages: Vec<Stage>,
}

impl Sorted {
    pub fn limit(mut self, n: u64) -> Pipeline {
        self.stages.push(Stage::Limit(n));
        Pipeline {
            stages: self.stages,
        }
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}
