use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::Value;

use crate::application::query::{
    Accumulator, Document, Filter, GROUP_KEY, GroupStage, Pipeline, ProjectStage, SortOrder,
    SortStage, Stage,
};

pub fn matches(filter: &Filter, doc: &Document) -> bool {
    match filter {
        Filter::All => true,
        Filter::Eq { field, value } => doc.get(field) == Some(value),
        Filter::In { field, values } => doc.get(field).is_some_and(|v| values.contains(v)),
    }
}

pub fn run_pipeline(mut docs: Vec<Document>, pipeline: &Pipeline) -> Vec<Document> {
    for stage in pipeline.stages() {
        docs = match stage {
            Stage::Group(g) => group(docs, g),
            Stage::Project(p) => project(docs, p),
            Stage::Sort(s) => sort(docs, s),
            Stage::Limit(n) => {
                docs.truncate(usize::try_from(*n).unwrap_or(usize::MAX));
                docs
            }
        };
    }
    docs
}

fn group(docs: Vec<Document>, stage: &GroupStage) -> Vec<Document> {
    // Groups come out in first-seen order of their key.
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(Value, i64)> = Vec::new();
    for doc in docs {
        let key = doc.get(&stage.by).cloned().unwrap_or(Value::Null);
        match index.get(&key.to_string()) {
            Some(&i) => groups[i].1 += 1,
            None => {
                index.insert(key.to_string(), groups.len());
                groups.push((key, 1));
            }
        }
    }
    groups
        .into_iter()
        .map(|(key, size)| {
            let mut out = Document::new();
            out.insert(GROUP_KEY.to_string(), key);
            for (name, acc) in &stage.outputs {
                let value = match acc {
                    Accumulator::Count => Value::from(size),
                };
                out.insert(name.clone(), value);
            }
            out
        })
        .collect()
}

fn project(docs: Vec<Document>, stage: &ProjectStage) -> Vec<Document> {
    docs.into_iter()
        .map(|doc| {
            let mut out = Document::new();
            for (output, source) in &stage.fields {
                if let Some(v) = doc.get(source) {
                    out.insert(output.clone(), v.clone());
                }
            }
            out
        })
        .collect()
}

fn sort(mut docs: Vec<Document>, stage: &SortStage) -> Vec<Document> {
    docs.sort_by(|a, b| {
        for (field, order) in &stage.keys {
            let ord = compare(a.get(field), b.get(field));
            let ord = match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    docs
}

fn type_rank(v: Option<&Value>) -> u8 {
    match v {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            match (x.as_i64(), y.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => x
                    .as_f64()
                    .unwrap_or(f64::NAN)
                    .total_cmp(&y.as_f64().unwrap_or(f64::NAN)),
            }
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    fn associations(counts: &[(&str, usize)]) -> Vec<Document> {
        counts
            .iter()
            .flat_map(|(tag, n)| {
                (0..*n).map(move |i| doc(json!({ "articleID": i, "tagID": tag })))
            })
            .collect()
    }

    fn popularity(limit: u64) -> Pipeline {
        Pipeline::group(GroupStage::by("tagID").count_as("count"))
            .project(
                ProjectStage::new()
                    .field("tagID", GROUP_KEY)
                    .field("count", "count"),
            )
            .sort(SortStage::descending("count"))
            .limit(limit)
    }

    #[test]
    fn membership_filter() {
        let d = doc(json!({ "name": "go" }));
        assert!(matches(&Filter::in_values("name", ["go", "rust"]), &d));
        assert!(!matches(&Filter::in_values("name", Vec::<Value>::new()), &d));
        assert!(!matches(&Filter::in_values("title", ["go"]), &d));
        assert!(matches(&Filter::All, &d));
    }

    #[test]
    fn counts_and_ranks_tags() {
        let out = run_pipeline(associations(&[("b", 3), ("a", 5), ("c", 1)]), &popularity(10));
        assert_eq!(
            out,
            vec![
                doc(json!({ "tagID": "a", "count": 5 })),
                doc(json!({ "tagID": "b", "count": 3 })),
                doc(json!({ "tagID": "c", "count": 1 })),
            ]
        );
    }

    #[test]
    fn limit_truncates_after_sort() {
        let out = run_pipeline(associations(&[("c", 1), ("a", 5), ("b", 3)]), &popularity(1));
        assert_eq!(out, vec![doc(json!({ "tagID": "a", "count": 5 }))]);
    }

    #[test]
    fn secondary_key_breaks_ties() {
        let docs = vec![
            doc(json!({ "name": "b", "count": 3 })),
            doc(json!({ "name": "a", "count": 3 })),
            doc(json!({ "name": "z", "count": 4 })),
        ];
        let sort = SortStage::descending("count").then_by("name", SortOrder::Ascending);
        let names: Vec<Value> = super::sort(docs, &sort)
            .into_iter()
            .map(|d| d["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("z"), json!("a"), json!("b")]);
    }
}
