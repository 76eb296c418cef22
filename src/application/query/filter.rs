use serde_json::Value;

use super::Document;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document in the collection.
    All,
    Eq {
        field: String,
        value: Value,
    },
    /// Field value is one of `values`. An empty list matches nothing.
    In {
        field: String,
        values: Vec<Value>,
    },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn in_values<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Field/value pairs a document inserted by an upsert inherits from the filter.
    pub fn equality_fields(&self) -> Document {
        let mut out = Document::new();
        if let Filter::Eq { field, value } = self {
            out.insert(field.clone(), value.clone());
        }
        out
    }
}

/// A `$set`-style update: every listed field is overwritten on the matched document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    set: Document,
}

impl Update {
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and_set(field, value)
    }

    pub fn and_set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    pub fn fields(&self) -> &Document {
        &self.set
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub upsert: bool,
}

impl UpdateOptions {
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upsert_inherits_only_equality_fields() {
        let eq = Filter::eq("name", "rust");
        assert_eq!(eq.equality_fields().get("name"), Some(&json!("rust")));

        let membership = Filter::in_values("name", ["go", "rust"]);
        assert!(membership.equality_fields().is_empty());
        assert!(Filter::All.equality_fields().is_empty());
    }

    #[test]
    fn later_set_overrides_earlier_value() {
        let update = Update::set("name", "go").and_set("name", "rust");
        assert_eq!(update.fields().len(), 1);
        assert_eq!(update.fields().get("name"), Some(&json!("rust")));
    }
}
