//! Query predicates for the data services

/// A query against one resource type: equality predicates plus paging and
/// expansion hints. Predicates are (property path, value) pairs combined with
/// AND; repeating a path ORs its values on the service side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub predicate: Vec<(String, String)>,
    pub offset: Option<usize>,
    pub count: Option<usize>,
    pub expand: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, path: impl Into<String>, value: impl ToString) -> Self {
        self.predicate.push((path.into(), value.to_string()));
        self
    }

    /// Restrict to records that have not been obsoleted
    pub fn active(self) -> Self {
        self.filter("obsoletionTime", "null")
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn expand(mut self, property: impl Into<String>) -> Self {
        self.expand.push(property.into());
        self
    }

    /// Encode as a URL query string (without the leading `?`)
    pub fn to_query_string(&self) -> String {
        let mut params: Vec<String> = self
            .predicate
            .iter()
            .map(|(path, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(path),
                    urlencoding::encode(value)
                )
            })
            .collect();

        if let Some(offset) = self.offset {
            params.push(format!("_offset={}", offset));
        }
        if let Some(count) = self.count {
            params.push(format!("_count={}", count));
        }
        for property in &self.expand {
            params.push(format!("_expand={}", urlencoding::encode(property)));
        }

        params.join("&")
    }

    /// Value of the first predicate on `path`
    pub fn value_of(&self, path: &str) -> Option<&str> {
        self.predicate
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, v)| v.as_str())
    }
}
