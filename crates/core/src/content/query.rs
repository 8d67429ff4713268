use url::Url;

/// Filter operators understood by the items endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lt,
    Gt,
}

impl Op {
    fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "_eq",
            Op::Lt => "_lt",
            Op::Gt => "_gt",
        }
    }
}

/// Query string for `GET /items/{collection}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemsQuery {
    filters: Vec<(String, Op, String)>,
    sort: Option<String>,
    limit: Option<u32>,
    fields: Option<String>,
}

impl ItemsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, op: Op, value: impl ToString) -> Self {
        self.filters.push((field.to_string(), op, value.to_string()));
        self
    }

    /// Only published items.
    pub fn published(self) -> Self {
        self.filter("status", Op::Eq, "published")
    }

    /// Sort by `field`, descending when prefixed with `-`.
    pub fn sort(mut self, field: &str) -> Self {
        self.sort = Some(field.to_string());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn fields(mut self, fields: &str) -> Self {
        self.fields = Some(fields.to_string());
        self
    }

    /// Query pairs in the backend's `filter[field][_op]=value` form.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|(field, op, value)| (format!("filter[{}][{}]", field, op.as_str()), value.clone()))
            .collect();
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(fields) = &self.fields {
            pairs.push(("fields".to_string(), fields.clone()));
        }
        pairs
    }

    /// Append the encoded query to `endpoint`.
    pub fn apply(&self, endpoint: &mut Url) {
        let pairs = self.pairs();
        if pairs.is_empty() {
            return;
        }
        let mut query = endpoint.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(&key, &value);
        }
    }
}

/// Render a sort value without a fractional part when it has none.
pub fn sort_value(sort: f64) -> String {
    if sort.fract() == 0.0 && sort.abs() < 1e15 {
        format!("{}", sort as i64)
    } else {
        sort.to_string()
    }
}
