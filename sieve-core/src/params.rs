// Merging request parameter sources into one value tree

use crate::value::{Map, Value};

/// The three parameter sources of a request, lowest precedence first.
#[derive(Debug, Clone, Default)]
pub struct ParamSources {
    /// Query-string parameters.
    pub query: Option<Map>,
    /// Decoded request body (JSON object, form fields or markup root).
    pub body: Option<Value>,
    /// Route template captures.
    pub route: Option<Map>,
}

impl ParamSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: Map) -> Self {
        self.query = Some(query);
        self
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn route(mut self, route: Map) -> Self {
        self.route = Some(route);
        self
    }

    /// Merge into a single tree: query, then body, then route.
    pub fn merge(self) -> Map {
        merge_params(self.query, self.body, self.route)
    }
}

/// Merge query, body and route parameters.
///
/// Later sources win per top-level key; nested values are replaced whole,
/// never merged. Missing sources count as empty.
pub fn merge_params(query: Option<Map>, body: Option<Value>, route: Option<Map>) -> Map {
    let mut merged = query.unwrap_or_default();

    for (key, value) in body.map(body_entries).unwrap_or_default() {
        merged.insert(key, value);
    }

    for (key, value) in route.unwrap_or_default() {
        merged.insert(key, value);
    }

    merged
}

/// Top-level entries contributed by a decoded body.
///
/// Mappings and markup elements give their entries, lists are keyed by
/// index, `Null` gives nothing and any other scalar becomes entry `"0"`.
pub fn body_entries(body: Value) -> Map {
    match body {
        Value::Map(map) => map,
        Value::Element(element) => element.children,
        Value::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
        Value::Null => Map::new(),
        scalar => {
            let mut map = Map::new();
            map.insert("0".to_string(), scalar);
            map
        }
    }
}
