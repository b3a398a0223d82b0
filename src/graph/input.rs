//! Edge inputs accepted by the batch and option-taking mutations, including
//! the loosely-typed JSON forms.

use std::fmt::Debug;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::graph::{Edge, EdgeMeta, Graph, GraphError, Label, DEFAULT_WEIGHT};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeOptions {
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub label: Option<Label>,
}

impl EdgeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Decodes options from a JSON object such as `{"weight": 2, "label": "x"}`.
    ///
    /// `null` is treated as no options. Unknown keys and non-numeric weights
    /// are rejected with [`GraphError::InvalidEdgeOption`].
    pub fn from_json(value: &Value) -> Result<Self, GraphError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let opts: Self = serde_json::from_value(value.clone()).map_err(|err| {
            warn!(options = %value, error = %err, "rejected edge options");
            GraphError::InvalidEdgeOption(err.to_string())
        })?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        match self.weight {
            Some(weight) => Self::check_weight(weight),
            None => Ok(()),
        }
    }

    pub(crate) fn check_weight(weight: f64) -> Result<(), GraphError> {
        if weight.is_finite() {
            Ok(())
        } else {
            Err(GraphError::InvalidEdgeOption(format!(
                "weight must be a finite number, got {weight}"
            )))
        }
    }

    pub(crate) fn into_meta(self) -> EdgeMeta {
        EdgeMeta {
            weight: self.weight.unwrap_or(DEFAULT_WEIGHT),
            label: self.label,
        }
    }

    pub(crate) fn merge_into(self, meta: &mut EdgeMeta) {
        if let Some(weight) = self.weight {
            meta.weight = weight;
        }
        if let Some(label) = self.label {
            meta.label = Some(label);
        }
    }
}

/// Anything the batch edge operations accept: a full edge record or a bare pair.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeSpec<V> {
    Edge(Edge<V>),
    Pair(V, V),
}

impl<V> From<Edge<V>> for EdgeSpec<V> {
    fn from(edge: Edge<V>) -> Self {
        EdgeSpec::Edge(edge)
    }
}

impl<V> From<(V, V)> for EdgeSpec<V> {
    fn from((a, b): (V, V)) -> Self {
        EdgeSpec::Pair(a, b)
    }
}

impl<V: DeserializeOwned> EdgeSpec<V> {
    /// Decodes `{"v1": .., "v2": .., "weight": .., "label": ..}` or `[v1, v2]`.
    pub fn from_json(value: Value) -> Result<Self, GraphError> {
        match value {
            Value::Object(_) => serde_json::from_value::<Edge<V>>(value.clone())
                .map(EdgeSpec::Edge)
                .map_err(|err| invalid_edge(&value, &err.to_string())),
            Value::Array(_) => decode_pair(&value).map(|(a, b)| EdgeSpec::Pair(a, b)),
            other => Err(invalid_edge(&other, "expected an edge object or a pair")),
        }
    }
}

fn decode_pair<V: DeserializeOwned>(value: &Value) -> Result<(V, V), GraphError> {
    match value.as_array().map(Vec::as_slice) {
        Some([a, b]) => {
            let a = serde_json::from_value(a.clone())
                .map_err(|err| invalid_edge(value, &err.to_string()))?;
            let b = serde_json::from_value(b.clone())
                .map_err(|err| invalid_edge(value, &err.to_string()))?;
            Ok((a, b))
        }
        _ => Err(invalid_edge(value, "expected a pair of vertices")),
    }
}

fn invalid_edge(value: &Value, reason: &str) -> GraphError {
    warn!(edge = %value, reason, "rejected edge input");
    GraphError::InvalidEdge(format!("{value}: {reason}"))
}

impl<V> Graph<V>
where
    V: Clone + Eq + Hash + Debug + DeserializeOwned,
{
    /// Like [`Graph::add_edges`], decoding each element with [`EdgeSpec::from_json`].
    pub fn add_edges_json<I>(&self, values: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = Value>,
    {
        let specs = values
            .into_iter()
            .map(EdgeSpec::from_json)
            .collect::<Result<Vec<EdgeSpec<V>>, _>>()?;
        self.add_edges(specs)
    }

    /// Deletes every `[v1, v2]` pair in `values`; any other element is an
    /// [`GraphError::InvalidEdge`].
    pub fn delete_edges_json<I>(&self, values: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = Value>,
    {
        let pairs = values
            .into_iter()
            .map(|value| decode_pair::<V>(&value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.delete_edges(pairs.iter().map(|(a, b)| (a, b))))
    }

    pub fn add_edge_json(&self, a: V, b: V, opts: &Value) -> Result<Self, GraphError> {
        self.add_edge_with(a, b, EdgeOptions::from_json(opts)?)
    }

    pub fn update_edge_json(&self, a: &V, b: &V, opts: &Value) -> Result<Self, GraphError> {
        self.update_edge(a, b, EdgeOptions::from_json(opts)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::graph::{Edge, EdgeOptions, EdgeSpec, Graph, GraphError};

    #[test]
    fn options_accept_weight_and_label() {
        let opts = EdgeOptions::from_json(&json!({"weight": 3, "label": {"k": 1}})).expect("opts");
        assert_eq!(opts, EdgeOptions::new().weight(3.0).label(json!({"k": 1})));
        assert_eq!(EdgeOptions::from_json(&json!(null)).expect("null"), EdgeOptions::new());
    }

    #[test]
    fn options_reject_unknown_keys_and_bad_weights() {
        for bad in [json!({"colour": "red"}), json!({"weight": "heavy"}), json!(7)] {
            assert!(
                matches!(EdgeOptions::from_json(&bad), Err(GraphError::InvalidEdgeOption(_))),
                "expected rejection for {bad}"
            );
        }
    }

    #[test]
    fn edge_spec_decodes_records_and_pairs() {
        let record: EdgeSpec<String> =
            EdgeSpec::from_json(json!({"v1": "a", "v2": "b", "weight": 2.0})).expect("record");
        assert_eq!(
            record,
            EdgeSpec::Edge(Edge::new("a".to_string(), "b".to_string()).with_weight(2.0))
        );
        let pair: EdgeSpec<String> = EdgeSpec::from_json(json!(["a", "b"])).expect("pair");
        assert_eq!(pair, EdgeSpec::Pair("a".to_string(), "b".to_string()));
    }

    #[test]
    fn add_edges_json_rejects_malformed_elements() {
        let graph: Graph<String> = Graph::new();
        let result = graph.add_edges_json(vec![json!(["a", "b"]), json!(["a", "b", "c"])]);
        assert!(matches!(result, Err(GraphError::InvalidEdge(_))));
        assert!(matches!(
            graph.add_edges_json(vec![json!("a")]),
            Err(GraphError::InvalidEdge(_))
        ));
        assert_eq!(graph.num_edges(), 0);

        let built = graph
            .add_edges_json(vec![json!(["a", "b"]), json!({"v1": "b", "v2": "c", "label": "x"})])
            .expect("valid edges");
        assert_eq!(built.num_edges(), 2);
        assert_eq!(built.edge_label(&"b".to_string(), &"c".to_string()), Some(&json!("x")));
    }

    #[test]
    fn delete_edges_json_requires_pairs() {
        let graph: Graph<String> = Graph::new()
            .add_edge("a".to_string(), "b".to_string())
            .add_edge("b".to_string(), "c".to_string());
        let next = graph.delete_edges_json(vec![json!(["a", "b"])]).expect("delete");
        assert_eq!(next.num_edges(), 1);
        assert!(matches!(
            graph.delete_edges_json(vec![json!({"v1": "a", "v2": "b"})]),
            Err(GraphError::InvalidEdge(_))
        ));
    }

    #[test]
    fn update_edge_json_validates_options() {
        let graph: Graph<u32> = Graph::new().add_edge(1, 2);
        let updated = graph
            .update_edge_json(&1, &2, &json!({"weight": 0.5}))
            .expect("update");
        assert_eq!(updated.edge(&1, &2).map(|edge| edge.weight), Some(0.5));
        assert!(matches!(
            graph.update_edge_json(&1, &2, &json!({"weight": null, "color": 1})),
            Err(GraphError::InvalidEdgeOption(_))
        ));
    }
}
