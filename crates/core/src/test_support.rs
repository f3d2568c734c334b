use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{json, Value as JsonValue};
use vizkit_plugin_protocol::{Record, VisualizationSource};

/// Source serving a fixed schema and rows, keyed by row position.
pub struct StaticSource {
    pub fields: Vec<&'static str>,
    pub records: Vec<JsonValue>,
}

#[async_trait]
impl VisualizationSource for StaticSource {
    fn name(&self) -> &str {
        "Static Source"
    }

    fn key(&self) -> &str {
        "static"
    }

    async fn get_fields(&self) -> IndexMap<String, String> {
        self.fields
            .iter()
            .map(|f| (f.to_string(), f.to_string()))
            .collect()
    }

    async fn get_records(&self) -> IndexMap<String, Record> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (i.to_string(), serde_json::from_value(r.clone()).unwrap()))
            .collect()
    }
}

pub fn rainfall_source() -> StaticSource {
    StaticSource {
        fields: vec!["_id", "year", "region", "total"],
        records: vec![
            json!({"_id": 1, "year": "2019", "region": "north", "total": "10"}),
            json!({"_id": 2, "year": "2019", "region": "south", "total": "12"}),
            json!({"_id": 3, "year": "2020", "region": "north", "total": "7"}),
            json!({"_id": 4, "year": "2020", "total": "3"}),
        ],
    }
}
