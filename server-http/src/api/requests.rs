use serde::Deserialize;

// === Cache Operation Models ===

#[derive(Debug, Deserialize)]
pub struct PutRequest {
    /// Optional echo of the path key; must match it when present
    #[serde(default)]
    pub key: Option<String>,
    pub value: String,
    #[serde(default)]
    pub ttl_ms: u64,
}
