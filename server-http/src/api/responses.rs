use serde::Serialize;

// === Cache Operation Models ===

#[derive(Debug, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: String,
    pub source: String,
}

/// Acknowledgement for store, remove and clear
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub backends: Vec<String>,
}

impl StatusResponse {
    pub fn ok(backends: Vec<String>) -> Self {
        Self {
            status: "ok",
            backends,
        }
    }
}

// === Health Models ===

#[derive(Debug, Serialize)]
pub struct BackendHealthResponse {
    pub name: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backends: Vec<BackendHealthResponse>,
}

// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Backends that hold the new state despite the failure
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applied: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            backend: None,
            operation: None,
            applied: Vec::new(),
        }
    }
}
