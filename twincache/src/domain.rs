pub mod response {

    pub mod admin {
        #[derive(Clone, Debug)]
        pub struct ClearResponse {
            pub backends: Vec<String>,
        }

        impl ClearResponse {
            pub fn new(backends: Vec<String>) -> Self {
                Self { backends }
            }
        }

        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct BackendHealth {
            pub name: String,
            pub healthy: bool,
            pub error: Option<String>,
        }

        #[derive(Clone, Debug)]
        pub struct HealthResponse {
            pub backends: Vec<BackendHealth>,
        }

        impl HealthResponse {
            pub fn new(backends: Vec<BackendHealth>) -> Self {
                Self { backends }
            }

            /// Healthy while the read path can still be served by some backend
            pub fn is_serving(&self) -> bool {
                self.backends.iter().any(|b| b.healthy)
            }

            pub fn is_fully_healthy(&self) -> bool {
                self.backends.iter().all(|b| b.healthy)
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct LookupResponse {
        pub found: bool,
        pub value: Option<String>,
        /// Name of the backend that answered the hit
        pub source: Option<String>,
    }

    impl LookupResponse {
        pub fn hit(value: String, source: impl Into<String>) -> Self {
            Self {
                found: true,
                value: Some(value),
                source: Some(source.into()),
            }
        }

        pub fn miss() -> Self {
            Self {
                found: false,
                value: None,
                source: None,
            }
        }
    }

    #[derive(Clone, Debug)]
    pub struct StoreResponse {
        pub backends: Vec<String>,
    }

    impl StoreResponse {
        pub fn new(backends: Vec<String>) -> Self {
            Self { backends }
        }
    }

    #[derive(Clone, Debug)]
    pub struct RemoveResponse {
        pub backends: Vec<String>,
    }

    impl RemoveResponse {
        pub fn new(backends: Vec<String>) -> Self {
            Self { backends }
        }
    }
}
