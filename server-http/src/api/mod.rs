pub mod requests;
pub mod responses;

pub use requests::PutRequest;
pub use responses::{
    BackendHealthResponse, ErrorResponse, GetResponse, HealthResponse, StatusResponse,
};
