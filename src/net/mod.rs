//! HTTP plumbing: wire types, the transport seam, and the authenticated client.

pub mod client;
pub mod refresh;
pub mod transport;
pub mod types;

pub use client::{HttpClient, TOKEN_REFRESH_PATH};
pub use refresh::RefreshGuard;
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    ApiRequest, ApiResponse, Attempt, FormPart, Method, RequestBody, encode_json, path_segment, query_pairs,
};
