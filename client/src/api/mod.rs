pub mod http_transport;
pub mod transport;
pub mod types;

pub use http_transport::HttpTransport;
pub use transport::Transport;
pub use types::{ApiRequest, ApiResponse, IdentitySummary, LoginResponse, Role};
