pub mod principal;
pub mod response;

pub use principal::resolve_principal_middleware;
pub use response::{ApiResponse, ApiResult};
