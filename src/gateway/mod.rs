//! Gateway server implementation

mod router;
mod server;

pub use router::{ApiError, AppState, create_router};
pub use server::Gateway;
