mod body;
mod cors;
mod error;
mod response;
mod server;
mod upstream;

pub use body::{FieldValue, FormField, RelayBody, build_form};
pub use cors::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN, preflight_handler};
pub use error::RelayError;
pub use response::{ResponseMode, relay_response};
pub use server::{AppState, RelayServer, create_router};
pub use upstream::{WebhookSource, host_label};
