mod error;
mod handlers;
mod models;
mod pipeline;
mod state;
mod util;

pub use handlers::{router, run_server, serve};
pub use state::ServerState;

pub const SERVICE_NAME: &str = "PhoText Backend";
