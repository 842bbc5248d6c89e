mod http_layers;
pub mod server;
pub mod state;
mod studio_routes;

pub use http_layers::*;
pub use server::run_server;
pub(self) use studio_routes::make_studio_routes;
