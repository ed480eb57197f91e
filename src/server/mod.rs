pub mod handlers;
pub mod routes;

pub use routes::app;
