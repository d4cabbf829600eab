pub mod config;
pub mod consts;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod pricing;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

pub use routes::app;
