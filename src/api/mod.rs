pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{create_router, serve, SharedApp, TodoServer};
