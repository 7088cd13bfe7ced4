pub mod analysis;
pub mod api;
pub mod app;
pub mod cli;
pub mod cli_handlers;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod priority;
pub mod state;
pub mod store;
