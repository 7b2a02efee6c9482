pub mod api;
pub mod cache;
pub mod calendar;
pub mod card;
pub mod common;
pub mod config;
pub mod logging;
pub mod server;
pub mod session;
pub mod ticket;

// Layered boundaries for application ports and their adapters
pub mod app;
pub mod infra;
