pub mod admin;
pub mod broadcast;
pub mod clock;
pub mod config;
pub mod connection;
pub mod handlers;
mod identity;
mod lifecycle;
mod router;
pub mod server;
pub mod session_table;
