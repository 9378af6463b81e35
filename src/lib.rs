pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod migration;
pub mod policy;
pub mod router;
pub mod types;

pub use router::build_router;
