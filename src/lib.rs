pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod observability;
