//! Runtime settings read from application.toml

pub mod config;
