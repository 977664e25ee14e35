//! Concurrent password auditing of live servers.

pub mod pool;
pub mod session;
pub mod target;
