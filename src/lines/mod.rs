//! Line-based collaborators for wordlists, target lists, pot files and result output

pub mod service;
pub mod service_trait;
