//! Progress indication while a use case runs

pub mod reporter;
