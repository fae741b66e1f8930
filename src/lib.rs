pub mod config;
pub mod core;
pub mod layout;
pub mod models;
