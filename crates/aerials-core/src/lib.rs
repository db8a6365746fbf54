pub mod config;
pub mod logging;

// Download engine, leaves first.
pub mod catalog;
pub mod fetch_head;
pub mod retry;
pub mod scheduler;
pub mod selector;
pub mod transfer;
pub mod url_model;
