pub mod config;
pub mod display;
pub mod fetch;
pub mod import;
pub mod poller;
pub mod server;
pub mod service;
