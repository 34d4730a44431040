pub mod db;
pub mod history;
pub mod models;
pub mod snapshot;

pub use rusqlite;
