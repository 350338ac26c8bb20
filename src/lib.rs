pub mod api;
pub mod catalog;
pub mod embed;
pub mod error;
pub mod progress;
pub mod user;
pub mod utils;
