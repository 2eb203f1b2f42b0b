pub mod aggregate;
pub mod backend;
pub mod cli;
pub mod db;
#[cfg(feature = "demo")]
pub mod demo;
pub mod derive;
pub mod error;
pub mod fmt;
pub mod forms;
pub mod models;
pub mod mutation;
pub mod screen;
pub mod search;
pub mod settings;
pub mod store;
