// Public API for the terminal host and integration tests

pub mod config;
pub mod game;
pub mod protocol;
pub mod questions;
pub mod state;
pub mod store;
pub mod timer;
pub mod types;
pub mod wheel;
