// Public API for integration tests and the question bank binary

pub mod api;
pub mod import;
pub mod regex_guard;
pub mod remote;
pub mod state;
pub mod types;
