pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod response;
pub mod schedule;
pub mod services;
pub mod sheets;
pub mod state;
pub mod window;
