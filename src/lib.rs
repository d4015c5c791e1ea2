pub mod error;
pub mod models;
pub mod screens;
pub mod services;
