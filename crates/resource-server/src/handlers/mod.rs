//! HTTP handlers

pub mod health;
mod render;
pub mod resources;

pub use health::health;
