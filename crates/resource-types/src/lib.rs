//! Resource Types - Pure type definitions shared by every layer
//!
//! This crate contains only data types and the entity capability trait,
//! with no async runtime or storage dependencies.

pub mod entity;
pub mod envelope;
pub mod resource;

pub use entity::*;
pub use envelope::*;
pub use resource::*;
