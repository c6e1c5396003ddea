//! Domain layer: registry entities and value objects

pub mod entities;
pub mod value_objects;
