//! Domain layer: manifest documents, name maps and release labels

pub mod entities;
pub mod value_objects;
