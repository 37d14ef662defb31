//! Domain layer: shelf compliance models, services and repository traits

pub mod model;
pub mod repository;
pub mod service;
