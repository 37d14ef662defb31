//! Infrastructure layer: file-backed repositories and planogram loaders

pub mod persistence;
pub mod planogram_loader;
