//! Application service layer - audit workflow, config, scanning

pub mod app;
pub mod config;
pub mod repository;
pub mod scanner;
pub mod seed;
