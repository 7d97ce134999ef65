pub mod commands;
pub mod repo;
