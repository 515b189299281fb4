pub mod accounting;
pub mod cli;
pub mod config;
pub mod data;
