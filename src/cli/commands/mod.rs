pub mod config;
pub mod models;
pub mod pathways;
pub mod patterns;
pub mod run;
pub mod search;
pub mod transcript;
pub mod workflow;
