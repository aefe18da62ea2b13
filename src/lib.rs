pub mod api;
pub mod config;
pub mod data_models;
pub mod db;
pub mod error;
pub mod fallback;
pub mod identity;
pub mod manager;
pub mod normalize;
pub mod orchestrator;
