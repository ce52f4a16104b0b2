//! A curated knowledge tree with creator memos, reflection cycles against a
//! text-generation service, and a chronicle of integrated experiences.

pub mod config;
pub mod export;
pub mod generation;
pub mod library;
pub mod models;
pub mod session;
pub mod tree;
