// src/lib.rs
//! Resume analysis and job matching backend.
//!
//! One upload drives one forward-only pipeline run: text extraction,
//! language-model feedback and profile summary, candidate-query
//! extraction, then a job source (external fan-out search or local
//! dataset similarity) that produces ranked matches.

pub mod candidates;
pub mod config;
pub mod error;
pub mod extraction;
pub mod jobs;
pub mod pipeline;
pub mod summarizer;
pub mod web;

pub use config::AppConfig;
pub use web::start_web_server;
