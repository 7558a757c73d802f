//! # cohort
//!
//! The student records service - THE BINARY.
//!
//! - `api`: axum HTTP server over the student and school services
//! - `cli`: clap commands for the same operations
//! - `config`: layered startup settings

pub mod api;
pub mod cli;
pub mod config;
