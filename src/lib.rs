//! playgen: Interactive Playground Generation
//!
//! Scans a section of a lesson corpus, asks a generation model for one runnable
//! example per lesson that lacks one, validates the returned block and appends it
//! to the lesson file.

pub mod category;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod logging;
pub mod provider;
pub mod synthesis;
