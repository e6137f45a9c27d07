//! Integration tests for the playground generation pipeline

mod config_integration;
mod corpus_scan;
mod pipeline_end_to_end;
mod test_utils;
