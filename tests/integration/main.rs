//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to stand in for vendor catalogs and exercise
//! fetching, extraction, resume, and export end-to-end.

mod common;
mod export_tests;
mod fetch_tests;
mod harvest_tests;
mod listing_tests;
