//! Shared test utilities for the cfgsync workspace.
//!
//! This crate provides standardised document fixtures so each crate's test
//! suite does not set up temporary config files by hand. It is a
//! dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`document`]: [`TestDocument`] builder around a temporary config file
//! - [`fixtures`]: access to the shared `test-fixtures/documents` directory

pub mod document;
pub mod fixtures;

pub use document::TestDocument;
