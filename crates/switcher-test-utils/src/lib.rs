//! Shared test utilities for the theme-switcher workspace.
//!
//! This crate provides a standardised site fixture to eliminate setup
//! duplication across test suites. It is a dev-dependency only — never
//! published.

pub mod site;

pub use site::TestSite;
