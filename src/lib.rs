//! Séance(s) TUI - a terminal client for browsing cinema showtimes.
//!
//! This library exposes modules for use in integration tests.

pub mod api;
pub mod app;
pub mod models;
pub mod ui;
