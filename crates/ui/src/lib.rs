//! Rendering-agnostic view models for the exam screens.
//!
//! Everything here is a pure mapping from service snapshots to display data,
//! so any front end (terminal, desktop, web) can bind to it.

pub mod vm;
