//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and tolerances
//! - Generic matrix helpers
//! - Logging utilities

pub mod math;
pub mod matrix;
pub mod logging;
