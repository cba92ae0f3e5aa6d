//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and row-vector matrix construction
//! - Arena handles for entities, components and physics objects
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
