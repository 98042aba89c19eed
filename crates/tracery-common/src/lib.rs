//! Shared utilities for the Tracery style engine.
//!
//! Currently this is only the deduplicated warning sink used by the compiler
//! and the runtime tracker to surface "silently skipped" conditions once.

pub mod warning;
