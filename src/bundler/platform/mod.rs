//! Platform-specific packaging.

pub mod linux;
