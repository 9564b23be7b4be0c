//! Shared helpers for build phases: filesystem, HTTP and process seams.

pub mod fs;
pub mod http;
pub mod process;
pub mod template;
