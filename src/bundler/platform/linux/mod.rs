//! Linux packaging formats.

pub mod appimage;
