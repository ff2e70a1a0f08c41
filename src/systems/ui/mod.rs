//! Screen-space UI built from sprites and text.
pub mod window;
