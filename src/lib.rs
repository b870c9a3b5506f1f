//! A Rust library for unpacking CSAF resource archives.
pub mod csaf;
pub mod ext;
pub mod types;
pub mod utils;
