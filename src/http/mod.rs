//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the static file handler and the avatar
//! endpoint, independent of either.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_file_response, build_health_response, build_json_response, build_options_response,
};
