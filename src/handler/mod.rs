//! Request handler module
//!
//! Routing dispatch, the avatar lookup endpoint and static frontend serving.

pub(crate) mod avatar;
pub mod profile;
pub mod router;
pub mod static_files;

pub use avatar::{lookup_avatar, parse_size, AvatarError};
pub use profile::{AvatarProfile, NitroType, UserFlags};
pub use router::handle_request;
