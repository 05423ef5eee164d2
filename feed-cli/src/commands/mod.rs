//! CLI command implementations.

pub mod feed;
pub mod like;
pub mod login;
pub mod logout;
pub mod status;
