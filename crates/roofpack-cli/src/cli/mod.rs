//! CLI command implementations.
//!
//! - `pack` - Pack panels onto a batch of images
//! - `mask` - Write the rooftop mask of one image
//! - `config` - Print the default configuration

pub mod common;
pub mod config;
pub mod mask;
pub mod pack;

pub use config::cmd_config;
pub use mask::{cmd_mask, MaskArgs};
pub use pack::{cmd_pack, PackArgs};
