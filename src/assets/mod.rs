//! Image asset localization
//!
//! # Components
//!
//! - `naming`: legible, collision-free local file names
//! - `pipeline`: host/include filtering, paced downloads, manifest upkeep
//! - `rewrite`: pointing content markup at the downloaded files

mod naming;
mod pipeline;
mod rewrite;

pub use naming::{
    derive_image_base_name, extension_for, fallback_base_name, sanitize_file_name,
    FALLBACK_EXTENSION,
};
pub use pipeline::{ImagePipeline, ImageStats, PageImages};
pub use rewrite::rewrite_content_html;
