//! Signals derived from README text: technology stack and representative image.

mod downloader;
mod images;
mod tech_stack;

pub use downloader::{DEFAULT_MAX_IMAGE_BYTES, ImageDownloader, ImageRef, image_file_name, sanitize_file_name};
pub use images::{
    DEFAULT_RAW_CONTENT_BASE, ImageCandidate, SUPPORTED_EXTENSIONS, find_image_references, is_supported_reference, resolve_image_url,
    select_representative_image,
};
pub use tech_stack::{KNOWN_TECHNOLOGIES, MAX_TECH_STACK, extract_tech_stack, minimal_tech_stack};
