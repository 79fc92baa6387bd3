//! URL handling module for Site-Harvester
//!
//! This module derives everything a run needs from the user-supplied site URL:
//! the root origin used to locate the sitemap, the site identifier used to name
//! the output directory, and the filesystem-safe token each page is stored under.

mod origin;
mod token;

// Re-export main functions
pub use origin::{root_origin, site_identifier, Origin};
pub use token::{path_token, target_filename};
