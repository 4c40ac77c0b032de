//! Output generation: article files and per-app manifests.
//!
//! # Submodules
//!
//! - [`json`]: Writes article lists and manifests as indented JSON
//! - [`manifest`]: Derives raw GitHub URLs for the files an app wrote
//!
//! # Output Structure
//!
//! ```text
//! docs/data/
//! ├── demo/
//! │   ├── top.json
//! │   ├── world.json
//! │   └── config.json      # manifest
//! └── Daily News/
//!     ├── top.json
//!     └── config.json
//! ```

pub mod json;
pub mod manifest;
