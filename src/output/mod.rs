// src/output/mod.rs
// =============================================================================
// This module turns fetched pages into files on disk.
//
// Submodules:
// - path: URL -> <root>/<url path>/index.html
// - writer: Directory creation and atomic file writes
// =============================================================================

mod path;
mod writer;

pub use writer::{WriteError, Writer};
