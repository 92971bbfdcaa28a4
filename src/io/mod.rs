//! Mesh file I/O.
//!
//! This module provides functions for loading and saving meshes in various formats.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | OFF | `.off` | ✓ | ✓ | Polygons are fan-triangulated |
//! | STL | `.stl` | ✓ | ✓ | Binary and ASCII load, binary save |
//!
//! # Usage
//!
//! The easiest way to load and save meshes is using the automatic format detection:
//!
//! ```no_run
//! use edgefold::io::{load, save};
//! use edgefold::mesh::HalfEdgeMesh;
//!
//! // Load with automatic format detection
//! let mesh: HalfEdgeMesh = load("model.off").unwrap();
//!
//! // Save with automatic format detection
//! save(&mesh, "output.stl").unwrap();
//! ```
//!
//! Saving skips removed elements, so a simplified mesh can be written
//! without compacting it first.

pub mod off;
pub mod stl;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Object File Format.
    Off,
    /// STL (stereolithography) format.
    Stl,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "off" => Some(Format::Off),
            "stl" => Some(Format::Stl),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file with automatic format detection.
///
/// The format is determined by the file extension.
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Off => off::load(path),
        Format::Stl => stl::load(path),
    }
}

/// Save a mesh to a file with automatic format detection.
///
/// The format is determined by the file extension.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Off => off::save(mesh, path),
        Format::Stl => stl::save(mesh, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/bunny.OFF"), Some(Format::Off));
        assert_eq!(Format::from_path("part.stl"), Some(Format::Stl));
        assert_eq!(Format::from_path("scene.gltf"), None);
        assert_eq!(Format::from_path("README"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let mesh = fixtures::single_triangle();
        let err = save(&mesh, "mesh.xyz").unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat { ref extension } if extension == "xyz"));

        let err = load::<_, u32>("mesh").unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat { ref extension } if extension == "(none)"));
    }

    #[test]
    fn test_off_file_roundtrip() {
        let mesh = fixtures::grid(3);
        let path = std::env::temp_dir().join(format!("edgefold-io-{}.off", std::process::id()));

        save(&mesh, &path).unwrap();
        let loaded: HalfEdgeMesh = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_vertices(), mesh.num_vertices());
        assert_eq!(loaded.num_faces(), mesh.num_faces());
        assert_eq!(loaded.euler_characteristic(), 1);
    }
}
