//! Project classification
//!
//! Identifies what kind of buildable project sits at a filesystem path:
//! a Swift package, an Xcode project, an Xcode workspace, or nothing we
//! recognize. Classification is a single-level directory scan; it never
//! descends into subdirectories and never fails.

pub mod detector;

pub use detector::{detect, ProjectDescriptor, ProjectKind};
