//! Filesystem-based project detection.
//!
//! The detector looks at the immediate children of a directory and picks
//! the strongest container it finds. Workspaces win over projects, and
//! projects win over a bare `Package.swift` manifest, because building
//! through the outer container is what keeps scheme and dependency
//! resolution consistent.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

const WORKSPACE_EXTENSION: &str = "xcworkspace";
const PROJECT_EXTENSION: &str = "xcodeproj";
const PACKAGE_MANIFEST: &str = "Package.swift";

/// Classification of a project root.
///
/// The payload of the Xcode variants is the container's file stem
/// (`App.xcworkspace` detects as `XcodeWorkspace("App")`), not the full
/// file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ProjectKind {
    /// A `Package.swift` manifest with no Xcode container around it.
    Package,
    /// A `.xcodeproj` bundle.
    XcodeProject(String),
    /// A `.xcworkspace` bundle.
    XcodeWorkspace(String),
    /// Nothing recognizable, including paths that do not exist or cannot
    /// be read.
    Unknown,
}

impl ProjectKind {
    pub fn is_unknown(&self) -> bool {
        matches!(self, ProjectKind::Unknown)
    }

    /// Build-tool flag that selects this container kind, if the build
    /// tool takes one. Packages build from the working directory and
    /// unknown kinds cannot be built at all.
    pub fn container_flag(&self) -> Option<&'static str> {
        match self {
            ProjectKind::XcodeWorkspace(_) => Some("-workspace"),
            ProjectKind::XcodeProject(_) => Some("-project"),
            ProjectKind::Package | ProjectKind::Unknown => None,
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKind::Package => write!(f, "Swift Package"),
            ProjectKind::XcodeProject(name) => write!(f, "Xcode Project ({name})"),
            ProjectKind::XcodeWorkspace(name) => write!(f, "Xcode Workspace ({name})"),
            ProjectKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A classified project root: the directory that was inspected plus the
/// kind that was found there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub kind: ProjectKind,
    pub root_path: PathBuf,
}

impl ProjectDescriptor {
    /// Absolute-or-relative path of the container bundle, reconstructed
    /// from the root and the stored stem. `None` for packages and
    /// unknown kinds, which have no container.
    pub fn container_path(&self) -> Option<PathBuf> {
        match &self.kind {
            ProjectKind::XcodeWorkspace(name) => Some(
                self.root_path
                    .join(format!("{name}.{WORKSPACE_EXTENSION}")),
            ),
            ProjectKind::XcodeProject(name) => {
                Some(self.root_path.join(format!("{name}.{PROJECT_EXTENSION}")))
            }
            ProjectKind::Package | ProjectKind::Unknown => None,
        }
    }

    /// Builds a descriptor from an explicitly supplied container path,
    /// bypassing directory detection. A `.xcworkspace` path becomes a
    /// workspace descriptor; every other path is treated as a project
    /// container, which mirrors how the build tool itself interprets an
    /// explicit argument.
    pub fn from_container(path: &Path) -> Self {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        // `Path::parent` on a bare name is `Some("")`, not `None`; both
        // cases root at the current directory.
        let root_path = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        let kind = if path.extension().is_some_and(|ext| ext == WORKSPACE_EXTENSION) {
            ProjectKind::XcodeWorkspace(name)
        } else {
            ProjectKind::XcodeProject(name)
        };
        ProjectDescriptor { kind, root_path }
    }
}

/// Classifies the directory at `path`.
///
/// Total over all inputs: a missing path, a file, or an unreadable
/// directory all come back as `Unknown` rather than an error. Hidden
/// entries are skipped. When several containers of the same kind are
/// present, the first one in directory enumeration order wins.
pub fn detect(path: &Path) -> ProjectDescriptor {
    let kind = classify(path);
    debug!(path = %path.display(), kind = %kind, "project detection");
    ProjectDescriptor {
        kind,
        root_path: path.to_path_buf(),
    }
}

fn classify(path: &Path) -> ProjectKind {
    let entries = match visible_entries(path) {
        Some(entries) => entries,
        None => return ProjectKind::Unknown,
    };
    if let Some(name) = first_stem_with_extension(&entries, WORKSPACE_EXTENSION) {
        return ProjectKind::XcodeWorkspace(name);
    }
    if let Some(name) = first_stem_with_extension(&entries, PROJECT_EXTENSION) {
        return ProjectKind::XcodeProject(name);
    }
    let has_manifest = entries
        .iter()
        .any(|entry| entry.file_name().is_some_and(|name| name == PACKAGE_MANIFEST));
    if has_manifest {
        return ProjectKind::Package;
    }
    ProjectKind::Unknown
}

/// Immediate children of `path` minus dot-prefixed entries, in the
/// order the filesystem enumerates them. `None` when the directory
/// cannot be listed.
fn visible_entries(path: &Path) -> Option<Vec<PathBuf>> {
    let reader = fs::read_dir(path).ok()?;
    let mut entries = Vec::new();
    for entry in reader.flatten() {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        entries.push(entry.path());
    }
    Some(entries)
}

fn first_stem_with_extension(entries: &[PathBuf], extension: &str) -> Option<String> {
    entries
        .iter()
        .find(|entry| entry.extension().is_some_and(|ext| ext == extension))
        .and_then(|entry| entry.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
}
