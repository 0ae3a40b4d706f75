//! PATH-and-fallback executable resolution.
//!
//! Resolution order is fixed: the `PATH` of the process environment
//! first, then a list of well-known install directories, then a default
//! location that is returned without checking that anything exists
//! there. The unverified default keeps resolution total; callers that
//! need an existence guarantee use [`ToolResolver::resolve_existing`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

const DEFAULT_INSTALL_DIR: &str = "/usr/local/bin";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("executable '{name}' not found on PATH or in any known install location")]
    NotFound { name: String },
}

/// Finds executables by bare name.
///
/// The search environment is captured at construction, so a resolver
/// behaves the same for its whole lifetime even if the process
/// environment changes underneath it.
#[derive(Debug, Clone)]
pub struct ToolResolver {
    search_path: Option<OsString>,
    fallback_dirs: Vec<PathBuf>,
    default_dir: PathBuf,
    cwd: PathBuf,
}

impl ToolResolver {
    /// Captures `PATH` and the current directory from the process
    /// environment.
    pub fn from_env() -> Self {
        Self::with_environment(
            std::env::var_os("PATH"),
            Self::default_fallback_dirs(),
            PathBuf::from(DEFAULT_INSTALL_DIR),
        )
    }

    /// Builds a resolver over an explicit environment. Used directly by
    /// tests and by callers that resolve against something other than
    /// the live process environment.
    pub fn with_environment(
        search_path: Option<OsString>,
        fallback_dirs: Vec<PathBuf>,
        default_dir: PathBuf,
    ) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        ToolResolver {
            search_path,
            fallback_dirs,
            default_dir,
            cwd,
        }
    }

    /// Install directories probed after `PATH`, most specific first.
    /// Homebrew on Apple Silicon, the Intel/homegrown prefix, per-user
    /// installs, then the system directory.
    pub fn default_fallback_dirs() -> Vec<PathBuf> {
        let mut dirs = vec![
            PathBuf::from("/opt/homebrew/bin"),
            PathBuf::from("/usr/local/bin"),
        ];
        if let Some(home) = dirs::home_dir() {
            dirs.push(home.join(".local/bin"));
        }
        dirs.push(PathBuf::from("/usr/bin"));
        dirs
    }

    /// Resolves `name` to a path. Never fails: when neither `PATH` nor
    /// the fallback directories contain the executable, the answer is
    /// the default install location joined with `name`, unverified.
    pub fn resolve(&self, name: &str) -> PathBuf {
        if let Some(path_value) = &self.search_path {
            if let Ok(found) = which::which_in(name, Some(path_value), &self.cwd) {
                debug!(tool = name, path = %found.display(), "resolved via PATH");
                return found;
            }
        }
        for dir in &self.fallback_dirs {
            let candidate = dir.join(name);
            if is_executable_file(&candidate) {
                debug!(tool = name, path = %candidate.display(), "resolved via fallback directory");
                return candidate;
            }
        }
        let fallback = self.default_dir.join(name);
        debug!(tool = name, path = %fallback.display(), "not found, using default location");
        fallback
    }

    /// Like [`resolve`](Self::resolve) but errors instead of returning
    /// an unverified default, so the caller can refuse to spawn a
    /// process that cannot exist.
    pub fn resolve_existing(&self, name: &str) -> Result<PathBuf, ResolveError> {
        let candidate = self.resolve(name);
        if is_executable_file(&candidate) {
            Ok(candidate)
        } else {
            Err(ResolveError::NotFound {
                name: name.to_string(),
            })
        }
    }
}

impl Default for ToolResolver {
    fn default() -> Self {
        Self::from_env()
    }
}

fn is_executable_file(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(path) {
            Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
