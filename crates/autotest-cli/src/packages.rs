//! Finding Go packages on disk.
//!
//! Arguments that aren't existing directories are looked up as import
//! paths under each `$GOPATH/src` and `$GOROOT/src`. Watched directories
//! under a `$GOPATH/src` map back to the package names passed to the
//! command.

use std::env;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Source roots of the Go workspace.
#[derive(Debug, Clone, Default)]
pub struct GoWorkspace {
    gopath_src: Vec<PathBuf>,
    goroot_src: Option<PathBuf>,
}

impl GoWorkspace {
    pub fn from_env() -> Self {
        Self::from_vars(env::var_os("GOPATH"), env::var_os("GOROOT"))
    }

    pub fn from_vars(gopath: Option<OsString>, goroot: Option<OsString>) -> Self {
        let gopath_src = gopath
            .map(|p| {
                env::split_paths(&p)
                    .filter(|entry| !entry.as_os_str().is_empty())
                    .map(|entry| entry.join("src"))
                    .collect()
            })
            .unwrap_or_default();
        let goroot_src = goroot
            .filter(|p| !p.is_empty())
            .map(|p| PathBuf::from(p).join("src"));

        Self {
            gopath_src,
            goroot_src,
        }
    }

    /// True when `GOPATH` names at least one workspace.
    pub fn has_gopath(&self) -> bool {
        !self.gopath_src.is_empty()
    }

    /// The package name for a directory, if it lies under a `$GOPATH/src`.
    pub fn package_name(&self, path: &Path) -> Option<String> {
        self.gopath_src.iter().find_map(|src| {
            let rel = path.strip_prefix(src).ok()?;
            let parts: Vec<_> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("/"))
            }
        })
    }

    /// Package names for every watched directory that has one.
    pub fn units(&self, watched: &[PathBuf]) -> Vec<String> {
        watched
            .iter()
            .filter_map(|path| self.package_name(path))
            .collect()
    }

    /// Resolves a command-line target to a directory to watch.
    ///
    /// Existing directories win (relative ones are made absolute against
    /// `cwd`); otherwise the target is tried as an import path.
    pub fn find_package(&self, target: &str, cwd: &Path) -> Option<PathBuf> {
        let direct = cwd.join(target);
        if direct.is_dir() {
            return Some(normalize(&direct));
        }

        let found = self
            .gopath_src
            .iter()
            .chain(self.goroot_src.as_ref())
            .map(|src| normalize(&src.join(target)))
            .find(|candidate| candidate.is_dir())?;
        debug!("package {} found in {}", target, found.display());
        Some(found)
    }
}

/// Cleans a path lexically: `.` components are dropped and `..` pops
/// the previous component, so every spelling of a directory watches the
/// same path.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}
