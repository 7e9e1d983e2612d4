//! Filesystem anchors of a configuration build

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::config::OVERRIDE_FILE_NAME;
use crate::server::SERVER_CONFIG_PATH;

/// Where the user project, the framework sources and the side documents live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Root of the application project
    pub user_root: PathBuf,

    /// Directory of the framework sources (holds `HOC/`)
    pub framework_dir: PathBuf,

    /// Application entry module
    pub app_entry: PathBuf,

    /// Override document
    pub override_path: PathBuf,

    /// Server configuration document
    pub server_config_path: PathBuf,
}

impl ProjectLayout {
    /// Standard layout below `user_root`
    pub fn new(user_root: impl Into<PathBuf>, framework_dir: impl Into<PathBuf>) -> Self {
        let user_root = user_root.into();
        Self {
            override_path: user_root.join(OVERRIDE_FILE_NAME),
            server_config_path: user_root.join(SERVER_CONFIG_PATH),
            app_entry: PathBuf::from("./App"),
            framework_dir: framework_dir.into(),
            user_root,
        }
    }

    pub fn with_app_entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.app_entry = entry.into();
        self
    }

    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = path.into();
        self
    }

    pub fn with_server_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.server_config_path = path.into();
        self
    }

    /// Resolve every relative path against `cwd` and normalize `.`/`..`
    pub fn absolutize(self, cwd: &Path) -> Self {
        let resolve = |p: PathBuf| normalize(&cwd.join(p));
        Self {
            user_root: resolve(self.user_root),
            framework_dir: resolve(self.framework_dir),
            app_entry: resolve(self.app_entry),
            override_path: resolve(self.override_path),
            server_config_path: resolve(self.server_config_path),
        }
    }

    /// [`absolutize`](Self::absolutize) against the process working directory
    pub fn absolutize_from_cwd(self) -> io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(self.absolutize(&cwd))
    }

    /// A path below the user root, rendered for the bundler
    pub fn user_path(&self, relative: &str) -> String {
        display(&self.user_root.join(relative))
    }
}

/// Lexically remove `.` and `..` components.
///
/// Leading `..` of a relative path are kept; `..` above the root is dropped.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

pub(crate) fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
