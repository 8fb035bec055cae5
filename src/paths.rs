//! Path helpers shared by the path node layer and the persistence layer.
//!
//! Paths are held as native [`PathBuf`]s in memory and written to documents as `/`-separated
//! strings so a saved graph reads the same on every platform.

use std::{
    borrow::Cow,
    path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR},
};

use crate::error::MetagraphError;

/// Utility function to replace separators and convert to unicode (via to_string_lossy) on os path.
///
/// A leading root is kept as a leading `/`.
pub fn os_path_to_string<P: AsRef<Path>>(os_path_ref: P) -> String {
    let res = os_path_ref
        .as_ref()
        .components()
        .map(|c| match c {
            Component::RootDir => Cow::from("".to_string()),
            _ => c.as_os_str().to_string_lossy(),
        })
        .collect::<Vec<_>>()
        .join("/");
    if res.is_empty() && os_path_ref.as_ref().has_root() {
        return "/".to_string();
    }
    res
}

pub fn string_to_os_path(path_string: &str) -> PathBuf {
    PathBuf::from(path_string.replace('/', MAIN_SEPARATOR_STR))
}

/// Lexically normalize a path by dropping `.` components and folding `..` into the preceding
/// component.
///
/// Leading `..` components of a relative path are preserved. The filesystem is not consulted, so
/// symlinks are left as written.
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            _ => out.push(component),
        }
    }
    let res: PathBuf = out.iter().map(|c| c.as_os_str()).collect();
    if res.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        res
    }
}

/// Make `path` absolute against the current working directory, then normalize it.
pub fn absolutize<P: AsRef<Path>>(path: P) -> Result<PathBuf, MetagraphError> {
    let path = path.as_ref();
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(std::env::current_dir()?.join(path)))
    }
}

/// Path of `path` relative to `base`. Both are normalized first.
///
/// Fails with [`MetagraphError::InvalidPath`] when `path` does not lie under `base`.
pub fn relative_path<P: AsRef<Path>, B: AsRef<Path>>(
    path: P,
    base: B,
) -> Result<PathBuf, MetagraphError> {
    let path = normalize(path);
    let base = normalize(base);
    match path.strip_prefix(&base) {
        Ok(rel) if rel.as_os_str().is_empty() => Ok(PathBuf::from(".")),
        Ok(rel) => Ok(rel.to_path_buf()),
        Err(_) => Err(MetagraphError::InvalidPath(format!(
            "{path:?} is not under {base:?}"
        ))),
    }
}
