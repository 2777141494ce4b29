//! Reading program text through the VFS.

use anyhow::{Context, Result};
use scamp_types::{ScampError, SourceFile};
use scamp_vfs::{DirectoryProvider, Vfs};

/// Parse a `PREFIX=DIR` mount argument.
pub fn parse_mount(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((prefix, dir)) if !prefix.is_empty() && !dir.is_empty() => {
            Ok((prefix.to_string(), dir.to_string()))
        }
        _ => Err(format!("expected PREFIX=DIR, got '{arg}'")),
    }
}

/// Build the mount table. Relative and absolute local paths are always
/// readable; user mounts take precedence because their prefixes are longer.
pub fn build_vfs(mounts: &[(String, String)]) -> Vfs {
    let mut vfs = Vfs::new();
    vfs.mount("", DirectoryProvider::new("."))
        .mount("/", DirectoryProvider::new("/"));
    for (prefix, dir) in mounts {
        vfs.mount(prefix.clone(), DirectoryProvider::new(dir));
    }
    vfs
}

pub fn read_source(mounts: &[(String, String)], path: &str) -> Result<SourceFile> {
    let vfs = build_vfs(mounts);
    let runtime = tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
    let text = runtime
        .block_on(vfs.read(path))
        .map_err(ScampError::from)
        .with_context(|| format!("could not load {path}"))?;
    Ok(SourceFile::new(path, text))
}
