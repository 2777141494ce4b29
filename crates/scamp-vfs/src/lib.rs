//! Scamp virtual file system.
//!
//! Program text is fetched before any stepping starts. A [`Vfs`] is an
//! explicit configuration object: an ordered table of mount prefixes, each
//! served by a [`VfsProvider`], plus an HTTP client for `http://` and
//! `https://` paths.
//!
//! ```no_run
//! # async fn demo() -> Result<(), scamp_vfs::VfsError> {
//! use scamp_vfs::{InMemoryProvider, Vfs};
//!
//! let mut vfs = Vfs::new();
//! vfs.mount("/lib/", InMemoryProvider::new([("prelude.scm", "(define id (lambda (x) x))")]));
//! let text = vfs.read("/lib/prelude.scm").await?;
//! # Ok(()) }
//! ```

mod error;
mod provider;
mod vfs;

pub use error::VfsError;
pub use provider::{DirectoryProvider, InMemoryProvider, VfsProvider};
pub use vfs::Vfs;
