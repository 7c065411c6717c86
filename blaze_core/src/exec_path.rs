/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::borrow::Borrow;
use std::ops::Deref;
use std::path::Path;

use derive_more::Display;
use ref_cast::RefCast;
use thiserror::Error;

/// Errors from [`ExecPath`] verification.
#[derive(Error, Debug)]
enum ExecPathError {
    #[error("expected a relative path but got an absolute path: `{0}`")]
    PathNotRelative(String),
    #[error("`.` and `..` path segments are not allowed: `{0}`")]
    PathNotNormalized(String),
    #[error("empty path segment in `{0}`")]
    EmptySegment(String),
    #[error("backslashes in path: `{0}`")]
    Backslashes(String),
}

fn verify(path: &str) -> anyhow::Result<()> {
    if path.is_empty() {
        return Ok(());
    }
    if path.starts_with('/') {
        return Err(ExecPathError::PathNotRelative(path.to_owned()).into());
    }
    if path.contains('\\') {
        return Err(ExecPathError::Backslashes(path.to_owned()).into());
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(ExecPathError::EmptySegment(path.to_owned()).into());
        }
        if segment == "." || segment == ".." {
            return Err(ExecPathError::PathNotNormalized(path.to_owned()).into());
        }
    }
    Ok(())
}

/// A normalized, forward-slash separated path relative to some root: a
/// workspace-relative source path, a root-relative output path, or the
/// exec path an action sees. The empty path denotes the root itself.
///
/// ```
/// use blaze_core::exec_path::ExecPath;
/// assert!(ExecPath::new("foo/bar.o").is_ok());
/// assert!(ExecPath::new("/abs").is_err());
/// assert!(ExecPath::new("foo/../bar").is_err());
/// assert!(ExecPath::new("foo//bar").is_err());
/// ```
#[repr(transparent)]
#[derive(Display, Debug, RefCast, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExecPath(str);

impl ExecPath {
    pub fn new<S: ?Sized + AsRef<str>>(s: &S) -> anyhow::Result<&Self> {
        verify(s.as_ref())?;
        Ok(Self::unchecked_new(s))
    }

    pub fn unchecked_new<S: ?Sized + AsRef<str>>(s: &S) -> &Self {
        ExecPath::ref_cast(s.as_ref())
    }

    pub fn empty() -> &'static Self {
        ExecPath::unchecked_new("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenates two paths. Either side may be empty.
    pub fn join(&self, other: &ExecPath) -> ExecPathBuf {
        if self.is_empty() {
            other.to_buf()
        } else if other.is_empty() {
            self.to_buf()
        } else {
            ExecPathBuf(format!("{}/{}", &self.0, &other.0))
        }
    }

    pub fn to_buf(&self) -> ExecPathBuf {
        ExecPathBuf(self.0.to_owned())
    }

    /// The final segment, if the path is not empty.
    pub fn file_name(&self) -> Option<&str> {
        self.0.rsplit('/').next().filter(|s| !s.is_empty())
    }
}

impl AsRef<Path> for ExecPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl AsRef<str> for ExecPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToOwned for ExecPath {
    type Owned = ExecPathBuf;

    fn to_owned(&self) -> ExecPathBuf {
        self.to_buf()
    }
}

/// The owned variant of [`ExecPath`].
#[derive(Display, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExecPathBuf(String);

impl ExecPathBuf {
    pub fn new(s: impl Into<String>) -> anyhow::Result<Self> {
        let s = s.into();
        verify(&s)?;
        Ok(Self(s))
    }

    pub fn unchecked_new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_exec_path(&self) -> &ExecPath {
        ExecPath::unchecked_new(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ExecPathBuf {
    type Target = ExecPath;

    fn deref(&self) -> &ExecPath {
        self.as_exec_path()
    }
}

impl Borrow<ExecPath> for ExecPathBuf {
    fn borrow(&self) -> &ExecPath {
        self.as_exec_path()
    }
}

impl AsRef<ExecPath> for ExecPathBuf {
    fn as_ref(&self) -> &ExecPath {
        self.as_exec_path()
    }
}

impl AsRef<Path> for ExecPathBuf {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl From<&ExecPath> for ExecPathBuf {
    fn from(p: &ExecPath) -> Self {
        p.to_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification() {
        assert!(ExecPath::new("").is_ok());
        assert!(ExecPath::new("foo").is_ok());
        assert!(ExecPath::new("foo/bar/baz.o").is_ok());
        assert!(ExecPath::new(".hidden/ok").is_ok());
        assert!(ExecPath::new("/foo").is_err());
        assert!(ExecPath::new("foo/./bar").is_err());
        assert!(ExecPath::new("..").is_err());
        assert!(ExecPath::new("foo//bar").is_err());
        assert!(ExecPath::new("foo\\bar").is_err());
        assert!(ExecPath::new("foo/").is_err());
    }

    #[test]
    fn test_join() {
        let base = ExecPath::new("blaze-out/bin").unwrap();
        let rel = ExecPath::new("x/foo.o").unwrap();
        assert_eq!("blaze-out/bin/x/foo.o", base.join(rel).as_str());
        assert_eq!("x/foo.o", ExecPath::empty().join(rel).as_str());
        assert_eq!("blaze-out/bin", base.join(ExecPath::empty()).as_str());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(Some("foo.o"), ExecPath::new("x/foo.o").unwrap().file_name());
        assert_eq!(Some("x"), ExecPath::new("x").unwrap().file_name());
        assert_eq!(None, ExecPath::empty().file_name());
    }

    #[test]
    fn test_borrow_equivalence() {
        let buf = ExecPathBuf::new("a/b").unwrap();
        let path: &ExecPath = buf.borrow();
        assert_eq!(path, buf.as_exec_path());
        assert_eq!("a/b", format!("{}", buf));
    }
}
