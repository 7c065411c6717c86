/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::sync::Arc;

use derive_more::Display;
use gazebo::prelude::*;

use crate::exec_path::ExecPath;
use crate::exec_path::ExecPathBuf;

/// A root under which artifacts live, identified by the exec-path prefix it
/// contributes. The source root has an empty prefix; derived roots carry a
/// prefix such as `blaze-out/k8-fastbuild/bin`.
#[derive(Clone, Dupe, Debug, Display, PartialEq, Eq, Hash)]
#[display(fmt = "{}", "_0")]
pub struct ArtifactRoot(Arc<ExecPathBuf>);

impl ArtifactRoot {
    /// The workspace source root.
    pub fn source() -> Self {
        Self(Arc::new(ExecPathBuf::unchecked_new("")))
    }

    /// An output root under the given exec-path prefix.
    pub fn derived(exec_prefix: ExecPathBuf) -> Self {
        Self(Arc::new(exec_prefix))
    }

    pub fn exec_prefix(&self) -> &ExecPath {
        &self.0
    }

    /// The exec path of a file at `root_relative` under this root.
    pub fn exec_path(&self, root_relative: &ExecPath) -> ExecPathBuf {
        self.0.join(root_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_path() {
        let bin = ArtifactRoot::derived(ExecPathBuf::new("blaze-out/k8-fastbuild/bin").unwrap());
        let rel = ExecPath::new("x/foo.o").unwrap();
        assert_eq!("blaze-out/k8-fastbuild/bin/x/foo.o", bin.exec_path(rel).as_str());
        assert_eq!("x/foo.o", ArtifactRoot::source().exec_path(rel).as_str());
    }

    #[test]
    fn test_identity() {
        let a = ArtifactRoot::derived(ExecPathBuf::new("blaze-out/bin").unwrap());
        let b = ArtifactRoot::derived(ExecPathBuf::new("blaze-out/bin").unwrap());
        assert_eq!(a, b);
        assert_ne!(a, ArtifactRoot::source());
    }
}
