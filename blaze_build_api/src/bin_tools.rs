/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use blaze_core::exec_path::ExecPath;
use blaze_core::exec_path::ExecPathBuf;
use blaze_core::root::ArtifactRoot;
use indexmap::IndexSet;
use thiserror::Error;

use crate::artifact::Artifact;
use crate::artifact::ArtifactFactory;

#[derive(Error, Debug)]
enum BinToolsError {
    #[error("unknown embedded tool `{0}`")]
    UnknownTool(String),
}

/// The helper tools shipped inside the blaze install base (`build-runfiles`,
/// `process-wrapper`, ...). Rules reference them by their path within the
/// bundle; the returned artifacts are source artifacts under the embedded
/// root, so no generating action is expected for them.
#[derive(Debug)]
pub struct BinTools {
    root: ArtifactRoot,
    embedded: IndexSet<ExecPathBuf>,
}

impl BinTools {
    pub fn new(root: ArtifactRoot, embedded: impl IntoIterator<Item = ExecPathBuf>) -> Self {
        Self {
            root,
            embedded: embedded.into_iter().collect(),
        }
    }

    pub fn embedded_artifact(
        &self,
        embedded_path: &ExecPath,
        factory: &ArtifactFactory,
    ) -> anyhow::Result<Artifact> {
        if !self.embedded.contains(embedded_path) {
            return Err(BinToolsError::UnknownTool(embedded_path.as_str().to_owned()).into());
        }
        Ok(factory.source_artifact(embedded_path, &self.root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin_tools() -> BinTools {
        BinTools::new(
            ArtifactRoot::derived(ExecPathBuf::new("_bin").unwrap()),
            [ExecPathBuf::new("build-runfiles").unwrap()],
        )
    }

    #[test]
    fn test_known_tool() {
        let factory = ArtifactFactory::new();
        let tool = bin_tools()
            .embedded_artifact(ExecPath::new("build-runfiles").unwrap(), &factory)
            .unwrap();
        assert!(tool.is_source());
        assert_eq!("_bin/build-runfiles", tool.exec_path().as_str());
    }

    #[test]
    fn test_unknown_tool() {
        let factory = ArtifactFactory::new();
        assert!(bin_tools()
            .embedded_artifact(ExecPath::new("no-such-tool").unwrap(), &factory)
            .is_err());
    }
}
