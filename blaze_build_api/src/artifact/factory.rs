/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::collections::HashMap;
use std::sync::Mutex;

use blaze_core::exec_path::ExecPath;
use blaze_core::exec_path::ExecPathBuf;
use blaze_core::root::ArtifactRoot;
use gazebo::prelude::*;

use crate::artifact::Artifact;
use crate::artifact::ArtifactKind;
use crate::artifact::ArtifactOwner;

#[derive(Debug, PartialEq, Eq, Hash)]
struct ArtifactId {
    path: ExecPathBuf,
    root: ArtifactRoot,
    owner: ArtifactOwner,
}

/// Canonicalizes `(root-relative path, root, owner)` to an [`Artifact`].
///
/// One factory is shared by every analysis environment of a build; all
/// operations are thread-safe. The first request for a given identity decides
/// the artifact's kind; later requests return the interned handle unchanged.
#[derive(Debug, Default)]
pub struct ArtifactFactory {
    interned: Mutex<HashMap<ArtifactId, Artifact>>,
}

impl ArtifactFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_artifact(&self, path: &ExecPath, root: &ArtifactRoot) -> Artifact {
        self.intern(path, root, &ArtifactOwner::Unowned, ArtifactKind::Source)
    }

    pub fn derived_artifact(
        &self,
        path: &ExecPath,
        root: &ArtifactRoot,
        owner: &ArtifactOwner,
    ) -> Artifact {
        self.intern(path, root, owner, ArtifactKind::Derived)
    }

    pub fn fileset_artifact(
        &self,
        path: &ExecPath,
        root: &ArtifactRoot,
        owner: &ArtifactOwner,
    ) -> Artifact {
        self.intern(path, root, owner, ArtifactKind::Fileset)
    }

    pub fn special_metadata_artifact(
        &self,
        path: &ExecPath,
        root: &ArtifactRoot,
        owner: &ArtifactOwner,
        force_constant_metadata: bool,
        force_digest_metadata: bool,
    ) -> Artifact {
        self.intern(
            path,
            root,
            owner,
            ArtifactKind::SpecialMetadata {
                force_constant_metadata,
                force_digest_metadata,
            },
        )
    }

    fn intern(
        &self,
        path: &ExecPath,
        root: &ArtifactRoot,
        owner: &ArtifactOwner,
        kind: ArtifactKind,
    ) -> Artifact {
        let id = ArtifactId {
            path: path.to_buf(),
            root: root.dupe(),
            owner: owner.dupe(),
        };
        self.interned
            .lock()
            .unwrap()
            .entry(id)
            .or_insert_with(|| Artifact::new(path.to_buf(), root.dupe(), owner.dupe(), kind))
            .dupe()
    }
}

#[cfg(test)]
mod tests {
    use blaze_core::configuration::Configuration;
    use blaze_core::label::ConfiguredTargetLabel;
    use blaze_core::label::Label;

    use super::*;

    fn owner() -> ArtifactOwner {
        ArtifactOwner::Target(ConfiguredTargetLabel::new(
            Label::parse("//x:y").unwrap(),
            Configuration::testing_new(),
        ))
    }

    #[test]
    fn test_interning_is_stable() {
        let factory = ArtifactFactory::new();
        let root = ArtifactRoot::derived(ExecPathBuf::new("blaze-out/bin").unwrap());
        let path = ExecPath::new("x/foo.o").unwrap();
        let a = factory.derived_artifact(path, &root, &owner());
        let b = factory.derived_artifact(path, &root, &owner());
        assert_eq!(a, b);
        assert_eq!(ArtifactKind::Derived, b.kind());
    }

    #[test]
    fn test_first_request_decides_kind() {
        let factory = ArtifactFactory::new();
        let root = ArtifactRoot::derived(ExecPathBuf::new("blaze-out/bin").unwrap());
        let path = ExecPath::new("x/files").unwrap();
        let a = factory.fileset_artifact(path, &root, &owner());
        let b = factory.derived_artifact(path, &root, &owner());
        assert_eq!(a, b);
        assert_eq!(ArtifactKind::Fileset, b.kind());
    }

    #[test]
    fn test_source_artifacts_are_unowned() {
        let factory = ArtifactFactory::new();
        let a = factory.source_artifact(ExecPath::new("x/main.sh").unwrap(), &ArtifactRoot::source());
        assert!(a.is_source());
        assert_eq!(&ArtifactOwner::Unowned, a.owner());
        assert_eq!("x/main.sh", a.exec_path().as_str());
    }
}
