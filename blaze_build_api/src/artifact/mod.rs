/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! An 'Artifact' is the canonical identity of a file known to the build,
//! either a file in the source tree or a file some action will produce.
//!
//! The existence of an artifact says nothing about the file existing on
//! disk. Artifacts are interned by the [`ArtifactFactory`]; analysis code
//! never constructs them directly, so two requests for the same
//! `(path, root, owner)` yield the same handle.

use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

use blaze_core::exec_path::ExecPath;
use blaze_core::exec_path::ExecPathBuf;
use blaze_core::label::ConfiguredTargetLabel;
use blaze_core::root::ArtifactRoot;
use derive_more::Display;
use gazebo::prelude::*;

mod factory;
pub use factory::ArtifactFactory;

/// The owner of an artifact: the configured target that declared it, or
/// nothing for source files and embedded tools.
#[derive(Clone, Dupe, Debug, Display, PartialEq, Eq, Hash)]
pub enum ArtifactOwner {
    #[display(fmt = "{}", _0)]
    Target(ConfiguredTargetLabel),
    #[display(fmt = "<unowned>")]
    Unowned,
}

/// The flavor of an artifact. Deliberately not part of its identity: the
/// factory canonicalizes on `(path, root, owner)` alone.
#[derive(Copy, Clone, Dupe, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A file in the source tree (or the embedded tool bundle). Exempt from
    /// the generating-action check.
    Source,
    /// Produced by an action registered during analysis.
    Derived,
    /// The expansion point of a fileset traversal.
    Fileset,
    /// Metadata handling is forced at execution time; provenance is managed
    /// by the consumer rather than by the analysis environment.
    SpecialMetadata {
        force_constant_metadata: bool,
        force_digest_metadata: bool,
    },
}

/// A file known to the build. Cheap to clone; equality and hashing are
/// structural over `(root-relative path, root, owner)`.
#[derive(Clone, Dupe, Debug, Display)]
#[display(fmt = "{}", "self.exec_path()")]
pub struct Artifact(Arc<ArtifactData>);

#[derive(Debug)]
struct ArtifactData {
    root_relative_path: ExecPathBuf,
    root: ArtifactRoot,
    owner: ArtifactOwner,
    kind: ArtifactKind,
}

impl Artifact {
    fn new(
        root_relative_path: ExecPathBuf,
        root: ArtifactRoot,
        owner: ArtifactOwner,
        kind: ArtifactKind,
    ) -> Self {
        Self(Arc::new(ArtifactData {
            root_relative_path,
            root,
            owner,
            kind,
        }))
    }

    pub fn root_relative_path(&self) -> &ExecPath {
        &self.0.root_relative_path
    }

    pub fn root(&self) -> &ArtifactRoot {
        &self.0.root
    }

    pub fn owner(&self) -> &ArtifactOwner {
        &self.0.owner
    }

    pub fn kind(&self) -> ArtifactKind {
        self.0.kind
    }

    pub fn is_source(&self) -> bool {
        matches!(self.0.kind, ArtifactKind::Source)
    }

    /// The path of this artifact as actions see it: the root's exec prefix
    /// joined with the root-relative path.
    pub fn exec_path(&self) -> ExecPathBuf {
        self.0.root.exec_path(&self.0.root_relative_path)
    }

    fn identity(&self) -> (&ExecPath, &ArtifactRoot, &ArtifactOwner) {
        (&self.0.root_relative_path, &self.0.root, &self.0.owner)
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Artifact {}

impl Hash for Artifact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use blaze_core::configuration::Configuration;
    use blaze_core::label::Label;

    use super::*;

    fn owner(label: &str) -> ArtifactOwner {
        ArtifactOwner::Target(ConfiguredTargetLabel::new(
            Label::parse(label).unwrap(),
            Configuration::testing_new(),
        ))
    }

    fn bin_root() -> ArtifactRoot {
        ArtifactRoot::derived(ExecPathBuf::new("blaze-out/k8-fastbuild/bin").unwrap())
    }

    #[test]
    fn test_identity_ignores_kind() {
        let path = ExecPathBuf::new("x/foo.o").unwrap();
        let a = Artifact::new(path.clone(), bin_root(), owner("//x:y"), ArtifactKind::Derived);
        let b = Artifact::new(path, bin_root(), owner("//x:y"), ArtifactKind::Fileset);
        assert_eq!(a, b);
    }

    #[test]
    fn test_identity_distinguishes_owner() {
        let path = ExecPathBuf::new("x/foo.o").unwrap();
        let a = Artifact::new(
            path.clone(),
            bin_root(),
            owner("//x:y"),
            ArtifactKind::Derived,
        );
        let b = Artifact::new(path, bin_root(), owner("//x:z"), ArtifactKind::Derived);
        assert_ne!(a, b);
    }

    #[test]
    fn test_exec_path_and_display() {
        let a = Artifact::new(
            ExecPathBuf::new("x/foo.o").unwrap(),
            bin_root(),
            owner("//x:y"),
            ArtifactKind::Derived,
        );
        assert_eq!("blaze-out/k8-fastbuild/bin/x/foo.o", a.exec_path().as_str());
        assert_eq!("blaze-out/k8-fastbuild/bin/x/foo.o", a.to_string());
    }
}
