/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The lazy dependency graph as one analysis sees it.
//!
//! A lookup either yields the computed value or reports that the value is not
//! ready yet. The latter is not a failure: the driver re-enqueues the target
//! and analysis runs again once the dependency is done. Operations that can
//! hit this return [`MissingDepError`], a dedicated type so callers cannot
//! mistake a restart for a fatal error.

use std::sync::Arc;

use blaze_core::configuration::Configuration;
use derive_more::Display;
use gazebo::prelude::*;
use thiserror::Error;

use crate::artifact::Artifact;

/// Identifies a language's build-info factory (e.g. `cpp`, `java`).
#[derive(Clone, Dupe, Debug, Display, PartialEq, Eq, Hash)]
pub struct BuildInfoKey(Arc<str>);

impl BuildInfoKey {
    pub fn new(key: &str) -> Self {
        Self(Arc::from(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The workspace-status node value: the two status artifacts every build
/// writes. The stable file changes only when its contents change; the
/// volatile one changes on every build.
#[derive(Clone, Debug)]
pub struct WorkspaceStatusValue {
    stable_artifact: Artifact,
    volatile_artifact: Artifact,
}

impl WorkspaceStatusValue {
    pub fn new(stable_artifact: Artifact, volatile_artifact: Artifact) -> Self {
        Self {
            stable_artifact,
            volatile_artifact,
        }
    }

    pub fn stable_artifact(&self) -> Artifact {
        self.stable_artifact.dupe()
    }

    pub fn volatile_artifact(&self) -> Artifact {
        self.volatile_artifact.dupe()
    }
}

/// The build-info artifacts derived from the workspace status for one
/// `(key, configuration)`. The stamped list embeds volatile data (user, date,
/// changelist); the redacted list omits it so outputs stay reproducible.
#[derive(Clone, Debug)]
pub struct BuildInfoCollection {
    stamped: Vec<Artifact>,
    redacted: Vec<Artifact>,
}

impl BuildInfoCollection {
    pub fn new(stamped: Vec<Artifact>, redacted: Vec<Artifact>) -> Self {
        Self { stamped, redacted }
    }

    pub fn stamped_build_info(&self) -> &[Artifact] {
        &self.stamped
    }

    pub fn redacted_build_info(&self) -> &[Artifact] {
        &self.redacted
    }
}

/// A dependency was requested before the graph computed it. The driver must
/// re-enqueue the requesting target; no analysis state is lost by retrying.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("dependency `{0}` has not been computed yet")]
pub struct MissingDepError(String);

impl MissingDepError {
    pub fn new(dep: impl Into<String>) -> Self {
        Self(dep.into())
    }

    pub fn dep(&self) -> &str {
        &self.0
    }
}

/// Lazy lookups into the dependency graph. `None` means the value is not yet
/// computed and the caller must propagate a restart.
pub trait SkyframeEnv: Send + Sync {
    fn workspace_status(&self) -> Option<WorkspaceStatusValue>;

    fn build_info_collection(
        &self,
        key: &BuildInfoKey,
        configuration: &Configuration,
    ) -> Option<BuildInfoCollection>;
}
