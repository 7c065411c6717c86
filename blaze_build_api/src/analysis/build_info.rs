/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::collections::HashMap;

use blaze_core::configuration::Configuration;
use gazebo::prelude::*;

use crate::analysis::skyframe::BuildInfoCollection;
use crate::analysis::skyframe::BuildInfoKey;
use crate::artifact::Artifact;

/// Eagerly computed workspace-status artifacts, used when analysis runs
/// without the lazy graph (legacy execution and tests). The graph-backed
/// variant of the same data lives behind
/// [`SkyframeEnv`](crate::analysis::skyframe::SkyframeEnv).
#[derive(Debug)]
pub struct WorkspaceStatusArtifacts {
    stable: Artifact,
    volatile: Artifact,
    collections: HashMap<(BuildInfoKey, Configuration), BuildInfoCollection>,
}

impl WorkspaceStatusArtifacts {
    pub fn new(stable: Artifact, volatile: Artifact) -> Self {
        Self {
            stable,
            volatile,
            collections: HashMap::new(),
        }
    }

    pub fn add_collection(
        &mut self,
        key: BuildInfoKey,
        configuration: Configuration,
        collection: BuildInfoCollection,
    ) {
        self.collections.insert((key, configuration), collection);
    }

    pub fn stable_status(&self) -> Artifact {
        self.stable.dupe()
    }

    pub fn volatile_status(&self) -> Artifact {
        self.volatile.dupe()
    }

    /// The pre-computed build-info set for `(key, configuration)`, stamped or
    /// redacted. Nothing registered for the pair means an empty set.
    pub fn build_info(
        &self,
        key: &BuildInfoKey,
        configuration: &Configuration,
        stamp: bool,
    ) -> Vec<Artifact> {
        match self.collections.get(&(key.dupe(), configuration.dupe())) {
            Some(collection) => {
                let artifacts = if stamp {
                    collection.stamped_build_info()
                } else {
                    collection.redacted_build_info()
                };
                artifacts.map(Dupe::dupe)
            }
            None => Vec::new(),
        }
    }
}

/// What the environment needs to know about the rule it is analyzing when
/// resolving build info: which configuration it is in, and whether stamping
/// is enabled for it.
#[derive(Clone, Debug)]
pub struct RuleContext {
    configuration: Configuration,
    stamping_enabled: bool,
}

impl RuleContext {
    pub fn new(configuration: Configuration, stamping_enabled: bool) -> Self {
        Self {
            configuration,
            stamping_enabled,
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn stamping_enabled(&self) -> bool {
        self.stamping_enabled
    }
}
