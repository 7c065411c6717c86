/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Middlemen: pseudo-artifacts that stand in for a large set of inputs so
//! the action graph stays compact. A middleman is an ordinary derived
//! artifact produced by a [`MiddlemanAction`] whose inputs are the aggregated
//! set.

use std::sync::Arc;

use blaze_core::exec_path::ExecPathBuf;
use blaze_core::root::ArtifactRoot;
use gazebo::prelude::*;
use indexmap::IndexSet;

use crate::actions::Action;
use crate::analysis::env::CachingAnalysisEnvironment;
use crate::artifact::Artifact;

/// Creates middlemen on behalf of one analysis environment.
///
/// Holds the environment by mutable borrow for its whole lifetime, so it can
/// never outlive the environment nor race with it.
pub struct MiddlemanFactory<'a> {
    env: &'a mut CachingAnalysisEnvironment,
}

impl<'a> MiddlemanFactory<'a> {
    pub(crate) fn new(env: &'a mut CachingAnalysisEnvironment) -> Self {
        Self { env }
    }

    /// Declares the middleman artifact `_middlemen/<purpose>` under `root`,
    /// registers the aggregating action that produces it, and returns it.
    pub fn create_aggregating_middleman(
        &mut self,
        purpose: &str,
        inputs: Vec<Artifact>,
        root: &ArtifactRoot,
    ) -> anyhow::Result<Artifact> {
        let path = ExecPathBuf::new(format!("_middlemen/{}", purpose))?;
        let middleman = self.env.get_derived_artifact(&path, root);
        self.env
            .register_action(Arc::new(MiddlemanAction::new(inputs, middleman.dupe())));
        Ok(middleman)
    }
}

/// The action producing a middleman. Executing it is trivial; it exists so
/// the dependency edges of the aggregated inputs survive into the graph.
#[derive(Debug)]
pub struct MiddlemanAction {
    inputs: Vec<Artifact>,
    outputs: IndexSet<Artifact>,
}

impl MiddlemanAction {
    pub fn new(inputs: Vec<Artifact>, output: Artifact) -> Self {
        let mut outputs = IndexSet::new();
        outputs.insert(output);
        Self { inputs, outputs }
    }

    pub fn inputs(&self) -> &[Artifact] {
        &self.inputs
    }
}

impl Action for MiddlemanAction {
    fn outputs(&self) -> &IndexSet<Artifact> {
        &self.outputs
    }

    fn mnemonic(&self) -> &str {
        "Middleman"
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
