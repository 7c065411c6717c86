/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! An 'Action' is a declared build step with a set of output 'Artifact's.
//!
//! Analysis only ever observes actions; executing them is a different phase
//! entirely. The action graph guarantees that output sets of distinct actions
//! are disjoint; nothing in this module relies on more than that.

pub mod middleman;

use std::fmt::Debug;

use indexmap::IndexSet;

use crate::artifact::Artifact;

/// A registered, immutable build step as the analysis environment sees it.
pub trait Action: Debug + Send + Sync + 'static {
    /// The outputs this action produces, in declaration order.
    fn outputs(&self) -> &IndexSet<Artifact>;

    /// A short verb for progress and diagnostics, e.g. `Middleman`.
    fn mnemonic(&self) -> &str;

    /// The concrete action type. Diagnostics only.
    fn type_name(&self) -> &'static str;
}
