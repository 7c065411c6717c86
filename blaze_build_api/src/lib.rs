/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The build API of blaze's analysis phase.
//!
//! During analysis each configured target gets a fresh
//! [`CachingAnalysisEnvironment`](analysis::env::CachingAnalysisEnvironment)
//! through which its rule implementation declares artifacts and registers the
//! actions producing them. When the target is done the environment is sealed:
//! it verifies that every derived artifact it handed out is the output of
//! some registered action, then exposes the action list for harvesting into
//! the action graph.

pub mod actions;
pub mod analysis;
pub mod artifact;
pub mod bin_tools;
