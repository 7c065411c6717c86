/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The per-target analysis environment and its collaborators.

pub mod build_info;
pub mod env;
pub mod skyframe;

use blaze_core::exec_path::ExecPath;

/// Narrow contract onto the package loader. Analysis itself only threads this
/// through to rule implementations.
pub trait PackageManager: Send + Sync {
    /// Whether `package` names a package known to the loading phase.
    fn package_exists(&self, package: &ExecPath) -> bool;
}
