/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use derive_more::Display;

use crate::label::Label;

/// The narrow view of a target that analysis diagnostics need: its label and
/// its kind string (e.g. `sh_binary rule`).
#[derive(Clone, Debug, Display, PartialEq, Eq)]
#[display(fmt = "{} {}", kind, label)]
pub struct Target {
    label: Label,
    kind: String,
}

impl Target {
    pub fn new(label: Label, kind: impl Into<String>) -> Self {
        Self {
            label,
            kind: kind.into(),
        }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn target_kind(&self) -> &str {
        &self.kind
    }
}
