/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::sync::Arc;

use derive_more::Display;
use gazebo::prelude::*;
use thiserror::Error;

use crate::configuration::Configuration;
use crate::exec_path::ExecPath;
use crate::exec_path::ExecPathBuf;

#[derive(Error, Debug)]
enum LabelError {
    #[error("labels must start with `//`: `{0}`")]
    MissingSlashes(String),
    #[error("label has an empty target name: `{0}`")]
    EmptyName(String),
    #[error("label has more than one `:`: `{0}`")]
    ExtraColon(String),
    #[error("invalid package path in label `{label}`: {reason}")]
    InvalidPackage { label: String, reason: String },
}

/// An absolute target label, `//package/path:name`.
///
/// `//package/path` is shorthand for `//package/path:path`.
#[derive(Clone, Dupe, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display(fmt = "{}", _0)]
pub struct Label(Arc<LabelData>);

#[derive(Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display(fmt = "//{}:{}", package, name)]
struct LabelData {
    package: ExecPathBuf,
    name: String,
}

impl Label {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let rest = s
            .strip_prefix("//")
            .ok_or_else(|| LabelError::MissingSlashes(s.to_owned()))?;
        let (package, name) = match rest.split_once(':') {
            Some((package, name)) => {
                if name.is_empty() {
                    return Err(LabelError::EmptyName(s.to_owned()).into());
                }
                if name.contains(':') {
                    return Err(LabelError::ExtraColon(s.to_owned()).into());
                }
                (package, name.to_owned())
            }
            None => {
                let name = rest.rsplit('/').next().unwrap_or(rest);
                if name.is_empty() {
                    return Err(LabelError::EmptyName(s.to_owned()).into());
                }
                (rest, name.to_owned())
            }
        };
        let package = ExecPathBuf::new(package).map_err(|e| LabelError::InvalidPackage {
            label: s.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self(Arc::new(LabelData { package, name })))
    }

    pub fn package(&self) -> &ExecPath {
        &self.0.package
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }
}

/// A `(target, configuration)` pair: the unit of analysis, and the owner
/// identity stamped onto every artifact an analysis environment hands out.
#[derive(Clone, Dupe, Debug, Display, PartialEq, Eq, Hash)]
#[display(fmt = "{} ({})", label, configuration)]
pub struct ConfiguredTargetLabel {
    label: Label,
    configuration: Configuration,
}

impl ConfiguredTargetLabel {
    pub fn new(label: Label, configuration: Configuration) -> Self {
        Self {
            label,
            configuration,
        }
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }
}
