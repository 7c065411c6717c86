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

/// A build configuration, identified here by its output-directory mnemonic
/// (e.g. `k8-fastbuild`). Analysis treats configurations as opaque identity:
/// two configured targets with the same label but different configurations
/// are distinct owners.
#[derive(Clone, Dupe, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Configuration(Arc<str>);

impl Configuration {
    pub fn new(mnemonic: &str) -> Self {
        Self(Arc::from(mnemonic))
    }

    /// Constructs a configuration for tests.
    pub fn testing_new() -> Self {
        Self::new("k8-fastbuild")
    }

    pub fn mnemonic(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        assert_eq!(Configuration::new("k8-opt"), Configuration::new("k8-opt"));
        assert_ne!(Configuration::new("k8-opt"), Configuration::testing_new());
        assert_eq!("k8-opt", Configuration::new("k8-opt").mnemonic());
    }
}
