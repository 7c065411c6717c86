/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Core identity vocabulary of blaze: paths, labels, configurations, roots.
//!
//! Everything in this crate is a cheap-to-copy handle with value semantics.
//! The analysis machinery compares and hashes these types constantly, so they
//! are all `Arc`-backed (or plain `str` newtypes) and implement [`Dupe`]
//! where cloning is free.
//!
//! [`Dupe`]: gazebo::dupe::Dupe

pub mod configuration;
pub mod exec_path;
pub mod label;
pub mod root;
pub mod target;
