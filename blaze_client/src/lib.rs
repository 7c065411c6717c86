/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The boot-time half of blaze: rc-file discovery and parsing, startup
//! option layering, and assembly of the argument vector handed to the
//! long-lived server.
//!
//! Everything here runs once, on the process-boot thread, before any
//! concurrency exists. The outcome is frozen after
//! [`OptionProcessor::parse_options`](option_processor::OptionProcessor::parse_options)
//! returns.

pub mod exit_code;
pub mod option_processor;
pub mod rc_file;
pub mod startup_options;
pub mod terminal;
