/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The parsed startup options of the blaze client.
//!
//! These are the options consumed before a command is even known: where the
//! output and install bases live, how the server JVM is launched, and how the
//! client behaves as a process. They must be kept in sync with the server's
//! decorative copy, which only affects the help text.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::path::Path;

use thiserror::Error;

use crate::exit_code::ExitCode;

#[derive(Error, Debug)]
pub enum StartupOptionsError {
    #[error("Unknown startup option: '{0}'.\n  For more info, run 'blaze help startup_options'.")]
    UnknownOption(String),
    #[error("Invalid argument to {flag}: '{value}'")]
    InvalidArgument { flag: &'static str, value: String },
}

impl StartupOptionsError {
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::BadArgv
    }
}

/// Site-specific startup options layered on top of the standard set.
pub trait StartupOptionsExtension: Debug + Send {
    /// Offered every flag the standard set does not recognize, before the
    /// flag is rejected as unknown. Returns `Some(consumed_next)` when
    /// handled.
    fn process_arg_extra(&mut self, arg: &str, next_arg: &str, rcfile: &str) -> Option<bool>;

    /// Extra arguments for the server command line.
    fn add_extra_options(&self, result: &mut Vec<String>);
}

/// Matches `--key=value` (value inline, nothing consumed) or `--key value`
/// (value taken from `next_arg`, which is consumed). Returns the value and
/// whether `next_arg` was consumed.
pub(crate) fn unary_option<'a>(
    arg: &'a str,
    next_arg: &'a str,
    key: &str,
) -> Option<(&'a str, bool)> {
    let rest = arg.strip_prefix(key)?;
    if rest.is_empty() {
        Some((next_arg, true))
    } else {
        rest.strip_prefix('=').map(|value| (value, false))
    }
}

pub(crate) fn nullary_option(arg: &str, key: &str) -> bool {
    arg == key
}

/// The typed startup settings, plus per-option source attribution.
#[derive(Debug)]
pub struct StartupOptions {
    /// Everything the server writes lives under here.
    pub output_base: String,
    /// Installation base of this release.
    pub install_base: String,
    /// Top-level directory containing blaze's output. Running under a test
    /// uses `TEST_TMPDIR` so invocations stay hermetic.
    pub output_root: String,
    /// Only used for computing `install_base` and `output_base`.
    pub output_user_root: String,
    /// Block for the server lock instead of quitting when it is taken.
    pub block_for_lock: bool,
    pub host_jvm_debug: bool,
    pub host_jvm_profile: String,
    pub host_javabase: String,
    pub host_jvm_args: String,
    pub use_blaze64: bool,
    pub batch: bool,
    pub batch_cpu_scheduling: bool,
    /// -1 leaves io priority alone; 0-7 sets a best-effort level.
    pub io_nice_level: i32,
    pub max_idle_secs: i32,
    pub skyframe: String,
    pub allow_configurable_attributes: bool,
    pub fatal_event_bus_exceptions: bool,
    /// Where each option came from: the rc-file path, or empty for the
    /// command line. A key that is absent means the default is in effect.
    pub option_sources: HashMap<String, String>,
    extension: Option<Box<dyn StartupOptionsExtension>>,
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl StartupOptions {
    pub fn new() -> Self {
        Self {
            output_base: String::new(),
            install_base: String::new(),
            output_root: String::new(),
            output_user_root: String::new(),
            block_for_lock: true,
            host_jvm_debug: false,
            host_jvm_profile: String::new(),
            host_javabase: String::new(),
            host_jvm_args: String::new(),
            use_blaze64: false,
            batch: false,
            batch_cpu_scheduling: false,
            io_nice_level: -1,
            max_idle_secs: 3 * 3600,
            skyframe: String::new(),
            allow_configurable_attributes: false,
            fatal_event_bus_exceptions: false,
            option_sources: HashMap::new(),
            extension: None,
        }
    }

    pub fn with_extension(mut self, extension: Box<dyn StartupOptionsExtension>) -> Self {
        self.extension = Some(extension);
        self
    }

    /// Seeds the defaults derived from the binary path and the environment:
    /// the output root (honoring `TEST_TMPDIR`), the per-user output root,
    /// and the install base keyed by the binary name.
    pub fn init_defaults(&mut self, argv0: &str) {
        self.output_root = env::var("TEST_TMPDIR").unwrap_or_else(|_| "/var/tmp".to_owned());
        let user = env::var("USER")
            .or_else(|_| env::var("LOGNAME"))
            .unwrap_or_else(|_| "unknown".to_owned());
        self.output_user_root = format!("{}/_blaze_{}", self.output_root, user);
        let binary_name = Path::new(argv0)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "blaze".to_owned());
        self.install_base = format!("{}/install/{}", self.output_user_root, binary_name);
    }

    fn record_source(&mut self, option: &str, rcfile: &str) {
        self.option_sources
            .insert(option.to_owned(), rcfile.to_owned());
    }

    /// Parses a single startup option, from the command line or from a
    /// blazerc `startup` line. `rcfile` is empty when the option does not
    /// come from a blazerc.
    ///
    /// Returns true if `arg` is unary and used the `--foo bar` style, i.e.
    /// its value was taken from `next_arg`. Nullary options and the
    /// `--foo=bar` style return false.
    pub fn process_arg(
        &mut self,
        arg: &str,
        next_arg: &str,
        rcfile: &str,
    ) -> Result<bool, StartupOptionsError> {
        macro_rules! string_option {
            ($key:literal, $field:ident) => {
                if let Some((value, consumed)) = unary_option(arg, next_arg, $key) {
                    self.$field = value.to_owned();
                    self.record_source(stringify!($field), rcfile);
                    return Ok(consumed);
                }
            };
        }
        macro_rules! bool_option {
            ($key:literal, $no_key:literal, $field:ident) => {
                if nullary_option(arg, $key) {
                    self.$field = true;
                    self.record_source(stringify!($field), rcfile);
                    return Ok(false);
                }
                if nullary_option(arg, $no_key) {
                    self.$field = false;
                    self.record_source(stringify!($field), rcfile);
                    return Ok(false);
                }
            };
        }

        // Handled by the rc-file discovery scan before parsing begins;
        // consumed again here so the pairwise walk stays aligned.
        if let Some((_, consumed)) = unary_option(arg, next_arg, "--blazerc") {
            return Ok(consumed);
        }
        if nullary_option(arg, "--nomaster_blazerc") {
            return Ok(false);
        }

        string_option!("--output_base", output_base);
        string_option!("--install_base", install_base);
        string_option!("--output_root", output_root);
        string_option!("--output_user_root", output_user_root);
        string_option!("--host_jvm_profile", host_jvm_profile);
        string_option!("--host_javabase", host_javabase);
        string_option!("--host_jvm_args", host_jvm_args);
        string_option!("--skyframe", skyframe);

        if let Some((value, consumed)) = unary_option(arg, next_arg, "--io_nice_level") {
            self.io_nice_level = parse_int("--io_nice_level", value)?;
            if self.io_nice_level > 7 {
                return Err(StartupOptionsError::InvalidArgument {
                    flag: "--io_nice_level",
                    value: value.to_owned(),
                });
            }
            self.record_source("io_nice_level", rcfile);
            return Ok(consumed);
        }
        if let Some((value, consumed)) = unary_option(arg, next_arg, "--max_idle_secs") {
            self.max_idle_secs = parse_int("--max_idle_secs", value)?;
            self.record_source("max_idle_secs", rcfile);
            return Ok(consumed);
        }

        bool_option!("--batch", "--nobatch", batch);
        bool_option!(
            "--batch_cpu_scheduling",
            "--nobatch_cpu_scheduling",
            batch_cpu_scheduling
        );
        bool_option!("--block_for_lock", "--noblock_for_lock", block_for_lock);
        bool_option!("--host_jvm_debug", "--nohost_jvm_debug", host_jvm_debug);
        bool_option!("--blaze64", "--blaze32", use_blaze64);
        bool_option!(
            "--allow_configurable_attributes",
            "--noallow_configurable_attributes",
            allow_configurable_attributes
        );
        bool_option!(
            "--fatal_event_bus_exceptions",
            "--nofatal_event_bus_exceptions",
            fatal_event_bus_exceptions
        );

        if let Some(extension) = &mut self.extension {
            if let Some(consumed) = extension.process_arg_extra(arg, next_arg, rcfile) {
                return Ok(consumed);
            }
        }

        Err(StartupOptionsError::UnknownOption(arg.to_owned()))
    }

    /// Appends any extension-supplied arguments for the server command line.
    pub fn add_extra_options(&self, result: &mut Vec<String>) {
        if let Some(extension) = &self.extension {
            extension.add_extra_options(result);
        }
    }
}

fn parse_int(flag: &'static str, value: &str) -> Result<i32, StartupOptionsError> {
    value
        .parse()
        .map_err(|_| StartupOptionsError::InvalidArgument {
            flag,
            value: value.to_owned(),
        })
}
