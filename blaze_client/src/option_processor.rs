/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Boot-time option processing.
//!
//! The processor discovers the depot and user rc-files, parses them (with
//! imports inlined), folds their `startup` options together with the leading
//! command-line flags into [`StartupOptions`], and splices the remaining rc
//! options, terminal info, client environment, and working directory into
//! the argument vector forwarded to the server.

use std::env;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::exit_code::ExitCode;
use crate::rc_file::RcFile;
use crate::rc_file::RcFileError;
use crate::rc_file::RcOptionMap;
use crate::startup_options::nullary_option;
use crate::startup_options::unary_option;
use crate::startup_options::StartupOptions;
use crate::startup_options::StartupOptionsError;
use crate::terminal::TerminalInfo;

#[derive(Error, Debug)]
pub enum OptionProcessorError {
    #[error(transparent)]
    RcFile(#[from] RcFileError),
    #[error(transparent)]
    StartupOptions(#[from] StartupOptionsError),
    #[error("Unable to read .blazerc file '{}'.", .path.display())]
    UnreadableBlazerc { path: PathBuf },
}

impl OptionProcessorError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::RcFile(err) => err.exit_code(),
            Self::StartupOptions(err) => err.exit_code(),
            Self::UnreadableBlazerc { .. } => ExitCode::BadArgv,
        }
    }
}

/// Everything the option processor reads from the process environment,
/// injectable so tests stay hermetic.
#[derive(Clone, Debug)]
pub struct ClientEnvironment {
    /// `$HOME`, for the user rc-file fallback.
    pub home: Option<PathBuf>,
    /// Forwarded to the server as `--client_env` entries (and consulted for
    /// `$EMACS`).
    pub env_vars: Vec<(String, String)>,
    pub terminal: TerminalInfo,
}

impl ClientEnvironment {
    pub fn from_process() -> Self {
        Self {
            home: env::var_os("HOME").map(PathBuf::from),
            env_vars: env::vars().collect(),
            terminal: TerminalInfo::detect(),
        }
    }
}

fn is_readable(path: &Path) -> bool {
    File::open(path).is_ok()
}

/// A startup flag is anything starting with `-`, except the help aliases,
/// which terminate the startup-flag walk and become the command.
fn is_arg(arg: &str) -> bool {
    arg.starts_with('-') && arg != "--help" && arg != "-help" && arg != "-h"
}

/// The boot-time option pipeline. Created once per process; frozen after
/// [`parse_options`](Self::parse_options) returns.
#[derive(Debug)]
pub struct OptionProcessor {
    client_env: ClientEnvironment,
    initialized: bool,
    args: Vec<String>,
    command: String,
    command_arguments: Vec<String>,
    /// Index into `args` of the last startup flag consumed; the command sits
    /// right after it.
    startup_args: usize,
    rcfiles: Vec<RcFile>,
    rcoptions: RcOptionMap,
    parsed_startup_options: StartupOptions,
}

impl OptionProcessor {
    pub fn new(client_env: ClientEnvironment) -> Self {
        Self::with_startup_options(client_env, StartupOptions::new())
    }

    /// Lets the caller pre-install a [`StartupOptions`] carrying a
    /// site-specific extension.
    pub fn with_startup_options(
        client_env: ClientEnvironment,
        startup_options: StartupOptions,
    ) -> Self {
        Self {
            client_env,
            initialized: false,
            args: Vec::new(),
            command: String::new(),
            command_arguments: Vec::new(),
            startup_args: 0,
            rcfiles: Vec::new(),
            rcoptions: RcOptionMap::new(),
            parsed_startup_options: startup_options,
        }
    }

    /// Runs the whole pipeline over `args` (including argv0). Must be called
    /// exactly once.
    pub fn parse_options(
        &mut self,
        args: &[String],
        workspace: &Path,
        cwd: &Path,
    ) -> Result<(), OptionProcessorError> {
        assert!(!self.initialized, "ParseOptions must only be called once");
        self.initialized = true;
        self.args = args.to_vec();

        // Scan for the rc-related options before anything is parsed.
        let mut blazerc_override: Option<String> = None;
        let mut use_master_blazerc = true;
        for i in 1..args.len() {
            let next = args.get(i + 1).map(String::as_str).unwrap_or("");
            if blazerc_override.is_none() {
                if let Some((value, _)) = unary_option(&args[i], next, "--blazerc") {
                    if !value.is_empty() {
                        blazerc_override = Some(value.to_owned());
                    }
                }
            }
            if use_master_blazerc && nullary_option(&args[i], "--nomaster_blazerc") {
                use_master_blazerc = false;
            }
        }

        if use_master_blazerc {
            if let Some(depot_rc) = Self::find_depot_blazerc(workspace) {
                debug!(path = %depot_rc.display(), "found depot blazerc");
                self.parse_rc_file(depot_rc)?;
            }
        }
        if let Some(user_rc) = self.find_user_blazerc(blazerc_override.as_deref(), workspace)? {
            debug!(path = %user_rc.display(), "found user blazerc");
            self.parse_rc_file(user_rc)?;
        }

        let binary = args.first().map(String::as_str).unwrap_or("");
        self.parsed_startup_options.init_defaults(binary);
        self.parse_startup_options()?;

        if self.startup_args + 1 >= args.len() {
            // Only startup options were given; there is no command.
            self.command = String::new();
            return Ok(());
        }
        self.command = args[self.startup_args + 1].clone();
        let batch = self.parsed_startup_options.batch;
        self.add_rcfile_args_and_options(batch, cwd);
        for arg in &args[self.startup_args + 2..] {
            self.command_arguments.push(arg.clone());
        }
        Ok(())
    }

    fn parse_rc_file(&mut self, path: PathBuf) -> Result<(), RcFileError> {
        let rc = RcFile::new(path, self.rcfiles.len());
        self.rcfiles.push(rc.clone());
        rc.parse(&mut self.rcfiles, &mut self.rcoptions)
    }

    /// The path of the depot blazerc, if one is readable. Package semantics
    /// are ignored here; blaze.blazerc is a configuration file.
    fn find_depot_blazerc(workspace: &Path) -> Option<PathBuf> {
        let blazerc = workspace.join("tools/blaze.blazerc");
        if is_readable(&blazerc) {
            return Some(blazerc);
        }
        // tools/ is probably not mapped in the client, so peek into the
        // READONLY tree.
        let blazerc = workspace.join("../READONLY/google3/tools/blaze.blazerc");
        if is_readable(&blazerc) {
            return Some(blazerc);
        }
        None
    }

    /// The path of the user blazerc. A `--blazerc` override must be
    /// readable; otherwise the first readable of `<workspace>/.blazerc` and
    /// `$HOME/.blazerc` wins, if any.
    fn find_user_blazerc(
        &self,
        override_path: Option<&str>,
        workspace: &Path,
    ) -> Result<Option<PathBuf>, OptionProcessorError> {
        if let Some(path) = override_path {
            let path = if Path::new(path).is_absolute() {
                PathBuf::from(path)
            } else {
                env::current_dir().unwrap_or_default().join(path)
            };
            if !is_readable(&path) {
                return Err(OptionProcessorError::UnreadableBlazerc { path });
            }
            return Ok(Some(path));
        }

        let workspace_rc = workspace.join(".blazerc");
        if is_readable(&workspace_rc) {
            return Ok(Some(workspace_rc));
        }
        if let Some(home) = &self.client_env.home {
            let home_rc = home.join(".blazerc");
            if is_readable(&home_rc) {
                return Ok(Some(home_rc));
            }
        }
        Ok(None)
    }

    /// Folds the rc `startup` options and then the leading command-line
    /// flags into the startup options, pairwise so unary `--foo bar` options
    /// can consume their value. Command-line options come second so they
    /// override the rc files.
    fn parse_startup_options(&mut self) -> Result<(), StartupOptionsError> {
        if let Some(startup_options) = self.rcoptions.get("startup") {
            let mut i = 0;
            while i + 1 < startup_options.len() {
                let option = &startup_options[i];
                let next = &startup_options[i + 1];
                let rcfile = self.rcfiles[option.rcfile_index()]
                    .filename()
                    .display()
                    .to_string();
                if self
                    .parsed_startup_options
                    .process_arg(option.option(), next.option(), &rcfile)?
                {
                    i += 1;
                }
                i += 1;
            }
            if i < startup_options.len() {
                let option = &startup_options[i];
                if is_arg(option.option()) {
                    let rcfile = self.rcfiles[option.rcfile_index()]
                        .filename()
                        .display()
                        .to_string();
                    self.parsed_startup_options
                        .process_arg(option.option(), "", &rcfile)?;
                } else {
                    warn!(
                        option = option.option(),
                        "ignoring stray trailing value in 'startup' options"
                    );
                }
            }
        }

        // Stop at the first non-option; that includes --help.
        let mut i = 1;
        if !self.args.is_empty() {
            while i < self.args.len() - 1 && is_arg(&self.args[i]) {
                if self
                    .parsed_startup_options
                    .process_arg(&self.args[i], &self.args[i + 1], "")?
                {
                    i += 1;
                }
                i += 1;
            }
            if i < self.args.len() && is_arg(&self.args[i]) {
                self.parsed_startup_options
                    .process_arg(&self.args[i], "", "")?;
                i += 1;
            }
        }
        self.startup_args = i - 1;
        Ok(())
    }

    /// Splices the internal options between the command and the user's own
    /// command arguments. Keep the options added here in sync with the
    /// server-side command dispatcher.
    fn add_rcfile_args_and_options(&mut self, batch: bool, cwd: &Path) {
        // The mapping from blazerc numbers to filenames.
        for rcfile in &self.rcfiles {
            self.command_arguments
                .push(format!("--rc_source={}", rcfile.filename().display()));
        }

        // The option defaults. Startup options are skipped: the client
        // already consumed them.
        for (command, options) in &self.rcoptions {
            if command == "startup" {
                continue;
            }
            for option in options {
                self.command_arguments.push(format!(
                    "--default_override={}:{}={}",
                    option.rcfile_index(),
                    command,
                    option.option()
                ));
            }
        }

        self.command_arguments
            .push(format!("--isatty={}", self.client_env.terminal.is_tty as u8));
        self.command_arguments.push(format!(
            "--terminal_columns={}",
            self.client_env.terminal.columns
        ));

        // The client environment, unless batch mode handles it locally.
        if batch {
            self.command_arguments.push("--ignore_client_env".to_owned());
        } else {
            for (key, value) in &self.client_env.env_vars {
                self.command_arguments
                    .push(format!("--client_env={}={}", key, value));
            }
        }
        self.command_arguments
            .push(format!("--client_cwd={}", cwd.display()));

        if self
            .client_env
            .env_vars
            .iter()
            .any(|(key, value)| key == "EMACS" && value == "t")
        {
            self.command_arguments.push("--emacs".to_owned());
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// The internal options followed by the user's command arguments.
    pub fn command_arguments(&self) -> &[String] {
        &self.command_arguments
    }

    /// The full vector handed to the server: the command followed by every
    /// internal and user argument.
    pub fn server_argv(&self) -> Vec<String> {
        std::iter::once(self.command.clone())
            .chain(self.command_arguments.iter().cloned())
            .collect()
    }

    pub fn parsed_startup_options(&self) -> &StartupOptions {
        &self.parsed_startup_options
    }

    pub fn rc_files(&self) -> &[RcFile] {
        &self.rcfiles
    }
}
