/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Parsing of `.blazerc` files.
//!
//! An rc-file is a sequence of lines `command option...`, with `#` comments,
//! shell-like quoting, backslash escapes, and backslash-newline line
//! continuations. The special command `import <path>` inlines another
//! rc-file at the position of the directive; cycles are rejected.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::warn;

use crate::exit_code::ExitCode;

#[derive(Error, Debug)]
pub enum RcFileError {
    /// Readability was probed before parsing, so this is unexpected.
    #[error("Unexpected error reading .blazerc file '{}'", .path.display())]
    Unreadable { path: PathBuf, source: io::Error },
    #[error("Invalid import declaration in .blazerc file '{}': '{line}'", .path.display())]
    InvalidImport { path: PathBuf, line: String },
    #[error("Import loop detected:\n{stack}")]
    ImportLoop { stack: String },
}

impl RcFileError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Unreadable { .. } => ExitCode::InternalError,
            Self::InvalidImport { .. } | Self::ImportLoop { .. } => ExitCode::BadArgv,
        }
    }
}

/// A single option read from an rc-file, remembering which file it came
/// from. The index is resolved against the discovered rc-file list when the
/// option is forwarded as a `--default_override`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RcOption {
    rcfile_index: usize,
    option: String,
}

impl RcOption {
    pub fn new(rcfile_index: usize, option: impl Into<String>) -> Self {
        Self {
            rcfile_index,
            option: option.into(),
        }
    }

    pub fn rcfile_index(&self) -> usize {
        self.rcfile_index
    }

    pub fn option(&self) -> &str {
        &self.option
    }
}

/// Options grouped by the command they apply to. Within a command, order is
/// the textual order across all parsed files, with imports inlined at the
/// position of the directive.
pub type RcOptionMap = IndexMap<String, Vec<RcOption>>;

/// One discovered rc-file. `index` is its position in discovery order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RcFile {
    filename: PathBuf,
    index: usize,
}

impl RcFile {
    pub fn new(filename: PathBuf, index: usize) -> Self {
        Self { filename, index }
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Parses this rc-file, appending every imported file to `rcfiles` and
    /// every option to `rcoptions`.
    pub fn parse(
        &self,
        rcfiles: &mut Vec<RcFile>,
        rcoptions: &mut RcOptionMap,
    ) -> Result<(), RcFileError> {
        let mut import_stack = vec![self.filename.clone()];
        Self::parse_file(
            &self.filename,
            self.index,
            rcfiles,
            rcoptions,
            &mut import_stack,
        )
    }

    fn parse_file(
        filename: &Path,
        index: usize,
        rcfiles: &mut Vec<RcFile>,
        rcoptions: &mut RcOptionMap,
        import_stack: &mut Vec<PathBuf>,
    ) -> Result<(), RcFileError> {
        let contents = fs::read_to_string(filename).map_err(|source| RcFileError::Unreadable {
            path: filename.to_owned(),
            source,
        })?;

        // A '\' at the end of a line continues the line.
        let contents = contents.replace("\\\r\n", "").replace("\\\n", "");

        let mut startup_options: Vec<String> = Vec::new();
        for raw_line in contents.split('\n') {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            let words = tokenize(line);
            if words.is_empty() {
                // The line held nothing but a comment.
                continue;
            }

            let command = &words[0];
            if command == "import" {
                if words.len() != 2 {
                    return Err(RcFileError::InvalidImport {
                        path: filename.to_owned(),
                        line: line.to_owned(),
                    });
                }
                let imported = PathBuf::from(&words[1]);
                if import_stack.contains(&imported) {
                    let stack = import_stack
                        .iter()
                        .map(|p| format!("  {}\n", p.display()))
                        .collect::<String>();
                    return Err(RcFileError::ImportLoop { stack });
                }
                let rc = RcFile::new(imported.clone(), rcfiles.len());
                let imported_index = rc.index;
                rcfiles.push(rc);
                import_stack.push(imported.clone());
                Self::parse_file(&imported, imported_index, rcfiles, rcoptions, import_stack)?;
                import_stack.pop();
            } else {
                for word in &words[1..] {
                    rcoptions
                        .entry(command.clone())
                        .or_default()
                        .push(RcOption::new(index, word.clone()));
                    if command == "startup" {
                        startup_options.push(word.clone());
                    }
                }
            }
        }

        if !startup_options.is_empty() {
            eprintln!(
                "INFO: Reading 'startup' options from {}: {}",
                filename.display(),
                startup_options.join(" ")
            );
        }
        Ok(())
    }
}

/// Splits an rc-file line into words: whitespace separates, `#` starts a
/// comment, single and double quotes group, backslash escapes the next
/// character. Dangling escapes and unterminated quotes are tolerated for
/// compatibility with existing rc files; both get a warning.
fn tokenize(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => {
                    current.push(escaped);
                    in_token = true;
                }
                None => warn!(line, "dangling backslash escape in rc file line"),
            },
            '\'' | '"' => {
                if quote == Some(c) {
                    quote = None;
                } else if quote.is_none() {
                    quote = Some(c);
                    in_token = true;
                } else {
                    current.push(c);
                }
            }
            '#' if quote.is_none() => break,
            c if quote.is_none() && c.is_whitespace() => {
                if in_token {
                    words.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if quote.is_some() {
        warn!(line, "unterminated quote in rc file line");
    }
    if in_token {
        words.push(current);
    }
    words
}
