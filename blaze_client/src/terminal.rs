/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::io;

use crossterm::tty::IsTty;

/// What the client knows about its controlling terminal. Forwarded to the
/// server as `--isatty` and `--terminal_columns`; injectable so tests do not
/// depend on how cargo runs them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TerminalInfo {
    pub is_tty: bool,
    pub columns: u16,
}

impl TerminalInfo {
    pub fn detect() -> Self {
        let is_tty = io::stdout().is_tty();
        let columns = crossterm::terminal::size()
            .map(|(columns, _rows)| columns)
            .unwrap_or(80);
        Self { is_tty, columns }
    }
}
