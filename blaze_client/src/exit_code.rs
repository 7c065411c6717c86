/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use derive_more::Display;
use gazebo::prelude::*;

/// Process exit codes of the blaze client. Kept in sync with the server's
/// ExitCode enum; the launcher's `main` maps every client-side error through
/// [`ExitCode::code`].
#[derive(Copy, Clone, Dupe, Debug, Display, PartialEq, Eq)]
pub enum ExitCode {
    #[display(fmt = "success")]
    Success,
    #[display(fmt = "build failed")]
    BuildFailed,
    #[display(fmt = "bad argv")]
    BadArgv,
    #[display(fmt = "internal error")]
    InternalError,
}

impl ExitCode {
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::BuildFailed => 1,
            Self::BadArgv => 2,
            Self::InternalError => 37,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(0, ExitCode::Success.code());
        assert_eq!(1, ExitCode::BuildFailed.code());
        assert_eq!(2, ExitCode::BadArgv.code());
        assert_eq!(37, ExitCode::InternalError.code());
    }
}
