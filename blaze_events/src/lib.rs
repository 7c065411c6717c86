/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Diagnostic events reported during analysis.
//!
//! Rule implementations report errors and warnings through a [`Reporter`].
//! There are two sinks for those reports: the process-global reporter, which
//! writes straight to stderr, and a per-target buffer which is inspected once
//! the target finishes analysis. The analysis environment picks the sink;
//! rule logic never knows which one it is talking to.

use std::sync::Arc;
use std::sync::Mutex;

use derive_more::Display;
use gazebo::prelude::*;

/// How bad a reported event is. Only [`Severity::Error`] marks the reporting
/// target as failed.
#[derive(Copy, Clone, Dupe, Debug, Display, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    #[display(fmt = "INFO")]
    Info,
    #[display(fmt = "WARNING")]
    Warning,
    #[display(fmt = "ERROR")]
    Error,
}

/// One reported diagnostic.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
#[display(fmt = "{}: {}", severity, message)]
pub struct Event {
    severity: Severity,
    message: String,
}

impl Event {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Where rule logic sends its diagnostics.
pub trait Reporter: Send + Sync {
    fn report(&self, severity: Severity, message: &str);

    fn warning(&self, message: &str) {
        self.report(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        self.report(Severity::Error, message);
    }
}

/// The process-global reporter: every event goes straight to stderr.
#[derive(Debug, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&self, severity: Severity, message: &str) {
        eprintln!("{}: {}", severity, message);
    }
}

/// Buffers events so the driver can inspect them after the reporting target
/// finishes analysis.
#[derive(Debug, Default)]
pub struct StoredReporter {
    events: Mutex<Vec<Event>>,
}

impl StoredReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any event of [`Severity::Error`] was reported.
    pub fn has_errors(&self) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.severity() == Severity::Error)
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn take_events(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl Reporter for StoredReporter {
    fn report(&self, severity: Severity, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::new(severity, message));
    }
}

/// The sink an analysis environment routes rule diagnostics into: the global
/// reporter for the system environment, a per-target buffer otherwise.
pub enum ErrorSink {
    Global(Arc<dyn Reporter>),
    Stored(StoredReporter),
}

impl ErrorSink {
    pub fn stored() -> Self {
        Self::Stored(StoredReporter::new())
    }

    pub fn as_reporter(&self) -> &dyn Reporter {
        match self {
            Self::Global(reporter) => &**reporter,
            Self::Stored(stored) => stored,
        }
    }

    /// Whether an error has been buffered. Always false for the global sink:
    /// events sent there are not tracked.
    pub fn has_errors(&self) -> bool {
        match self {
            Self::Global(_) => false,
            Self::Stored(stored) => stored.has_errors(),
        }
    }
}
