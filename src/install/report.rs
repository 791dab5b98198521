// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Run observation.
//!
//! The decision core is logic-only and silent. Anything a user might want to
//! see along the way is funneled through the [`Observer`] extension points,
//! so the classifier and injector never print, and tests can run against a
//! mute observer without capturing output.

use crate::install::RunReport;

use tracing::{debug, info};

/// Extension points for watching an installation run.
///
/// Every hook has an empty default body. Implementations pick the events
/// they care about.
pub trait Observer {
    /// A dependency-free target was classified as eligible.
    fn target_classified(&self, _name: &str) {}

    /// A target was skipped for carrying dependencies.
    fn target_skipped(&self, _name: &str, _dependencies: &[String]) {}

    /// A target was seen already carrying the reserved phase.
    ///
    /// Emitted during classification for eligible and ineligible targets
    /// alike.
    fn preexisting_phase(&self, _name: &str) {}

    /// The reserved phase was appended to a target.
    fn phase_installed(&self, _name: &str) {}

    /// A target was left alone because it already carries the phase.
    fn phase_skipped(&self, _name: &str) {}

    /// The run reached a terminal state.
    fn run_concluded(&self, _report: &RunReport) {}
}

/// Observer that narrates through the tracing subscriber.
///
/// Classification detail lands on the debug level so it only shows up under
/// `--verbose`. Mutations and the final report land on info.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn target_classified(&self, name: &str) {
        debug!("target without dependencies: {name}");
    }

    fn target_skipped(&self, name: &str, dependencies: &[String]) {
        debug!(
            "target {name} has {} {}",
            dependencies.len(),
            plural(dependencies.len(), "dependency", "dependencies"),
        );
        for dependency in dependencies {
            debug!("    dependency: {dependency}");
        }
    }

    fn preexisting_phase(&self, name: &str) {
        debug!("target {name} has a preexisting sort phase");
    }

    fn phase_installed(&self, name: &str) {
        info!("adding sort phase to target {name}");
    }

    fn phase_skipped(&self, name: &str) {
        info!("target {name} already set up, skipping");
    }

    fn run_concluded(&self, report: &RunReport) {
        info!("{report}");
    }
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl Observer for Silent {}

pub(crate) fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
