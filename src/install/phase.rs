// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Sort phase detection and injection.
//!
//! The __sort phase__ is the reserved-name shell-script build phase that, at
//! build time, invokes the bundled sorter against the descriptor. Detection
//! and injection agree on one contract: the reserved name is compared with
//! exact string equality. Substring containment would flag user phases with
//! merely similar names, so it is deliberately not used.
//!
//! Injection mutates the in-memory graph only. Disk never changes at this
//! layer.

use crate::{
    descriptor::{ObjectId, ProjectModel, Result},
    install::report::Observer,
};

/// What happened to one target during injection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseVerdict {
    /// The reserved phase was appended.
    Installed,

    /// The target already carried the reserved phase.
    Skipped,
}

/// Check whether a target already carries the reserved phase.
///
/// Scans every existing build phase, short-circuiting on the first display
/// name equal to the reserved name.
pub fn has_sort_phase<M>(model: &M, target: &ObjectId, phase_name: &str) -> Result<bool>
where
    M: ProjectModel,
{
    Ok(model
        .phase_names(target)?
        .iter()
        .any(|name| name == phase_name))
}

/// Append the reserved phase to a target unless it is already there.
///
/// The script text becomes the body of the new phase. A target that already
/// carries the phase is left untouched, keeping the phase unique across
/// repeated runs.
pub fn ensure_sort_phase<M, O>(
    model: &mut M,
    target: &ObjectId,
    phase_name: &str,
    script: &str,
    observer: &O,
) -> Result<PhaseVerdict>
where
    M: ProjectModel,
    O: Observer,
{
    let name = model.target_name(target)?;
    if has_sort_phase(model, target, phase_name)? {
        observer.phase_skipped(&name);
        return Ok(PhaseVerdict::Skipped);
    }

    observer.phase_installed(&name);
    model.append_script_phase(target, phase_name, script)?;

    Ok(PhaseVerdict::Installed)
}
