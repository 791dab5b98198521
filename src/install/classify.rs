// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Root target classification.
//!
//! A __root target__ is a build target with no build-time dependencies on
//! other targets within the same descriptor. Those are the top-level products
//! users actually build, so they are the only targets worth carrying the sort
//! phase. Library targets pulled in as dependencies would just re-run the
//! sort redundantly.
//!
//! Eligibility is a pure function of the dependency sequence at call time.
//! Nothing here is cached or persisted: adding a dependency to a previously
//! eligible target excludes it on the next run.

use crate::{
    descriptor::{ObjectId, ProjectModel, Result},
    install::{phase, report::Observer},
};

use std::collections::HashSet;

/// Classify a project's root targets.
///
/// Returns the ordered sequence of dependency-free targets, deduplicated by
/// identity with first-seen order preserved. A project with zero targets, or
/// zero eligible targets, yields an empty sequence rather than an error.
///
/// Skipped targets and preexisting phases are reported through the observer.
/// Reporting never affects the returned sequence.
///
/// # Errors
///
/// - Return [`DescriptorError`](crate::descriptor::DescriptorError) if the
///   graph is malformed under a visited target.
pub fn root_targets<M, O>(
    model: &M,
    project: &ObjectId,
    phase_name: &str,
    observer: &O,
) -> Result<Vec<ObjectId>>
where
    M: ProjectModel,
    O: Observer,
{
    let mut seen = HashSet::new();
    let mut eligible = Vec::new();

    for target in model.targets(project)? {
        let name = model.target_name(&target)?;
        let dependencies = model.dependencies(&target)?;

        if dependencies.is_empty() {
            // INVARIANT: Dedup by identity, keep first-seen order.
            if seen.insert(target.clone()) {
                observer.target_classified(&name);
                eligible.push(target.clone());
            }
        } else {
            observer.target_skipped(&name, &dependencies);
        }

        if phase::has_sort_phase(model, &target, phase_name)? {
            observer.preexisting_phase(&name);
        }
    }

    Ok(eligible)
}
