// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installation orchestration.
//!
//! One run of the [`Installer`] processes one descriptor: classify the root
//! targets of every project object in the graph, inject the sort phase where
//! it is missing, then decide what the run amounted to.
//!
//! # Outcomes
//!
//! - **Mutated** — at least one target gained the phase. Only this outcome
//!   touches the disk: the bundled sorter is copied next to the descriptor
//!   (executable), the ignore file learns to exclude the sort timestamp, and
//!   the descriptor is persisted. All three side effects are gated on the
//!   same condition and the descriptor is written at most once per run.
//! - **AlreadyConfigured** — eligible targets exist, every one already
//!   carries the phase. Zero disk writes.
//! - **NoEligibleTargets** — nothing to work on. Zero disk writes.
//!
//! Failures abort the whole run. There is no retry and no rollback: when the
//! descriptor save fails, the in-memory mutation is simply lost.
//!
//! # Preconditions
//!
//! The descriptor path must carry the expected extension, checked before any
//! file is opened. Both bundled assets must be readable before any target is
//! mutated, so a half-installed tool can never leave a half-injected
//! descriptor behind.

pub mod classify;
pub mod phase;
pub mod report;

use crate::{
    config::{InstallProfile, MissingIgnorePolicy, RootlessPolicy},
    descriptor::{pbx::PbxModel, DescriptorError, ProjectModel},
    ignore_file::IgnoreSheet,
    path::{copy_executable, locate_asset, AssetError},
};

use crate::install::{
    phase::PhaseVerdict,
    report::{plural, Observer, TracingObserver},
};
use std::{
    ffi::OsStr,
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Drives sort phase installation for one descriptor at a time.
pub struct Installer<O = TracingObserver>
where
    O: Observer,
{
    profile: InstallProfile,
    observer: O,
}

impl Installer {
    /// Construct new installer narrating through tracing.
    pub fn new(profile: InstallProfile) -> Self {
        Self {
            profile,
            observer: TracingObserver,
        }
    }
}

impl<O> Installer<O>
where
    O: Observer,
{
    /// Construct new installer with a custom observer.
    pub fn with_observer(profile: InstallProfile, observer: O) -> Self {
        Self { profile, observer }
    }

    /// Install the sort phase into a descriptor.
    ///
    /// `root_dir` overrides the directory used to locate the ignore file.
    /// By default that is the descriptor's parent directory.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::NotADescriptor`] if the path lacks the
    ///   expected extension. Checked before any file is opened.
    /// - Return [`InstallError::Asset`] if a bundled asset cannot be located.
    ///   Checked before any target is mutated.
    /// - Return [`InstallError::RootlessDescriptor`] if the graph has no
    ///   project root and the profile says to fail.
    /// - Return [`InstallError::Descriptor`] or [`InstallError::Ignore`] if
    ///   persistence fails. The in-memory mutation is not retried.
    pub fn install(
        &self,
        descriptor: impl AsRef<Path>,
        root_dir: Option<&Path>,
    ) -> Result<RunReport> {
        let descriptor = descriptor.as_ref();
        self.check_extension(descriptor)?;

        // INVARIANT: Both bundled assets are readable before any mutation.
        let phase_script = locate_asset(&self.profile, &self.profile.phase_script_file)?;
        let sort_script = locate_asset(&self.profile, &self.profile.sort_script_file)?;
        let script = fs::read_to_string(&phase_script).map_err(|err| InstallError::ReadAsset {
            source: err,
            path: phase_script,
        })?;

        let mut model = PbxModel::load(descriptor)?;
        let report = self.stage(&mut model, Some(script.as_str()))?;

        if report.outcome == Outcome::Mutated {
            self.persist(&model, descriptor, root_dir, &sort_script)?;
        }

        self.observer.run_concluded(&report);
        Ok(report)
    }

    /// Report what an install run would do, without mutating anything.
    ///
    /// The returned counts read as predictions: `installed` is the number of
    /// targets an install would touch right now.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::NotADescriptor`] if the path lacks the
    ///   expected extension.
    /// - Return [`InstallError::RootlessDescriptor`] if the graph has no
    ///   project root and the profile says to fail.
    pub fn survey(&self, descriptor: impl AsRef<Path>) -> Result<RunReport> {
        let descriptor = descriptor.as_ref();
        self.check_extension(descriptor)?;

        let mut model = PbxModel::load(descriptor)?;
        let report = self.stage(&mut model, None)?;

        self.observer.run_concluded(&report);
        Ok(report)
    }

    /// Classify and inject over every project root in the graph.
    ///
    /// With `script` absent the pass is read-only and only counts what an
    /// install would do.
    fn stage<M>(&self, model: &mut M, script: Option<&str>) -> Result<RunReport>
    where
        M: ProjectModel,
    {
        let roots = model.project_roots();
        if roots.is_empty() {
            match self.profile.rootless {
                RootlessPolicy::Fail => return Err(InstallError::RootlessDescriptor),
                RootlessPolicy::Ignore => {
                    warn!("descriptor has no project root object, nothing to do");
                    return Ok(RunReport::conclude(0, 0, 0));
                }
            }
        }

        let (mut classified, mut installed, mut skipped) = (0, 0, 0);
        for root in &roots {
            let eligible =
                classify::root_targets(model, root, &self.profile.phase_name, &self.observer)?;
            classified += eligible.len();

            for target in &eligible {
                let verdict = match script {
                    Some(script) => phase::ensure_sort_phase(
                        model,
                        target,
                        &self.profile.phase_name,
                        script,
                        &self.observer,
                    )?,
                    None => {
                        if phase::has_sort_phase(model, target, &self.profile.phase_name)? {
                            PhaseVerdict::Skipped
                        } else {
                            PhaseVerdict::Installed
                        }
                    }
                };

                match verdict {
                    PhaseVerdict::Installed => installed += 1,
                    PhaseVerdict::Skipped => skipped += 1,
                }
            }
        }

        Ok(RunReport::conclude(classified, installed, skipped))
    }

    /// Persistence sequence for a mutated run.
    ///
    /// Copies the sorter next to the descriptor, ensures the ignore marker,
    /// then writes the descriptor itself. Any failure aborts the run.
    fn persist(
        &self,
        model: &impl ProjectModel,
        descriptor: &Path,
        root_dir: Option<&Path>,
        sort_script: &Path,
    ) -> Result<()> {
        let home = descriptor.parent().unwrap_or(Path::new("."));

        let installed_sorter = home.join(&self.profile.sort_script_file);
        debug!("copying sort script to {:?}", installed_sorter.display());
        copy_executable(sort_script, &installed_sorter)?;

        let ignore_dir = root_dir.unwrap_or(home);
        debug!("locating ignore file under {:?}", ignore_dir.display());
        self.ensure_ignore_entry(ignore_dir)?;

        debug!("saving descriptor modifications");
        model.persist(descriptor)?;

        Ok(())
    }

    fn ensure_ignore_entry(&self, dir: &Path) -> Result<()> {
        let path = dir.join(&self.profile.ignore_file);
        let mut sheet = if path.exists() {
            IgnoreSheet::load(&path)?
        } else {
            match self.profile.missing_ignore {
                MissingIgnorePolicy::Warn => {
                    warn!(
                        "no ignore file at {:?}, exclude {:?} from version control yourself",
                        path.display(),
                        self.profile.timestamp_file,
                    );
                    return Ok(());
                }
                MissingIgnorePolicy::Create => IgnoreSheet::create(&path),
            }
        };

        if sheet.ensure_marker(&self.profile.timestamp_file) {
            debug!("adding sort timestamp file to ignore file");
            sheet.save()?;
        } else {
            debug!("ignore file already excludes the sort timestamp file");
        }

        Ok(())
    }

    fn check_extension(&self, descriptor: &Path) -> Result<()> {
        let expected = self.profile.descriptor_extension.as_str();
        let matches = descriptor
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|extension| extension == expected);

        if matches {
            Ok(())
        } else {
            Err(InstallError::NotADescriptor {
                path: descriptor.to_path_buf(),
                extension: expected.to_string(),
            })
        }
    }
}

/// Terminal state of one run, with target counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// What the run amounted to.
    pub outcome: Outcome,

    /// Targets classified eligible across every project root.
    pub classified: usize,

    /// Targets that gained the sort phase this run.
    pub installed: usize,

    /// Eligible targets that already carried the phase.
    pub skipped: usize,
}

impl RunReport {
    fn conclude(classified: usize, installed: usize, skipped: usize) -> Self {
        let outcome = if installed > 0 {
            Outcome::Mutated
        } else if classified > 0 {
            Outcome::AlreadyConfigured
        } else {
            Outcome::NoEligibleTargets
        };

        Self {
            outcome,
            classified,
            installed,
            skipped,
        }
    }
}

impl Display for RunReport {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self.outcome {
            Outcome::Mutated => write!(
                fmt,
                "integrated sort phase into {} {}, {} already configured",
                self.installed,
                plural(self.installed, "target", "targets"),
                self.skipped,
            ),
            Outcome::AlreadyConfigured => write!(
                fmt,
                "no targets modified, every eligible target already carries the sort phase",
            ),
            Outcome::NoEligibleTargets => write!(
                fmt,
                "no targets modified, the project has no valid targets for modification",
            ),
        }
    }
}

/// How one run concluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// At least one target gained the phase and the descriptor was persisted.
    Mutated,

    /// Every eligible target already carried the phase. No side effects.
    AlreadyConfigured,

    /// No eligible targets existed. No side effects.
    NoEligibleTargets,
}

/// Installation error types.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// Descriptor path lacks the expected extension.
    #[error("{:?} does not look like a project descriptor (expected a {extension:?} extension)", path.display())]
    NotADescriptor { path: PathBuf, extension: String },

    /// Bundled asset cannot be located or copied.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Bundled script located but not readable.
    #[error("failed to read bundled script at {:?}", path.display())]
    ReadAsset {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Descriptor graph has no project root object.
    #[error("descriptor contains no project root object")]
    RootlessDescriptor,

    /// Descriptor access fails.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// Ignore marker bookkeeping fails.
    #[error(transparent)]
    Ignore(#[from] crate::ignore_file::Error),
}

/// Friendly result alias :3
pub type Result<T, E = InstallError> = std::result::Result<T, E>;
