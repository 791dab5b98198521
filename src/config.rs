// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Install profile layout.
//!
//! Specify the layout of the profile that controls an installation run. The
//! profile replaces what would otherwise be a pile of module-level constants:
//! the reserved phase name, the bundled asset file names, the ignore marker,
//! and the policies that cover behavior the tool cannot guess on its own.
//! File I/O is left to the caller to figure out.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
};

/// Install profile layout.
///
/// An install run is fully described by its profile. The profile names the
/// reserved build phase, the bundled assets the run depends on, the ignore
/// marker bookkeeping, and the policies for situations where historical
/// behavior diverged.
///
/// The [`Default`] profile carries the canonical values every normal install
/// uses. A profile file is only needed when a team wants distinct reserved
/// names, a custom asset directory, or different policies.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InstallProfile {
    /// Reserved display name of the injected build phase.
    ///
    /// Both the detector and the injector use this exact string. Matching is
    /// by string equality, never substring containment, so user phases with
    /// similar names are left alone.
    pub phase_name: String,

    /// File name of the bundled sorter copied next to the descriptor.
    pub sort_script_file: String,

    /// File name of the bundled script whose text becomes the phase body.
    pub phase_script_file: String,

    /// File name of the timestamp file the sorter produces at build time.
    ///
    /// Never written by this tool. Only referenced when excluding it from
    /// version control.
    pub timestamp_file: String,

    /// Expected extension of a project descriptor path.
    pub descriptor_extension: String,

    /// File name of the version-control ignore file.
    pub ignore_file: String,

    /// Directory searched for bundled assets before the standard candidates.
    pub asset_dir: Option<PathBuf>,

    /// What to do when the descriptor graph has no project root object.
    pub rootless: RootlessPolicy,

    /// What to do when the ignore file does not exist.
    pub missing_ignore: MissingIgnorePolicy,
}

impl Default for InstallProfile {
    fn default() -> Self {
        Self {
            phase_name: "XcodeProjectSortPhase".into(),
            sort_script_file: "sort-Xcode-project-file.pl".into(),
            phase_script_file: "sort-phase.sh".into(),
            timestamp_file: "project_sort_last_run".into(),
            descriptor_extension: "xcodeproj".into(),
            ignore_file: ".gitignore".into(),
            asset_dir: None,
            rootless: RootlessPolicy::default(),
            missing_ignore: MissingIgnorePolicy::default(),
        }
    }
}

impl FromStr for InstallProfile {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut profile: InstallProfile = toml::de::from_str(data)?;

        // INVARIANT: Perform shell expansion on asset directory override.
        if let Some(asset_dir) = profile.asset_dir.take() {
            let expanded = shellexpand::full(asset_dir.to_string_lossy().as_ref())
                .map_err(ConfigError::ShellExpansion)?
                .into_owned();
            profile.asset_dir = Some(PathBuf::from(expanded));
        }

        Ok(profile)
    }
}

impl Display for InstallProfile {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Behavior when the descriptor graph contains no project root object.
///
/// One historical revision silently did nothing in this situation. Treating
/// the descriptor as structurally invalid is the stricter reading, so it is
/// the default, but both behaviors stay selectable.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootlessPolicy {
    /// Fail the run with a structural error.
    #[default]
    Fail,

    /// Conclude the run as a no-op with zero eligible targets.
    Ignore,
}

/// Behavior when the version-control ignore file does not exist.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingIgnorePolicy {
    /// Leave the file alone and tell the user to add the marker themselves.
    #[default]
    Warn,

    /// Create the ignore file with the marker as its only entry.
    Create,
}

/// Profile error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize profile.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize profile.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on profile.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
