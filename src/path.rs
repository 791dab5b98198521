// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Bundled asset resolution.
//!
//! Determine where the script assets that ship with xcsort actually live on
//! the user's file system, and copy them into place when an install run needs
//! them next to a descriptor.
//!
//! # Candidate Search Paths
//!
//! Assets are looked up by plain file name across an ordered list of
//! candidate directories. The first candidate holding a readable regular file
//! wins:
//!
//! 1. The asset directory override from the install profile, when set.
//! 2. `../share/xcsort` relative to the running executable, for installs
//!    unpacked into a prefix.
//! 3. `$XDG_DATA_HOME/xcsort`, for per-user installs.
//! 4. The crate's own `assets/` directory, for development checkouts.
//!
//! None of the candidates are required to exist. Only the asset itself is.

use crate::config::InstallProfile;

use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Determine ordered candidate directories for bundled assets.
///
/// Does not check that any of the returned directories exist.
pub fn candidate_asset_dirs(profile: &InstallProfile) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(dir) = &profile.asset_dir {
        candidates.push(dir.clone());
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(prefix) = exe.parent().and_then(Path::parent) {
            candidates.push(prefix.join("share").join("xcsort"));
        }
    }

    if let Some(data) = dirs::data_dir() {
        candidates.push(data.join("xcsort"));
    }

    candidates.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets"));

    candidates
}

/// Locate a bundled asset by file name.
///
/// Scans the candidate directories in order, returning the first path that
/// refers to a readable regular file.
///
/// # Errors
///
/// - Return [`AssetError::NotFound`] if no candidate holds the asset. The
///   error carries every directory that was searched.
pub fn locate_asset(profile: &InstallProfile, file_name: &str) -> Result<PathBuf> {
    let searched = candidate_asset_dirs(profile);
    for dir in &searched {
        let candidate = dir.join(file_name);
        if fs::File::open(&candidate).is_ok() && candidate.is_file() {
            debug!("located asset {file_name} at {:?}", candidate.display());
            return Ok(candidate);
        }
    }

    Err(AssetError::NotFound {
        file_name: file_name.into(),
        searched,
    })
}

/// Copy an asset into place, forcing the executable permission bits.
///
/// Overwrites the destination if it already exists.
///
/// # Errors
///
/// - Return [`AssetError::Copy`] if the copy or the permission change fails.
pub fn copy_executable(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    fs::copy(from, to).map_err(|err| AssetError::Copy {
        source: err,
        from: from.to_path_buf(),
        to: to.to_path_buf(),
    })?;

    mark_executable(to).map_err(|err| AssetError::Copy {
        source: err,
        from: from.to_path_buf(),
        to: to.to_path_buf(),
    })?;

    Ok(())
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Asset resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Asset missing from every candidate directory.
    ///
    /// Usually means the tool was unpacked without its `share` directory.
    #[error("cannot locate bundled asset {file_name:?} in any of {searched:?}")]
    NotFound {
        file_name: String,
        searched: Vec<PathBuf>,
    },

    /// Asset could not be copied into place.
    #[error("failed to copy asset {:?} to {:?}", from.display(), to.display())]
    Copy {
        #[source]
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = AssetError> = std::result::Result<T, E>;
