// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Project descriptor access.
//!
//! A __descriptor__ is the on-disk project file this tool mutates. Its object
//! graph owns projects, targets, dependencies, and build phases. The install
//! logic never touches the serialization library's concrete types. It sees
//! the graph only through the [`ProjectModel`] capability trait, so the
//! backing format stays swappable and the decision core stays testable with
//! an in-memory graph.
//!
//! The one concrete adapter lives in [`pbx`], wrapping a property-list object
//! graph as found inside an `.xcodeproj` bundle.

pub mod pbx;

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
};

/// Stable identity of one object inside a descriptor graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    /// Treat identity as string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for ObjectId {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.0.as_str())
    }
}

/// Capability set the install logic needs from a descriptor graph.
///
/// Read capabilities are side-effect free. The only mutating capability is
/// [`ProjectModel::append_script_phase`], and the only persistence capability
/// is [`ProjectModel::persist`]. Everything in between happens in memory.
pub trait ProjectModel {
    /// Enumerate objects satisfying the "is a project root" predicate.
    ///
    /// A well-formed descriptor carries exactly one, but the graph may hold
    /// zero or several. Callers decide what to make of that.
    fn project_roots(&self) -> Vec<ObjectId>;

    /// Enumerate a project's targets in descriptor order.
    fn targets(&self, project: &ObjectId) -> Result<Vec<ObjectId>>;

    /// Read a target's display name.
    fn target_name(&self, target: &ObjectId) -> Result<String>;

    /// Read display labels for a target's dependencies, in order.
    fn dependencies(&self, target: &ObjectId) -> Result<Vec<String>>;

    /// Read display names of a target's build phases, in order.
    fn phase_names(&self, target: &ObjectId) -> Result<Vec<String>>;

    /// Append a shell-script build phase to a target.
    ///
    /// Returns the fresh identifier minted for the new phase.
    fn append_script_phase(
        &mut self,
        target: &ObjectId,
        name: &str,
        script: &str,
    ) -> Result<ObjectId>;

    /// Persist the graph back into the descriptor at the given path.
    fn persist(&self, descriptor: &Path) -> Result<()>;
}

/// Descriptor access error types.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// Descriptor cannot be read or parsed.
    #[error("failed to read project descriptor at {:?}", path.display())]
    Read {
        #[source]
        source: plist::Error,
        path: std::path::PathBuf,
    },

    /// Descriptor cannot be written back.
    #[error("failed to save project descriptor at {:?}", path.display())]
    Write {
        #[source]
        source: plist::Error,
        path: std::path::PathBuf,
    },

    /// Graph refers to an object it does not contain.
    #[error("descriptor graph has no object with identifier {id}")]
    UnknownObject { id: ObjectId },

    /// Object lacks a field the model requires, or the field has the wrong
    /// shape.
    #[error("object {id} carries a missing or malformed {field:?} field")]
    MalformedObject { id: ObjectId, field: &'static str },

    /// Top level of the descriptor is not the expected object graph.
    #[error("descriptor is not a project object graph ({reason})")]
    MalformedGraph { reason: &'static str },
}

/// Friendly result alias :3
pub type Result<T, E = DescriptorError> = std::result::Result<T, E>;

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory descriptor graph for exercising the decision core without
    //! touching the disk.

    use super::{DescriptorError, ObjectId, ProjectModel, Result};
    use std::path::Path;

    #[derive(Clone, Debug, Default)]
    pub(crate) struct MemoryModel {
        rooted: bool,
        targets: Vec<MemoryTarget>,
    }

    #[derive(Clone, Debug)]
    struct MemoryTarget {
        id: ObjectId,
        name: String,
        dependencies: Vec<String>,
        phases: Vec<(String, String)>,
    }

    impl MemoryModel {
        pub(crate) fn new() -> Self {
            Self {
                rooted: true,
                targets: Vec::new(),
            }
        }

        pub(crate) fn rootless() -> Self {
            Self {
                rooted: false,
                targets: Vec::new(),
            }
        }

        pub(crate) fn add_target(
            &mut self,
            name: &str,
            dependencies: impl IntoIterator<Item = &'static str>,
        ) -> ObjectId {
            let id = ObjectId::from(format!("T{}", self.targets.len()));
            self.targets.push(MemoryTarget {
                id: id.clone(),
                name: name.into(),
                dependencies: dependencies.into_iter().map(Into::into).collect(),
                phases: Vec::new(),
            });
            id
        }

        pub(crate) fn add_dependency(&mut self, target: &ObjectId, label: &str) {
            let target = self.target_mut(target).expect("target exists");
            target.dependencies.push(label.into());
        }

        pub(crate) fn add_phase(&mut self, target: &ObjectId, name: &str) {
            let target = self.target_mut(target).expect("target exists");
            target.phases.push((name.into(), String::new()));
        }

        pub(crate) fn phase_bodies(&self, target: &ObjectId) -> Vec<(String, String)> {
            self.target(target).expect("target exists").phases.clone()
        }

        fn target(&self, id: &ObjectId) -> Option<&MemoryTarget> {
            self.targets.iter().find(|target| &target.id == id)
        }

        fn target_mut(&mut self, id: &ObjectId) -> Option<&mut MemoryTarget> {
            self.targets.iter_mut().find(|target| &target.id == id)
        }

        fn require(&self, id: &ObjectId) -> Result<&MemoryTarget> {
            self.target(id).ok_or(DescriptorError::UnknownObject { id: id.clone() })
        }
    }

    impl ProjectModel for MemoryModel {
        fn project_roots(&self) -> Vec<ObjectId> {
            if self.rooted {
                vec![ObjectId::from("ROOT")]
            } else {
                Vec::new()
            }
        }

        fn targets(&self, _project: &ObjectId) -> Result<Vec<ObjectId>> {
            Ok(self.targets.iter().map(|target| target.id.clone()).collect())
        }

        fn target_name(&self, target: &ObjectId) -> Result<String> {
            Ok(self.require(target)?.name.clone())
        }

        fn dependencies(&self, target: &ObjectId) -> Result<Vec<String>> {
            Ok(self.require(target)?.dependencies.clone())
        }

        fn phase_names(&self, target: &ObjectId) -> Result<Vec<String>> {
            Ok(self
                .require(target)?
                .phases
                .iter()
                .map(|(name, _)| name.clone())
                .collect())
        }

        fn append_script_phase(
            &mut self,
            target: &ObjectId,
            name: &str,
            script: &str,
        ) -> Result<ObjectId> {
            self.require(target)?;
            let target = self.target_mut(target).expect("target exists");
            target.phases.push((name.into(), script.into()));
            Ok(ObjectId::from(format!("P{}", target.phases.len())))
        }

        fn persist(&self, _descriptor: &Path) -> Result<()> {
            Ok(())
        }
    }
}
