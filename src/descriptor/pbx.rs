// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Property-list descriptor adapter.
//!
//! Concrete [`ProjectModel`] over the object graph stored in an `.xcodeproj`
//! bundle. The bundle is a directory; the graph itself lives in the
//! `project.pbxproj` property list inside it. Objects sit in one flat table
//! keyed by 24-hex-digit identifiers, each object a record with an `isa`
//! discriminator. Project roots are the records whose `isa` is `PBXProject`.
//!
//! The adapter reads and writes through the `plist` crate and keeps the graph
//! loosely typed on purpose: the install logic only ever needs the handful of
//! capabilities in [`ProjectModel`], and everything else in the graph must
//! survive a load/persist round trip untouched.

use crate::descriptor::{DescriptorError, ObjectId, ProjectModel, Result};

use plist::{Dictionary, Value};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Name of the object graph file inside a descriptor bundle.
const GRAPH_FILE_NAME: &str = "project.pbxproj";

/// Descriptor graph backed by a property list.
#[derive(Clone, Debug)]
pub struct PbxModel {
    graph: Value,
}

impl PbxModel {
    /// Load the object graph out of a descriptor bundle.
    ///
    /// # Errors
    ///
    /// - Return [`DescriptorError::Read`] if the graph file cannot be read or
    ///   parsed.
    pub fn load(descriptor: impl AsRef<Path>) -> Result<Self> {
        let path = graph_path(descriptor.as_ref());
        let graph = Value::from_file(&path).map_err(|err| DescriptorError::Read {
            source: err,
            path,
        })?;

        Ok(Self { graph })
    }

    fn objects(&self) -> Result<&Dictionary> {
        self.graph
            .as_dictionary()
            .ok_or(DescriptorError::MalformedGraph {
                reason: "top level is not a record",
            })?
            .get("objects")
            .and_then(|value| value.as_dictionary())
            .ok_or(DescriptorError::MalformedGraph {
                reason: "missing object table",
            })
    }

    fn objects_mut(&mut self) -> Result<&mut Dictionary> {
        self.graph
            .as_dictionary_mut()
            .ok_or(DescriptorError::MalformedGraph {
                reason: "top level is not a record",
            })?
            .get_mut("objects")
            .and_then(|value| value.as_dictionary_mut())
            .ok_or(DescriptorError::MalformedGraph {
                reason: "missing object table",
            })
    }

    fn object(&self, id: &ObjectId) -> Result<&Dictionary> {
        self.objects()?
            .get(id.as_str())
            .and_then(|value| value.as_dictionary())
            .ok_or(DescriptorError::UnknownObject { id: id.clone() })
    }

    fn string_field(&self, id: &ObjectId, field: &'static str) -> Result<String> {
        self.object(id)?
            .get(field)
            .and_then(Value::as_string)
            .map(ToString::to_string)
            .ok_or(DescriptorError::MalformedObject {
                id: id.clone(),
                field,
            })
    }

    fn id_list(&self, id: &ObjectId, field: &'static str) -> Result<Vec<ObjectId>> {
        let object = self.object(id)?;
        let Some(value) = object.get(field) else {
            return Ok(Vec::new());
        };

        let entries = value.as_array().ok_or(DescriptorError::MalformedObject {
            id: id.clone(),
            field,
        })?;

        entries
            .iter()
            .map(|entry| {
                entry
                    .as_string()
                    .map(ObjectId::from)
                    .ok_or(DescriptorError::MalformedObject {
                        id: id.clone(),
                        field,
                    })
            })
            .collect()
    }

    /// Resolve a dependency record to something readable.
    ///
    /// A dependency record points at the target it produces. Falls back to
    /// the raw identifier when the record or its target cannot be resolved.
    fn dependency_label(&self, dependency: &ObjectId) -> String {
        self.object(dependency)
            .ok()
            .and_then(|record| record.get("target"))
            .and_then(Value::as_string)
            .and_then(|target| self.object(&ObjectId::from(target)).ok())
            .and_then(|record| record.get("name"))
            .and_then(Value::as_string)
            .map(ToString::to_string)
            .unwrap_or_else(|| dependency.to_string())
    }

    /// Display name of a build phase record.
    ///
    /// Script phases carry an explicit `name`. Stock phases do not, so their
    /// conventional display name is derived from the `isa` discriminator.
    fn phase_display_name(&self, phase: &ObjectId) -> Result<String> {
        let record = self.object(phase)?;
        if let Some(name) = record.get("name").and_then(Value::as_string) {
            return Ok(name.to_string());
        }

        let isa = record
            .get("isa")
            .and_then(Value::as_string)
            .ok_or(DescriptorError::MalformedObject {
                id: phase.clone(),
                field: "isa",
            })?;

        Ok(match isa {
            "PBXSourcesBuildPhase" => "Sources".to_string(),
            "PBXFrameworksBuildPhase" => "Frameworks".to_string(),
            "PBXResourcesBuildPhase" => "Resources".to_string(),
            "PBXHeadersBuildPhase" => "Headers".to_string(),
            "PBXCopyFilesBuildPhase" => "CopyFiles".to_string(),
            "PBXShellScriptBuildPhase" => "Run Script".to_string(),
            other => other.to_string(),
        })
    }
}

impl ProjectModel for PbxModel {
    fn project_roots(&self) -> Vec<ObjectId> {
        let Ok(objects) = self.objects() else {
            return Vec::new();
        };

        objects
            .iter()
            .filter(|(_, object)| {
                object
                    .as_dictionary()
                    .and_then(|record| record.get("isa"))
                    .and_then(Value::as_string)
                    .is_some_and(|isa| isa == "PBXProject")
            })
            .map(|(id, _)| ObjectId::from(id.to_string()))
            .collect()
    }

    fn targets(&self, project: &ObjectId) -> Result<Vec<ObjectId>> {
        self.id_list(project, "targets")
    }

    fn target_name(&self, target: &ObjectId) -> Result<String> {
        self.string_field(target, "name")
    }

    fn dependencies(&self, target: &ObjectId) -> Result<Vec<String>> {
        Ok(self
            .id_list(target, "dependencies")?
            .iter()
            .map(|dependency| self.dependency_label(dependency))
            .collect())
    }

    fn phase_names(&self, target: &ObjectId) -> Result<Vec<String>> {
        self.id_list(target, "buildPhases")?
            .iter()
            .map(|phase| self.phase_display_name(phase))
            .collect()
    }

    fn append_script_phase(
        &mut self,
        target: &ObjectId,
        name: &str,
        script: &str,
    ) -> Result<ObjectId> {
        // INVARIANT: Validate the target before the graph grows.
        self.object(target)?;

        let id = fresh_id(self.objects()?);
        let objects = self.objects_mut()?;
        objects.insert(id.clone(), Value::Dictionary(script_phase_record(name, script)));

        let record = objects
            .get_mut(target.as_str())
            .and_then(|value| value.as_dictionary_mut())
            .ok_or(DescriptorError::UnknownObject { id: target.clone() })?;
        if record.get("buildPhases").is_none() {
            record.insert("buildPhases".to_string(), Value::Array(Vec::new()));
        }
        let phases = record
            .get_mut("buildPhases")
            .and_then(|value| value.as_array_mut())
            .ok_or(DescriptorError::MalformedObject {
                id: target.clone(),
                field: "buildPhases",
            })?;
        phases.push(Value::String(id.clone()));

        Ok(ObjectId::from(id))
    }

    fn persist(&self, descriptor: &Path) -> Result<()> {
        let path = graph_path(descriptor);
        self.graph
            .to_file_xml(&path)
            .map_err(|err| DescriptorError::Write { source: err, path })
    }
}

fn graph_path(descriptor: &Path) -> PathBuf {
    descriptor.join(GRAPH_FILE_NAME)
}

/// Mint an identifier unused by the object table.
///
/// Identifiers follow the 24-hex-digit convention of the descriptor format.
fn fresh_id(objects: &Dictionary) -> String {
    loop {
        let id = Uuid::new_v4().simple().to_string().to_uppercase()[..24].to_string();
        if objects.get(id.as_str()).is_none() {
            return id;
        }
    }
}

fn script_phase_record(name: &str, script: &str) -> Dictionary {
    let mut record = Dictionary::new();
    record.insert("isa".into(), Value::String("PBXShellScriptBuildPhase".into()));
    record.insert(
        "buildActionMask".into(),
        Value::Integer(plist::Integer::from(2147483647u64)),
    );
    record.insert("files".into(), Value::Array(Vec::new()));
    record.insert("inputPaths".into(), Value::Array(Vec::new()));
    record.insert("outputPaths".into(), Value::Array(Vec::new()));
    record.insert("name".into(), Value::String(name.into()));
    record.insert(
        "runOnlyForDeploymentPostprocessing".into(),
        Value::Integer(plist::Integer::from(0u64)),
    );
    record.insert("shellPath".into(), Value::String("/bin/sh".into()));
    record.insert("shellScript".into(), Value::String(script.into()));
    record
}

#[cfg(test)]
impl PbxModel {
    pub(crate) fn from_graph(graph: Value) -> Self {
        Self { graph }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs;

    fn record(pairs: &[(&str, Value)]) -> Value {
        let mut dictionary = Dictionary::new();
        for (key, value) in pairs {
            dictionary.insert((*key).to_string(), value.clone());
        }
        Value::Dictionary(dictionary)
    }

    fn ids(entries: &[&str]) -> Value {
        Value::Array(entries.iter().map(|id| Value::String((*id).to_string())).collect())
    }

    /// Graph with one project, an app target, and a test target depending on
    /// the app target.
    fn sample_graph() -> Value {
        let mut objects = Dictionary::new();
        objects.insert(
            "PROJECT0000000000000001".into(),
            record(&[
                ("isa", Value::String("PBXProject".into())),
                ("targets", ids(&["TARGET00000000000000001", "TARGET00000000000000002"])),
            ]),
        );
        objects.insert(
            "TARGET00000000000000001".into(),
            record(&[
                ("isa", Value::String("PBXNativeTarget".into())),
                ("name", Value::String("App".into())),
                ("dependencies", ids(&[])),
                ("buildPhases", ids(&["PHASE000000000000000001"])),
            ]),
        );
        objects.insert(
            "PHASE000000000000000001".into(),
            record(&[
                ("isa", Value::String("PBXSourcesBuildPhase".into())),
                ("files", ids(&[])),
            ]),
        );
        objects.insert(
            "TARGET00000000000000002".into(),
            record(&[
                ("isa", Value::String("PBXNativeTarget".into())),
                ("name", Value::String("AppTests".into())),
                ("dependencies", ids(&["DEP00000000000000000001"])),
                ("buildPhases", ids(&[])),
            ]),
        );
        objects.insert(
            "DEP00000000000000000001".into(),
            record(&[
                ("isa", Value::String("PBXTargetDependency".into())),
                ("target", Value::String("TARGET00000000000000001".into())),
            ]),
        );

        let mut graph = Dictionary::new();
        graph.insert("archiveVersion".into(), Value::Integer(plist::Integer::from(1u64)));
        graph.insert("objectVersion".into(), Value::Integer(plist::Integer::from(56u64)));
        graph.insert("objects".into(), Value::Dictionary(objects));
        graph.insert("rootObject".into(), Value::String("PROJECT0000000000000001".into()));
        Value::Dictionary(graph)
    }

    #[test]
    fn roots_and_targets_enumerate_in_graph_order() -> anyhow::Result<()> {
        let model = PbxModel::from_graph(sample_graph());

        let roots = model.project_roots();
        assert_eq!(roots, vec![ObjectId::from("PROJECT0000000000000001")]);

        let targets = model.targets(&roots[0])?;
        assert_eq!(
            targets,
            vec![
                ObjectId::from("TARGET00000000000000001"),
                ObjectId::from("TARGET00000000000000002"),
            ]
        );

        Ok(())
    }

    #[test]
    fn dependencies_resolve_to_target_names() -> anyhow::Result<()> {
        let model = PbxModel::from_graph(sample_graph());

        let app = ObjectId::from("TARGET00000000000000001");
        assert_eq!(model.dependencies(&app)?, Vec::<String>::new());

        let tests = ObjectId::from("TARGET00000000000000002");
        assert_eq!(model.dependencies(&tests)?, vec!["App".to_string()]);

        Ok(())
    }

    #[test]
    fn stock_phases_fall_back_to_conventional_names() -> anyhow::Result<()> {
        let model = PbxModel::from_graph(sample_graph());

        let app = ObjectId::from("TARGET00000000000000001");
        assert_eq!(model.phase_names(&app)?, vec!["Sources".to_string()]);

        Ok(())
    }

    #[test]
    fn appended_phase_shows_up_with_reserved_name() -> anyhow::Result<()> {
        let mut model = PbxModel::from_graph(sample_graph());
        let app = ObjectId::from("TARGET00000000000000001");

        let phase = model.append_script_phase(&app, "XcodeProjectSortPhase", "exec true\n")?;
        assert_eq!(phase.as_str().len(), 24);
        assert_eq!(
            model.phase_names(&app)?,
            vec!["Sources".to_string(), "XcodeProjectSortPhase".to_string()]
        );

        Ok(())
    }

    #[test]
    fn appending_to_unknown_target_fails() {
        let mut model = PbxModel::from_graph(sample_graph());
        let ghost = ObjectId::from("GHOST000000000000000001");

        let result = model.append_script_phase(&ghost, "XcodeProjectSortPhase", "exec true\n");
        assert!(matches!(result, Err(DescriptorError::UnknownObject { .. })));
    }

    #[sealed_test]
    fn graph_survives_load_persist_round_trip() -> anyhow::Result<()> {
        fs::create_dir("App.xcodeproj")?;
        sample_graph().to_file_xml("App.xcodeproj/project.pbxproj")?;

        let mut model = PbxModel::load("App.xcodeproj")?;
        let app = ObjectId::from("TARGET00000000000000001");
        model.append_script_phase(&app, "XcodeProjectSortPhase", "exec true\n")?;
        model.persist(Path::new("App.xcodeproj"))?;

        let reloaded = PbxModel::load("App.xcodeproj")?;
        assert_eq!(
            reloaded.phase_names(&app)?,
            vec!["Sources".to_string(), "XcodeProjectSortPhase".to_string()]
        );

        // Untouched parts of the graph survive.
        let tests = ObjectId::from("TARGET00000000000000002");
        assert_eq!(reloaded.dependencies(&tests)?, vec!["App".to_string()]);

        Ok(())
    }
}
