// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use anyhow::Result;
use plist::{Dictionary, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Builds descriptor bundles on disk for integration runs.
///
/// Object identifiers are minted deterministically so fixtures stay readable
/// in assertion failures.
pub(crate) struct DescriptorFixture {
    objects: Dictionary,
    targets: Vec<String>,
    rooted: bool,
    counter: u64,
}

impl DescriptorFixture {
    pub(crate) fn new() -> Self {
        Self {
            objects: Dictionary::new(),
            targets: Vec::new(),
            rooted: true,
            counter: 0,
        }
    }

    /// Fixture whose graph carries no project root object.
    pub(crate) fn without_root() -> Self {
        Self {
            rooted: false,
            ..Self::new()
        }
    }

    pub(crate) fn add_target(&mut self, name: &str) -> String {
        let id = self.mint();
        let mut record = Dictionary::new();
        record.insert("isa".into(), Value::String("PBXNativeTarget".into()));
        record.insert("name".into(), Value::String(name.into()));
        record.insert("dependencies".into(), Value::Array(Vec::new()));
        record.insert("buildPhases".into(), Value::Array(Vec::new()));
        self.objects.insert(id.clone(), Value::Dictionary(record));
        self.targets.push(id.clone());
        id
    }

    /// Make `from` depend on the target `on`.
    pub(crate) fn add_dependency(&mut self, from: &str, on: &str) {
        let id = self.mint();
        let mut record = Dictionary::new();
        record.insert("isa".into(), Value::String("PBXTargetDependency".into()));
        record.insert("target".into(), Value::String(on.into()));
        self.objects.insert(id.clone(), Value::Dictionary(record));

        self.push_id(from, "dependencies", &id);
    }

    pub(crate) fn add_script_phase(&mut self, target: &str, phase_name: &str) {
        let id = self.mint();
        let mut record = Dictionary::new();
        record.insert("isa".into(), Value::String("PBXShellScriptBuildPhase".into()));
        record.insert("name".into(), Value::String(phase_name.into()));
        record.insert("shellPath".into(), Value::String("/bin/sh".into()));
        record.insert("shellScript".into(), Value::String("exec true\n".into()));
        self.objects.insert(id.clone(), Value::Dictionary(record));

        self.push_id(target, "buildPhases", &id);
    }

    /// List the same target twice in the project's target sequence.
    pub(crate) fn duplicate_target_entry(&mut self, target: &str) {
        self.targets.push(target.into());
    }

    /// Write the descriptor bundle and return its path.
    pub(crate) fn write(&self, descriptor: impl AsRef<Path>) -> Result<PathBuf> {
        let descriptor = descriptor.as_ref().to_path_buf();

        let mut objects = self.objects.clone();
        if self.rooted {
            let mut record = Dictionary::new();
            record.insert("isa".into(), Value::String("PBXProject".into()));
            record.insert(
                "targets".into(),
                Value::Array(
                    self.targets
                        .iter()
                        .map(|id| Value::String(id.clone()))
                        .collect(),
                ),
            );
            objects.insert("PROJECTROOT000000000001".into(), Value::Dictionary(record));
        }

        let mut graph = Dictionary::new();
        graph.insert("archiveVersion".into(), Value::Integer(plist::Integer::from(1u64)));
        graph.insert("objectVersion".into(), Value::Integer(plist::Integer::from(56u64)));
        graph.insert("objects".into(), Value::Dictionary(objects));
        graph.insert(
            "rootObject".into(),
            Value::String("PROJECTROOT000000000001".into()),
        );

        fs::create_dir_all(&descriptor)?;
        Value::Dictionary(graph).to_file_xml(descriptor.join("project.pbxproj"))?;

        Ok(descriptor)
    }

    fn mint(&mut self) -> String {
        self.counter += 1;
        format!("{:024X}", self.counter)
    }

    fn push_id(&mut self, object: &str, field: &str, id: &str) {
        let record = self
            .objects
            .get_mut(object)
            .and_then(Value::as_dictionary_mut)
            .expect("fixture object exists");
        if record.get(field).is_none() {
            record.insert(field.to_string(), Value::Array(Vec::new()));
        }
        record
            .get_mut(field)
            .and_then(Value::as_array_mut)
            .expect("fixture field is a list")
            .push(Value::String(id.into()));
    }
}
