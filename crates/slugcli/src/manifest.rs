//! Declaring a program from JSON instead of code.
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "name": "Device Tool",
//!   "options": [{ "flags": "-c, --config <path>", "default": "devtool.json" }],
//!   "commands": [{ "syntax": "tcp <port>", "description": "capture TCP packets" }]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use slugcli_argparse::{DeclError, OptionDecl};

use crate::program::Program;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Registers a `version` command when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionManifest>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandManifest>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<TopicManifest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionManifest {
    pub flags: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Environment variable consulted when the flag is absent from argv.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandManifest {
    pub syntax: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionManifest>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicManifest {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl ProgramManifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("failed to load manifest: {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let manifest: Self =
            serde_json::from_str(contents).context("failed to parse manifest JSON")?;
        if let Some(version) = manifest.schema_version {
            if version != SCHEMA_VERSION {
                bail!("unsupported schemaVersion {version} (expected {SCHEMA_VERSION})");
            }
        }
        Ok(manifest)
    }
}

impl OptionManifest {
    fn to_decl(&self) -> Result<OptionDecl, DeclError> {
        let mut decl = OptionDecl::parse(&self.flags, &self.description)?;
        if let Some(default) = &self.default {
            decl = decl.with_default(default);
        }
        if let Some(env) = &self.env {
            decl = decl.with_env(env);
        }
        Ok(decl)
    }
}

impl Program {
    /// Build a program from a manifest. Actions are attached afterwards with
    /// [`Program::action`].
    pub fn from_manifest(manifest: &ProgramManifest) -> Result<Self, DeclError> {
        let mut program = Program::new();
        program
            .set_name(manifest.name.as_str())
            .set_description(manifest.description.as_str());
        if let Some(version) = &manifest.version {
            program.version(version.as_str());
        }

        for option in &manifest.options {
            program.option_decl(option.to_decl()?)?;
        }

        for command in &manifest.commands {
            let builder = program
                .command(&command.syntax, &command.description)?
                .body(&command.body);
            command
                .options
                .iter()
                .try_fold(builder, |builder, option| builder.option_decl(option.to_decl()?))?;
        }

        for topic in &manifest.topics {
            program
                .topic(&topic.name, &topic.description)
                .set_body(topic.body.as_str());
        }

        tracing::debug!(
            commands = manifest.commands.len(),
            options = manifest.options.len(),
            "program loaded from manifest"
        );
        Ok(program)
    }
}
