//! Command-line flags and the optional YAML settings file.
//!
//! Every option can be given on the command line or in the file named by
//! `--config`; the command line wins, then the file, then the built-in
//! default. Relative paths in the file are resolved against the file's
//! directory.

use anonconf_core::adapters::DEFAULT_PORT;
use anonconf_core::collect::DEFAULT_SCHEMA;
use anonconf_core::{ClassificationPolicy, ConnectionConfig, IntrospectionTarget};
use anyhow::Context;
use clap::Parser;
use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_DATABASE: &str = "foreman";
const DEFAULT_USER: &str = "foreman";
const DEFAULT_PASSWORD: &str = "foreman";

#[derive(Parser, Debug)]
#[command(name = "anonconf")]
#[command(about = "Generate an Anonimatron XML configuration for a PostgreSQL database")]
#[command(version)]
#[command(long_about = "
anonconf - Anonimatron configuration generator

Reads the tables, columns and primary keys of a PostgreSQL schema, picks an
anonymizer for every column that should be scrambled and prints the matching
Anonimatron XML configuration on stdout.

Primary keys are never anonymized. Columns whose type has no anonymizer are
left out, and so are tables left without columns.

EXAMPLES:
  anonconf --host db.example.com --database foreman --user foreman > anonimatron.xml
  anonconf --config anonconf.yaml --policy policy.yaml --verbose
")]
pub(crate) struct Cli {
    /// YAML file with defaults for any of these options
    #[arg(short, long, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    /// Debug logging (implies --verbose)
    #[arg(short, long)]
    pub(crate) debug: bool,

    /// Informational logging
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Database host name [default: localhost]
    #[arg(long)]
    pub(crate) host: Option<String>,

    /// Database port [default: 5432]
    #[arg(long)]
    pub(crate) port: Option<u16>,

    /// Name of the database [default: foreman]
    #[arg(long)]
    pub(crate) database: Option<String>,

    /// Database user name [default: foreman]
    #[arg(long)]
    pub(crate) user: Option<String>,

    /// Database user password [default: foreman]
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,

    /// Schema to read tables from [default: public]
    #[arg(long)]
    pub(crate) schema: Option<String>,

    /// Only tables owned by this role [default: the --user value]
    #[arg(long)]
    pub(crate) owner: Option<String>,

    /// YAML classification policy replacing the built-in one
    #[arg(long, value_name = "FILE")]
    pub(crate) policy: Option<PathBuf>,

    /// Template replacing the built-in Anonimatron template
    #[arg(long, value_name = "FILE")]
    pub(crate) template: Option<PathBuf>,

    /// Write the configuration here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub(crate) output: Option<PathBuf>,
}

/// Contents of the `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileSettings {
    debug: bool,
    verbose: bool,
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    user: Option<String>,
    password: Option<String>,
    schema: Option<String>,
    owner: Option<String>,
    policy: Option<PathBuf>,
    template: Option<PathBuf>,
    output: Option<PathBuf>,
}

impl FileSettings {
    pub(crate) fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let mut settings: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;

        if let Some(base) = path.parent() {
            for file in [&mut settings.policy, &mut settings.template, &mut settings.output]
                .into_iter()
                .flatten()
            {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }

        Ok(settings)
    }
}

/// Fully resolved options for one run.
#[derive(Serialize)]
pub(crate) struct Settings {
    pub(crate) debug: bool,
    pub(crate) verbose: bool,
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) database: String,
    pub(crate) user: String,
    #[serde(serialize_with = "redacted")]
    password: Zeroizing<String>,
    pub(crate) schema: String,
    pub(crate) owner: String,
    pub(crate) policy: Option<PathBuf>,
    pub(crate) template: Option<PathBuf>,
    pub(crate) output: Option<PathBuf>,
}

fn redacted<S: Serializer>(_: &Zeroizing<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("****")
}

impl Settings {
    /// Reads the settings file named on the command line, if any, and
    /// merges it under the flags.
    pub(crate) fn load(cli: Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => FileSettings::from_yaml_file(path)?,
            None => FileSettings::default(),
        };
        Ok(Self::resolve(cli, file))
    }

    pub(crate) fn resolve(cli: Cli, file: FileSettings) -> Self {
        let user = cli
            .user
            .or(file.user)
            .unwrap_or_else(|| DEFAULT_USER.to_string());
        let owner = cli.owner.or(file.owner).unwrap_or_else(|| user.clone());

        Self {
            debug: cli.debug || file.debug,
            verbose: cli.verbose || file.verbose,
            host: cli
                .host
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            database: cli
                .database
                .or(file.database)
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            password: Zeroizing::new(
                cli.password
                    .or(file.password)
                    .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            ),
            schema: cli
                .schema
                .or(file.schema)
                .unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
            user,
            owner,
            policy: cli.policy.or(file.policy),
            template: cli.template.or(file.template),
            output: cli.output.or(file.output),
        }
    }

    pub(crate) fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(
            self.host.clone(),
            self.database.clone(),
            self.user.clone(),
            self.password.as_str(),
        )
        .with_port(self.port)
    }

    pub(crate) fn target(&self) -> IntrospectionTarget {
        IntrospectionTarget::new(self.owner.clone(), self.database.clone())
            .with_schema(self.schema.clone())
    }

    pub(crate) fn classification_policy(&self) -> anyhow::Result<ClassificationPolicy> {
        match &self.policy {
            Some(path) => Ok(ClassificationPolicy::from_yaml_file(path)?),
            None => Ok(ClassificationPolicy::builtin()),
        }
    }

    /// Settings as pretty JSON with the password masked, for debug logs.
    pub(crate) fn to_log_string(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!("<unserializable settings: {e}>"))
    }
}
