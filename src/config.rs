use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "Deploy.toml";

const DEFAULT_BRANCH: &str = "master";
const DEFAULT_SSH_PORT: u16 = 22;
const DEFAULT_PROFILE: &str = "~/.bash_profile";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scm {
    Git,
}

impl Default for Scm {
    fn default() -> Self {
        Scm::Git
    }
}

impl fmt::Display for Scm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scm::Git => f.write_str("git"),
        }
    }
}

/// How the release reaches the host: `copy` ships a locally built archive.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployVia {
    Copy,
}

impl Default for DeployVia {
    fn default() -> Self {
        DeployVia::Copy
    }
}

impl fmt::Display for DeployVia {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeployVia::Copy => f.write_str("copy"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Gzip,
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Gzip
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Compression::Gzip => f.write_str("gzip"),
        }
    }
}

#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Deserialize)]
pub struct Application {
    pub name: String,
    pub repository: String,
    #[serde(default)]
    pub scm: Scm,
    #[serde(default)]
    pub deploy_via: DeployVia,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub copy_compression: Compression,
    #[serde(default)]
    pub use_sudo: bool,
}

#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Deserialize)]
pub struct Server {
    pub host: String,
    pub user: String,
    pub group: Option<String>,
    /// Roles bound to `host`. All of `web`, `app` and `db` when absent.
    pub roles: Option<Vec<String>>,
    /// The role marked primary. `db` when absent.
    pub primary: Option<String>,
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Deserialize)]
pub struct SshOptions {
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub forward_agent: bool,
}

impl Default for SshOptions {
    fn default() -> Self {
        SshOptions {
            port: DEFAULT_SSH_PORT,
            forward_agent: true,
        }
    }
}

/// Tools `finalize_update` runs inside the new release.
///
/// Both tools are addressed by absolute path: a non-interactive remote
/// shell does not pick up the search path an interactive profile sets.
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Deserialize)]
pub struct Build {
    #[serde(default = "default_profile")]
    pub profile: String,
    pub css_compiler: String,
    pub css_config: String,
    pub site_generator: String,
}

#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Deserialize)]
pub struct DeployConfig {
    pub application: Application,
    pub server: Server,
    #[serde(default)]
    pub ssh: SshOptions,
    pub build: Option<Build>,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_owned()
}

fn default_ssh_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_true() -> bool {
    true
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_owned()
}

pub fn parse(path: &Path, text: &str) -> Result<DeployConfig> {
    toml::de::from_str::<DeployConfig>(text).map_err(|source| Error::ConfigParse {
        path: path.to_owned(),
        source,
    })
}

pub fn load(path: &Path) -> Result<DeployConfig> {
    let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_owned(),
        source,
    })?;
    parse(path, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    const MINIMAL: &str = r#"
[application]
name = "zacstewart.com"
repository = "git@github.com:zacstewart/zacstewart.com.git"

[server]
host = "zacstewart.com"
user = "zacstewart"
"#;

    #[test]
    fn minimal_descriptor_gets_defaults() {
        let config = parse(&PathBuf::from(CONFIG_FILE_NAME), MINIMAL).unwrap();

        assert_eq!(config.application.scm, Scm::Git);
        assert_eq!(config.application.deploy_via, DeployVia::Copy);
        assert_eq!(config.application.copy_compression, Compression::Gzip);
        assert_eq!(config.application.branch, "master");
        assert!(!config.application.use_sudo);
        assert_eq!(config.ssh.port, 22);
        assert!(config.ssh.forward_agent);
        assert_eq!(config.server.group, None);
        assert_eq!(config.build, None);
    }

    #[test]
    fn build_section_defaults_profile() {
        let text = format!(
            "{}\n[build]\ncss_compiler = \"/opt/bin/compass\"\ncss_config = \"config_prod.rb\"\nsite_generator = \"/opt/bin/jekyll\"\n",
            MINIMAL
        );
        let config = parse(&PathBuf::from(CONFIG_FILE_NAME), &text).unwrap();
        let build = config.build.unwrap();

        assert_eq!(build.profile, "~/.bash_profile");
        assert_eq!(build.css_config, "config_prod.rb");
    }

    #[test]
    fn unsupported_scm_is_rejected() {
        let text = MINIMAL.replace(
            "[server]",
            "scm = \"svn\"\n\n[server]",
        );
        let err = parse(&PathBuf::from(CONFIG_FILE_NAME), &text).unwrap_err();

        match err {
            Error::ConfigParse { .. } => {}
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn load_reads_descriptor_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.server.host, "zacstewart.com");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join(CONFIG_FILE_NAME)).unwrap_err();

        match err {
            Error::ConfigRead { path, .. } => assert!(path.ends_with(CONFIG_FILE_NAME)),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
