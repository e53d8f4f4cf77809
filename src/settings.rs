//! Resolution of the descriptor into the settings of one deploy run.
//!
//! Settings are built once, before any remote action, and are read-only
//! afterwards. The only interactive input is the destination.

use std::fmt;
use std::str::FromStr;

use crate::config::{Build, Compression, DeployConfig, DeployVia, Scm, SshOptions};
use crate::error::{Error, Result};
use crate::prompt::Prompt;

pub const DESTINATION_PROMPT: &str = "Destination: ";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Destination {
    Dev,
    Www,
}

impl Destination {
    /// Matches the operator answer exactly. Anything but `dev` or `www`
    /// leaves the destination unset.
    pub fn from_answer(answer: &str) -> Option<Destination> {
        match answer {
            "dev" => Some(Destination::Dev),
            "www" => Some(Destination::Www),
            _ => None,
        }
    }

    pub fn deploy_to(self, user: &str, application: &str) -> String {
        match self {
            Destination::Dev => format!("/home/{}/dev.{}", user, application),
            Destination::Www => format!("/home/{}/{}", user, application),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Destination::Dev => f.write_str("dev"),
            Destination::Www => f.write_str("www"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub enum Role {
    Web,
    App,
    Db,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Web, Role::App, Role::Db];

    pub fn name(self) -> &'static str {
        match self {
            Role::Web => "web",
            Role::App => "app",
            Role::Db => "db",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Role> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.name() == s.to_lowercase())
            .ok_or_else(|| Error::UnknownRole(s.to_owned()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RoleBinding {
    pub role: Role,
    pub host: String,
    pub primary: bool,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Settings {
    pub application: String,
    pub repository: String,
    pub scm: Scm,
    pub deploy_via: DeployVia,
    pub branch: String,
    pub copy_compression: Compression,
    pub use_sudo: bool,
    pub host: String,
    pub user: String,
    pub group: String,
    pub ssh: SshOptions,
    pub destination: Destination,
    pub deploy_to: String,
    pub roles: Vec<RoleBinding>,
    pub build: Option<Build>,
}

impl Settings {
    /// Resolves `config` into settings.
    ///
    /// `destination` comes from the command line; when absent the operator
    /// is asked through `prompt`.
    pub fn resolve(
        config: &DeployConfig,
        destination: Option<&str>,
        prompt: &mut dyn Prompt,
    ) -> Result<Settings> {
        let answer = match destination {
            Some(d) => d.to_owned(),
            None => prompt.ask(DESTINATION_PROMPT).map_err(Error::Prompt)?,
        };
        let destination =
            Destination::from_answer(&answer).ok_or_else(|| Error::UnknownDestination(answer))?;

        let application = &config.application;
        let server = &config.server;

        Ok(Settings {
            application: application.name.clone(),
            repository: application.repository.clone(),
            scm: application.scm,
            deploy_via: application.deploy_via,
            branch: application.branch.clone(),
            copy_compression: application.copy_compression,
            use_sudo: application.use_sudo,
            host: server.host.clone(),
            user: server.user.clone(),
            group: server.group.clone().unwrap_or_else(|| server.user.clone()),
            ssh: config.ssh.clone(),
            destination,
            deploy_to: destination.deploy_to(&server.user, &application.name),
            roles: role_bindings(server.host.as_str(), &server.roles, &server.primary)?,
            build: config.build.clone(),
        })
    }

    pub fn hosts(&self, role: Role) -> impl Iterator<Item = &RoleBinding> {
        self.roles.iter().filter(move |b| b.role == role)
    }

    /// Name/value pairs in descriptor order, for display.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            ("application", self.application.clone()),
            ("repository", self.repository.clone()),
            ("scm", self.scm.to_string()),
            ("deploy_via", self.deploy_via.to_string()),
            ("branch", self.branch.clone()),
            ("copy_compression", self.copy_compression.to_string()),
            ("use_sudo", self.use_sudo.to_string()),
            ("host", self.host.clone()),
            ("user", self.user.clone()),
            ("group", self.group.clone()),
            ("ssh.port", self.ssh.port.to_string()),
            ("ssh.forward_agent", self.ssh.forward_agent.to_string()),
            ("destination", self.destination.to_string()),
            ("deploy_to", self.deploy_to.clone()),
        ];
        for binding in &self.roles {
            let mut value = binding.host.clone();
            if binding.primary {
                value.push_str(" (primary)");
            }
            entries.push((binding.role.name(), value));
        }
        entries
    }
}

fn role_bindings(
    host: &str,
    roles: &Option<Vec<String>>,
    primary: &Option<String>,
) -> Result<Vec<RoleBinding>> {
    let roles = match roles {
        Some(names) => names
            .iter()
            .map(|n| n.parse())
            .collect::<Result<Vec<Role>>>()?,
        None => Role::ALL.to_vec(),
    };
    let primary = match primary {
        Some(name) => name.parse()?,
        None => Role::Db,
    };

    Ok(roles
        .into_iter()
        .map(|role| RoleBinding {
            role,
            host: host.to_owned(),
            primary: role == primary,
        })
        .collect())
}
