//! Lifecycle hooks the orchestrator calls during a deploy.
//!
//! A static site has no process to start, stop or restart, so those hooks
//! do nothing. `finalize_update` rebuilds the site inside the new release
//! when the descriptor has a `[build]` section and does nothing otherwise.

use std::fmt;
use std::str::FromStr;

use shell_words::quote;

use crate::config::Build;
use crate::error::{Error, Result};
use crate::remote::Remote;
use crate::settings::{Role, RoleBinding, Settings};
use crate::term_print::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub enum Hook {
    Start,
    Stop,
    Restart,
    FinalizeUpdate,
}

impl Hook {
    pub const ALL: [Hook; 4] = [Hook::Start, Hook::Stop, Hook::Restart, Hook::FinalizeUpdate];

    pub fn name(self) -> &'static str {
        match self {
            Hook::Start => "start",
            Hook::Stop => "stop",
            Hook::Restart => "restart",
            Hook::FinalizeUpdate => "finalize_update",
        }
    }

    pub fn role(self) -> Role {
        Role::App
    }

    pub fn action(self, settings: &Settings) -> HookAction {
        self.action_for(&settings.build)
    }

    /// The action for a descriptor's `[build]` section, destination aside.
    pub fn action_for(self, build: &Option<Build>) -> HookAction {
        match (self, build) {
            (Hook::FinalizeUpdate, Some(build)) => HookAction::SiteBuild(SiteBuild::new(build)),
            _ => HookAction::Noop,
        }
    }
}

impl FromStr for Hook {
    type Err = Error;

    fn from_str(s: &str) -> Result<Hook> {
        let name = s.to_lowercase().replace('-', "_");
        Hook::ALL
            .iter()
            .copied()
            .find(|h| h.name() == name)
            .ok_or_else(|| Error::UnknownHook(s.to_owned()))
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum HookAction {
    Noop,
    SiteBuild(SiteBuild),
}

impl fmt::Display for HookAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HookAction::Noop => f.write_str("no-op"),
            HookAction::SiteBuild(build) => write!(
                f,
                "compile css with {} and generate with {}",
                build.css_compiler, build.site_generator
            ),
        }
    }
}

/// Regenerates the site's static assets in a release directory.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SiteBuild {
    profile: String,
    css_compiler: String,
    css_config: String,
    site_generator: String,
}

impl SiteBuild {
    pub fn new(build: &Build) -> SiteBuild {
        SiteBuild {
            profile: build.profile.clone(),
            css_compiler: build.css_compiler.clone(),
            css_config: build.css_config.clone(),
            site_generator: build.site_generator.clone(),
        }
    }

    /// The bash script run inside `release`.
    ///
    /// The profile is sourced unconditionally; the remaining steps are
    /// chained so either tool failing fails the script.
    pub fn script(&self, release: &str) -> String {
        format!(
            "source {}; cd {} && {} compile -c {} --force && {}",
            quote_home(&self.profile),
            quote(release),
            quote(&self.css_compiler),
            quote(&self.css_config),
            quote(&self.site_generator),
        )
    }

    pub fn command(&self, release: &str) -> String {
        format!("/bin/bash -c {}", quote(&self.script(release)))
    }
}

/// Quotes a path while leaving a leading `~/` to the remote shell.
fn quote_home(path: &str) -> String {
    if path.starts_with("~/") {
        format!("~/{}", quote(&path[2..]))
    } else {
        quote(path).into_owned()
    }
}

/// Runs `hook` for the release directory `release` on every host of its
/// role, opening each host through `connect`.
///
/// No-op hooks return before any host is contacted.
pub fn run<R, F>(hook: Hook, settings: &Settings, release: &str, mut connect: F) -> Result<()>
where
    R: Remote,
    F: FnMut(&RoleBinding) -> Result<R>,
{
    let build = match hook.action(settings) {
        HookAction::Noop => {
            term_println(color::BRIGHT_GREEN, hook.name(), "is a no-op");
            return Ok(());
        }
        HookAction::SiteBuild(build) => build,
    };

    // `cd ''` succeeds without moving, which would build in the login directory.
    if release.trim().is_empty() {
        return Err(Error::EmptyRelease);
    }

    let mut command = build.command(release);
    if settings.use_sudo {
        command = format!("sudo -u {} {}", quote(&settings.user), command);
    }

    for binding in settings.hosts(hook.role()) {
        term_println(
            color::YELLOW,
            "Executing",
            &format!("{} on {} ({})", hook, binding.host, binding.role),
        );
        let mut remote = connect(binding)?;
        remote.run(&command)?;
        term_println(
            color::BRIGHT_GREEN,
            "Finished",
            &format!("{} on {}", hook, binding.host),
        );
    }
    Ok(())
}
