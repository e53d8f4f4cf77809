#[macro_use]
extern crate clap;

mod config;
mod error;
mod hooks;
mod prompt;
mod remote;
mod settings;
mod term_print;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use std::panic;
use std::path::Path;
use std::process;

use crate::error::Result;
use crate::hooks::Hook;
use crate::prompt::TermPrompt;
use crate::settings::{RoleBinding, Settings};
use crate::term_print::*;

const COMMAND_NAME: &str = "site-cook";
const COMMAND_DESCRIPTION: &str = "Deploys a static site and runs its lifecycle hooks over ssh.";

fn main() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info.payload();
        let message = payload
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| payload.downcast_ref::<&str>().copied())
            .unwrap_or("panicked");
        term_panic(message);
    }));

    let matches = app().get_matches();
    if let Err(e) = cook(&matches) {
        term_panic(&e.to_string());
        process::exit(1);
    }
}

fn app() -> App<'static, 'static> {
    let destination = Arg::with_name("destination")
        .short("d")
        .long("destination")
        .takes_value(true)
        .value_name("DESTINATION")
        .help("dev or www; asked interactively when omitted");

    App::new(COMMAND_NAME)
        .about(COMMAND_DESCRIPTION)
        .version(crate_version!())
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .value_name("FILE")
                .default_value(config::CONFIG_FILE_NAME)
                .help("Deployment descriptor"),
        )
        .subcommand(
            SubCommand::with_name("settings")
                .about("Resolves and prints the deployment settings")
                .arg(destination.clone()),
        )
        .subcommand(SubCommand::with_name("hooks").about("Lists the lifecycle hooks"))
        .subcommand(
            SubCommand::with_name("hook")
                .about("Runs a lifecycle hook for a release")
                .arg(
                    Arg::with_name("name")
                        .required(true)
                        .index(1)
                        .help("start, stop, restart or finalize_update"),
                )
                .arg(
                    Arg::with_name("release")
                        .short("r")
                        .long("release")
                        .takes_value(true)
                        .value_name("DIR")
                        .required(true)
                        .empty_values(false)
                        .help("Release directory on the remote host"),
                )
                .arg(
                    Arg::with_name("dry-run")
                        .long("dry-run")
                        .help("Prints the remote command instead of running it"),
                )
                .arg(destination),
        )
        .settings(&[AppSettings::SubcommandRequired])
}

fn cook(matches: &ArgMatches) -> Result<()> {
    let config_path = Path::new(matches.value_of("config").unwrap_or(config::CONFIG_FILE_NAME));

    match matches.subcommand() {
        ("settings", Some(sub)) => {
            let settings = resolve(config_path, sub)?;
            for (name, value) in settings.entries() {
                term_println(color::BRIGHT_GREEN, name, &value);
            }
            Ok(())
        }
        ("hooks", Some(_)) => {
            let config = config::load(config_path)?;
            for hook in Hook::ALL.iter() {
                let action = hook.action_for(&config.build);
                term_println(
                    color::BRIGHT_GREEN,
                    hook.name(),
                    &format!("{} (role {})", action, hook.role()),
                );
            }
            Ok(())
        }
        ("hook", Some(sub)) => {
            let hook: Hook = sub.value_of("name").unwrap_or_default().parse()?;
            let release = sub.value_of("release").unwrap_or_default();
            let settings = resolve(config_path, sub)?;

            if sub.is_present("dry-run") {
                term_println(color::YELLOW, "Hook", &format!("{}: {}", hook, hook.action(&settings)));
                if let hooks::HookAction::SiteBuild(build) = hook.action(&settings) {
                    term_println(color::WHITE, "Command", &build.command(release));
                }
                return Ok(());
            }

            hooks::run(hook, &settings, release, |binding| connect(binding, &settings))
        }
        _ => unreachable!("clap enforces a subcommand"),
    }
}

fn resolve(config_path: &Path, matches: &ArgMatches) -> Result<Settings> {
    let config = config::load(config_path)?;
    Settings::resolve(&config, matches.value_of("destination"), &mut TermPrompt)
}

#[cfg(feature = "ssh")]
fn connect(binding: &RoleBinding, settings: &Settings) -> Result<remote::SshRemote> {
    remote::SshRemote::connect(&binding.host, &settings.user, &settings.ssh)
}

#[cfg(not(feature = "ssh"))]
fn connect(_binding: &RoleBinding, _settings: &Settings) -> Result<NoTransport> {
    Err(error::Error::TransportUnavailable)
}

#[cfg(not(feature = "ssh"))]
enum NoTransport {}

#[cfg(not(feature = "ssh"))]
impl remote::Remote for NoTransport {
    fn run(&mut self, _command: &str) -> Result<()> {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_requires_release() {
        let result = app().get_matches_from_safe(vec![COMMAND_NAME, "hook", "finalize_update"]);
        assert!(result.is_err());
    }

    #[test]
    fn hook_arguments_parse() {
        let matches = app()
            .get_matches_from_safe(vec![
                COMMAND_NAME,
                "--config",
                "site/Deploy.toml",
                "hook",
                "finalize_update",
                "--release",
                "/home/zacstewart/zacstewart.com/releases/1",
                "-d",
                "www",
                "--dry-run",
            ])
            .unwrap();

        assert_eq!(matches.value_of("config"), Some("site/Deploy.toml"));
        let (name, sub) = matches.subcommand();
        let sub = sub.unwrap();
        assert_eq!(name, "hook");
        assert_eq!(sub.value_of("name"), Some("finalize_update"));
        assert_eq!(sub.value_of("destination"), Some("www"));
        assert!(sub.is_present("dry-run"));
    }

    #[test]
    fn hook_rejects_empty_release() {
        let result = app().get_matches_from_safe(vec![
            COMMAND_NAME,
            "hook",
            "finalize_update",
            "--release",
            "",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn config_defaults_to_deploy_toml() {
        let matches = app()
            .get_matches_from_safe(vec![COMMAND_NAME, "hooks"])
            .unwrap();
        assert_eq!(matches.value_of("config"), Some("Deploy.toml"));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(app().get_matches_from_safe(vec![COMMAND_NAME]).is_err());
    }
}
