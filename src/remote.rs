use crate::error::Result;

/// A shell on a deploy host.
pub trait Remote {
    /// Runs `command` in one remote shell session. A non-zero exit status
    /// is an error.
    fn run(&mut self, command: &str) -> Result<()>;
}

#[cfg(feature = "ssh")]
pub use self::ssh::SshRemote;

#[cfg(feature = "ssh")]
mod ssh {
    use std::io::Read;
    use std::net::TcpStream;

    use rpassword::read_password;
    use ssh2::{ExtendedData, Session};

    use super::Remote;
    use crate::config::SshOptions;
    use crate::error::{Error, Result};
    use crate::term_print::*;

    const SSH_LABEL: &str = "[ssh]";
    const PASSWORD_ATTEMPTS: usize = 3;

    pub struct SshRemote {
        session: Session,
        host: String,
        forward_agent: bool,
    }

    impl SshRemote {
        pub fn connect(host: &str, user: &str, options: &SshOptions) -> Result<SshRemote> {
            term_println(
                color::WHITE,
                SSH_LABEL,
                &format!("Connecting to {}:{}", host, options.port),
            );
            let tcp = TcpStream::connect((host, options.port)).map_err(|source| Error::Connect {
                host: host.to_owned(),
                source,
            })?;
            let mut session = Session::new().map_err(|e| Error::transport(host, e))?;
            session.set_tcp_stream(tcp);
            session.handshake().map_err(|e| Error::transport(host, e))?;

            authenticate(&session, host, user)?;

            Ok(SshRemote {
                session,
                host: host.to_owned(),
                forward_agent: options.forward_agent,
            })
        }
    }

    /// Tries the local agent first, then up to three passwords.
    fn authenticate(session: &Session, host: &str, user: &str) -> Result<()> {
        term_println(color::WHITE, SSH_LABEL, "Authorizing with ssh-agent...");
        if session.userauth_agent(user).is_ok() && session.authenticated() {
            return Ok(());
        }
        term_println(
            color::YELLOW,
            SSH_LABEL,
            "Agent authentication failed, falling back to password.",
        );

        for attempt in 1..=PASSWORD_ATTEMPTS {
            let last = attempt == PASSWORD_ATTEMPTS;
            term_print(
                color::WHITE,
                SSH_LABEL,
                &format!("Password for {}@{}: ", user, host),
            );
            let password = read_password().map_err(Error::Prompt)?;

            if password.is_empty() {
                if last {
                    break;
                }
                term_println(color::YELLOW, SSH_LABEL, "Password can not be empty.");
                continue;
            }

            term_println(color::WHITE, SSH_LABEL, "Authorizing...");
            match session.userauth_password(user, &password) {
                Ok(()) => return Ok(()),
                Err(e) if last => {
                    return Err(Error::Auth {
                        user: user.to_owned(),
                        host: host.to_owned(),
                        reason: e.to_string(),
                    })
                }
                Err(e) => term_println(color::RED, SSH_LABEL, &e.to_string()),
            }
        }

        Err(Error::Auth {
            user: user.to_owned(),
            host: host.to_owned(),
            reason: "password can not be empty".to_owned(),
        })
    }

    impl Remote for SshRemote {
        fn run(&mut self, command: &str) -> Result<()> {
            let host = self.host.as_str();
            let mut channel = self
                .session
                .channel_session()
                .map_err(|e| Error::transport(host, e))?;

            // The remote side authenticates with the operator's keys, never
            // with a key stored on the host.
            if self.forward_agent {
                channel
                    .request_auth_agent_forwarding()
                    .map_err(|e| Error::transport(host, e))?;
            }
            channel
                .handle_extended_data(ExtendedData::Merge)
                .map_err(|e| Error::transport(host, e))?;

            term_println(
                color::WHITE,
                SSH_LABEL,
                &format!("Executing on {}: {}", host, command),
            );
            channel.exec(command).map_err(|e| Error::transport(host, e))?;

            let mut output = String::new();
            channel
                .read_to_string(&mut output)
                .map_err(|e| Error::transport(host, e))?;
            if !output.is_empty() {
                term_print(color::WHITE, &format!("{} ({}):", SSH_LABEL, host), &output);
            }

            channel.wait_close().map_err(|e| Error::transport(host, e))?;
            let status = channel.exit_status().map_err(|e| Error::transport(host, e))?;
            if status != 0 {
                return Err(Error::RemoteCommand {
                    host: host.to_owned(),
                    command: command.to_owned(),
                    status,
                });
            }
            Ok(())
        }
    }
}
