// acishell - interactive shell for Cisco ACI APIC inventory queries
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! The interactive front end. Owns the session across commands and passes
//! it by reference into each query.

use crate::client::ApicUrl;
use crate::config::EffectiveConfig;
use crate::error::AciError;
use crate::path::{InterfaceId, NodeId, PodId};
use crate::query::{self, Query};
use crate::report::{self, ExportTarget};
use crate::session::{Session, SessionState};
use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Write};
use std::path::PathBuf;

pub const PROMPT: &str = ">>> ";
pub const INTRO: &str = "Welcome to the ACI shell\nPlease login with \"connect -u [username]\"";

#[derive(Parser, Debug)]
#[command(name = "acishell", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Connect to APIC
    Connect {
        #[arg(short, long, help = "User for APIC login")]
        username: String,
    },
    /// Disconnect from APIC
    Disconnect,
    /// Show connection state
    Status,
    /// Show all EPGs from all tenants
    ShowEpgAll {
        #[arg(short = 'e', long = "export", value_name = "FILENAME", help = "export report to file")]
        export: Option<String>,
    },
    /// Show interface status for fabric node
    ShowInterfaceStatus {
        #[arg(short = 'p', long = "pod-id", help = "POD-ID")]
        pod: PodId,
        #[arg(short = 'n', long = "node-id", help = "Node-ID")]
        node: NodeId,
        #[arg(short = 'e', long = "export", value_name = "FILENAME", help = "export report to file")]
        export: Option<String>,
    },
    /// Show EPGs deployed on a fabric node interface
    ShowInterfaceEpg {
        #[arg(short = 'p', long = "pod-id", help = "POD-ID")]
        pod: PodId,
        #[arg(short = 'n', long = "node-id", help = "Node-ID")]
        node: NodeId,
        #[arg(short = 'i', long = "interface", help = "Interface, e.g. eth1/1")]
        interface: InterfaceId,
        #[arg(short = 'e', long = "export", value_name = "FILENAME", help = "export report to file")]
        export: Option<String>,
    },
    /// Leave the shell (logs out first when connected)
    #[command(alias = "quit")]
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

type PasswordPrompt = Box<dyn FnMut(&str) -> io::Result<String>>;

pub struct Shell<W: Write> {
    apic: ApicUrl,
    config: EffectiveConfig,
    state: SessionState,
    password: PasswordPrompt,
    out: W,
}

impl Shell<io::Stdout> {
    pub fn interactive(apic: ApicUrl, config: EffectiveConfig) -> Self {
        Shell::new(
            apic,
            config,
            Box::new(|prompt: &str| rpassword::prompt_password(prompt)),
            io::stdout(),
        )
    }
}

impl<W: Write> Shell<W> {
    pub fn new(apic: ApicUrl, config: EffectiveConfig, password: PasswordPrompt, out: W) -> Self {
        Self {
            apic,
            config,
            state: SessionState::Disconnected,
            password,
            out,
        }
    }

    pub fn run(&mut self, editor: &mut DefaultEditor) -> Result<()> {
        writeln!(self.out, "{INTRO}")?;
        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if let Err(err) = editor.add_history_entry(line.as_str()) {
                        tracing::debug!("could not record history entry: {err}");
                    }
                    if self.execute(&line)? == Flow::Exit {
                        return Ok(());
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    self.execute("exit")?;
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Runs one command line. Command failures are reported to the user and
    /// logged; only output failures are returned.
    pub fn execute(&mut self, line: &str) -> Result<Flow> {
        let parsed = match ShellLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed,
            Err(err) => {
                write!(self.out, "{}", err.render())?;
                return Ok(Flow::Continue);
            }
        };

        let exiting = matches!(parsed.command, ShellCommand::Exit);
        if let Err(err) = self.dispatch(parsed.command) {
            self.report_failure(&err)?;
        }
        Ok(if exiting { Flow::Exit } else { Flow::Continue })
    }

    #[cfg(test)]
    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    #[cfg(test)]
    fn output(&self) -> &W {
        &self.out
    }

    fn dispatch(&mut self, command: ShellCommand) -> Result<()> {
        match command {
            ShellCommand::Connect { username } => self.connect(&username),
            ShellCommand::Disconnect => self.disconnect(),
            ShellCommand::Status => {
                match &self.state {
                    SessionState::Connected(session) => writeln!(
                        self.out,
                        "Connected to {} as {}",
                        session.base_url(),
                        session.username()
                    )?,
                    SessionState::Disconnected => {
                        writeln!(self.out, "Not connected (APIC URL: {})", self.apic)?
                    }
                }
                Ok(())
            }
            ShellCommand::ShowEpgAll { export } => self.show(Query::EpgAll, export),
            ShellCommand::ShowInterfaceStatus { pod, node, export } => {
                self.show(Query::InterfaceStatus { pod, node }, export)
            }
            ShellCommand::ShowInterfaceEpg {
                pod,
                node,
                interface,
                export,
            } => self.show(
                Query::InterfaceEpg {
                    pod,
                    node,
                    interface,
                },
                export,
            ),
            ShellCommand::Exit => {
                if self.state.is_connected() {
                    self.disconnect()?;
                }
                Ok(())
            }
        }
    }

    fn connect(&mut self, username: &str) -> Result<()> {
        if let SessionState::Connected(session) = &self.state {
            return Err(anyhow!(
                "already connected as {}; run \"disconnect\" first",
                session.username()
            ));
        }
        writeln!(self.out, "APIC URL: {}", self.apic)?;
        let password = (self.password)(&format!("Enter password for user {username}: "))?;
        let session = Session::login(
            self.apic.clone(),
            self.config.http_settings(),
            username,
            &password,
        )?;
        writeln!(self.out, "Connected to APIC as {username}")?;
        self.state = SessionState::Connected(session);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.state.require()?;
        let session = self.state.take().ok_or(AciError::Precondition)?;
        writeln!(self.out, "APIC URL: {}", session.base_url())?;
        session.logout()?;
        writeln!(self.out, "Disconnected from APIC")?;
        Ok(())
    }

    fn show(&mut self, query: Query, export: Option<String>) -> Result<()> {
        let session = self.state.require()?;
        let table = query::run(session, &query)?;
        write!(self.out, "{}", report::render(&table))?;

        if let Some(filename) = export {
            let target = ExportTarget::new(self.report_dir().join(filename), &query.sheet_name());
            report::export(&table, &target)?;
            writeln!(
                self.out,
                "Report exported to {} (sheet {})",
                target.path.display(),
                target.sheet
            )?;
        }
        Ok(())
    }

    fn report_dir(&self) -> PathBuf {
        self.config
            .get("common", "report_dir")
            .map(PathBuf::from)
            .unwrap_or_default()
    }

    fn report_failure(&mut self, err: &anyhow::Error) -> Result<()> {
        match err.downcast_ref::<AciError>() {
            Some(AciError::Precondition) => writeln!(self.out, "{err}")?,
            Some(aci) if aci.is_remote() => {
                tracing::error!("{err:#}");
                writeln!(self.out, "Error: {err}")?;
            }
            _ => {
                tracing::warn!("{err:#}");
                writeln!(self.out, "Error: {err}")?;
            }
        }
        Ok(())
    }
}
