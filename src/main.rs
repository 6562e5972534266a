mod client;
mod config;
mod dn;
mod error;
mod logging;
mod mo;
mod normalize;
mod path;
mod query;
mod report;
mod session;
mod shell;

use crate::client::ApicUrl;
use crate::config::{Scope, save};
use crate::shell::Shell;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rustyline::DefaultEditor;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "acishell",
    version,
    about = "Interactive shell for read-only Cisco ACI APIC inventory queries"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "FQDN",
        help = "APIC host or URL (otherwise read from config or prompted)"
    )]
    apic: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Use this config file instead of the user/project config"
    )]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Do not verify the APIC TLS certificate")]
    insecure: bool,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Raise console log level (-v, -vv)")]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Persist shell settings to the chosen scope
    Configure {
        #[arg(long, value_name = "DIR", help = "Directory for exported reports")]
        report_dir: Option<PathBuf>,
        #[arg(long, value_name = "BOOL", help = "Verify the APIC TLS certificate")]
        verify_tls: Option<bool>,
        #[arg(
            long,
            value_enum,
            default_value_t = ScopeArg::User,
            help = "Where to write the config (local project dir or user config dir)"
        )]
        scope: ScopeArg,
    },
    /// Show the effective configuration
    ConfigShow,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScopeArg {
    Local,
    User,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Local => Scope::Local,
            ScopeArg::User => Scope::User,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("reading current directory")?;

    if let Some(Commands::Configure {
        report_dir,
        verify_tls,
        scope,
    }) = &cli.command
    {
        let mut existing = config::load_scope((*scope).into(), &cwd)?;
        if let Some(apic) = cli.apic.clone() {
            existing.apic = Some(apic);
        }
        if let Some(dir) = report_dir.clone() {
            existing.common.report_dir = Some(dir);
        }
        if let Some(verify) = verify_tls {
            existing.security.verify_tls = Some(*verify);
        }
        let path = save((*scope).into(), &existing, &cwd)?;
        println!("Saved configuration to {}", path.display());
        return Ok(());
    }

    let mut effective = config::resolve(&cwd, cli.config.as_deref(), cli.apic.clone())?;
    if cli.insecure {
        effective.security.verify_tls = false;
    }

    if let Some(Commands::ConfigShow) = cli.command {
        println!("{}", serde_yaml::to_string(&effective)?);
        return Ok(());
    }

    logging::init(&effective.logging, cli.verbose)?;
    if !effective.security.verify_tls {
        tracing::debug!("TLS certificate verification disabled");
    }

    let mut editor = DefaultEditor::new().context("initializing line editor")?;
    let host = match effective.apic.clone() {
        Some(host) => host,
        None => editor
            .readline("Enter APIC FQDN: ")
            .context("reading APIC FQDN")?,
    };
    let apic = ApicUrl::new(&host)?;
    tracing::debug!(%apic, "using APIC API root");

    Shell::interactive(apic, effective).run(&mut editor)
}
