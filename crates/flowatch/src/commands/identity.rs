//! `flowatch identity` — manage the encrypted identity vault.

use std::str::FromStr;
use std::time::Duration;

use color_eyre::eyre::{bail, Context};
use color_eyre::Result;
use dialoguer::{Input, Password};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use flowatch_core::{Identity, Provider};
use flowatch_snmp::{
    AuthProtocol, PrivProtocol, SnmpConnector, SnmpVersion, UdpConnector,
};

use crate::cli::IdentityCommand;

pub async fn run(command: IdentityCommand) -> Result<()> {
    match command {
        IdentityCommand::List => list(),
        IdentityCommand::Add => add(),
        IdentityCommand::Remove { name } => remove(name),
        IdentityCommand::Test { name, host, port } => test(name, host, port).await,
    }
}

#[derive(Tabled)]
struct IdentityRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Auth")]
    auth: String,
    #[tabled(rename = "Priv")]
    privacy: String,
}

fn list() -> Result<()> {
    let store = crate::commands::open_store()?;
    let summaries = store.list()?;

    if summaries.is_empty() {
        println!("No identities configured.");
        return Ok(());
    }

    let rows: Vec<IdentityRow> = summaries
        .into_iter()
        .map(|s| IdentityRow {
            name: s.name,
            version: s.version.to_string(),
            user: s.username.unwrap_or_default(),
            auth: s.auth_proto.map(|p| p.to_string()).unwrap_or_default(),
            privacy: s.priv_proto.map(|p| p.to_string()).unwrap_or_default(),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}

fn add() -> Result<()> {
    let name: String = Input::new()
        .with_prompt("Identity name")
        .interact_text()
        .context("reading identity name")?;
    if name.trim().is_empty() {
        bail!("identity name is required");
    }

    let version: String = Input::new()
        .with_prompt("SNMP version (1, 2c, 3)")
        .interact_text()?;
    let version = SnmpVersion::from_str(version.trim())?;

    let mut identity = Identity {
        name: name.trim().to_string(),
        version,
        community: String::new(),
        username: String::new(),
        auth_proto: None,
        auth_pass: String::new(),
        priv_proto: None,
        priv_pass: String::new(),
    };

    match version {
        SnmpVersion::V1 | SnmpVersion::V2c => {
            identity.community = Password::new()
                .with_prompt("Community string")
                .interact()?;
            if identity.community.is_empty() {
                bail!("community string is required for v1/v2c");
            }
        }
        SnmpVersion::V3 => {
            let username: String = Input::new().with_prompt("Username").interact_text()?;
            if username.trim().is_empty() {
                bail!("username is required for v3");
            }
            identity.username = username.trim().to_string();

            let auth: String = Input::new()
                .with_prompt("Auth protocol (none, MD5, SHA, SHA256, SHA512)")
                .default("none".into())
                .interact_text()?;
            if auth.trim() != "none" && !auth.trim().is_empty() {
                identity.auth_proto = Some(AuthProtocol::from_str(auth.trim())?);
                identity.auth_pass = Password::new().with_prompt("Auth password").interact()?;

                let privacy: String = Input::new()
                    .with_prompt("Privacy protocol (none, DES, AES128, AES192, AES256)")
                    .default("none".into())
                    .interact_text()?;
                if privacy.trim() != "none" && !privacy.trim().is_empty() {
                    identity.priv_proto = Some(PrivProtocol::from_str(privacy.trim())?);
                    identity.priv_pass =
                        Password::new().with_prompt("Privacy password").interact()?;
                }
            }
        }
    }

    let store = crate::commands::open_store()?;
    store.add(identity)?;
    println!("Identity '{name}' added.");
    Ok(())
}

fn remove(name: String) -> Result<()> {
    let store = crate::commands::open_store()?;
    store.remove(&name)?;
    println!("Identity '{name}' removed.");
    Ok(())
}

/// GET sysDescr.0 from the host using the named identity.
async fn test(name: String, host: String, port: u16) -> Result<()> {
    let store = crate::commands::open_store()?;
    let identity = store.get(&name)?;

    eprintln!("Testing SNMP connectivity to {host} using identity '{name}'...");

    let probe_host = host.clone();
    let descr = tokio::task::spawn_blocking(move || {
        let connector = UdpConnector::new();
        let mut session = connector.open(
            &probe_host,
            port,
            &identity.to_auth(),
            Duration::from_secs(10),
        )?;
        let descr = session.system_description();
        session.close();
        descr
    })
    .await??;

    println!("sysDescr: {descr}");
    println!("Connection test successful.");
    Ok(())
}
