//! `flowatch discover` — walk a device's interface table.

use color_eyre::Result;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use flowatch_core::{discover_interfaces, Provider};
use flowatch_snmp::UdpConnector;

use crate::output::{format_speed, truncate};

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Index")]
    index: u32,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Alias")]
    alias: String,
}

pub async fn run(host: String, identity: String, port: u16) -> Result<()> {
    let store = crate::commands::open_store()?;
    let id = store.get(&identity)?;

    eprintln!("Discovering interfaces on {host}...");

    let probe_host = host.clone();
    let interfaces = tokio::task::spawn_blocking(move || {
        let connector = UdpConnector::new();
        discover_interfaces(&connector, &probe_host, port, &id)
    })
    .await??;

    if interfaces.is_empty() {
        println!("No interfaces found.");
        return Ok(());
    }

    println!("Found {} interfaces on {host}:\n", interfaces.len());

    let rows: Vec<InterfaceRow> = interfaces
        .iter()
        .map(|iface| InterfaceRow {
            index: iface.if_index,
            status: iface.status.to_string(),
            name: truncate(&iface.name, 30),
            description: truncate(&iface.description, 40),
            speed: format_speed(iface.speed_mbps),
            alias: iface.alias.clone(),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}
