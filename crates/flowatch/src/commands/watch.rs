//! `flowatch watch` — run one dashboard and stream rates to the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::eyre::Context;
use color_eyre::Result;

use flowatch_core::{Event, Provider, SessionManager};
use flowatch_snmp::UdpConnector;

use crate::output::{format_bps, truncate};

pub async fn run(dashboard: String) -> Result<()> {
    let path = resolve_dashboard_path(&dashboard);
    let dash = flowatch_config::load_dashboard(&path)
        .with_context(|| format!("loading dashboard from {}", path.display()))?;

    let store = crate::commands::open_store()?;
    let provider: Arc<dyn Provider> = store;

    let manager = SessionManager::new(Arc::new(UdpConnector::new()));
    let name = dash.name.clone();
    let interval = dash.interval_secs;
    manager.start(dash, provider).await?;

    let mut events = manager.subscribe(&name).await?;

    println!("Watching '{name}' every {interval}s. Ctrl-C to stop.");
    render(events.current());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.changed() => match event {
                Some(event) => render(&event),
                None => break,
            },
        }
    }

    println!("Stopping...");
    manager.stop_all().await;
    Ok(())
}

/// A bare name refers to the dashboards directory; anything that looks
/// like a path (or an existing file) is used as-is.
fn resolve_dashboard_path(dashboard: &str) -> PathBuf {
    let as_path = PathBuf::from(dashboard);
    if as_path.exists() || dashboard.ends_with(".toml") || dashboard.contains('/') {
        as_path
    } else {
        flowatch_config::dashboard_path(dashboard)
    }
}

fn render(event: &Event) {
    let snap = &event.snapshot;
    if snap.poll_count == 0 {
        // Prefill snapshot: interfaces exist but nothing has been polled.
        return;
    }

    let stamp = snap
        .last_poll
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_default();
    println!("── poll #{} at {stamp} ──", snap.poll_count);

    for group in &snap.groups {
        for target in &group.targets {
            if let Some(err) = &target.last_error {
                println!("  {:<24} ERROR: {err}", target.display_name());
                continue;
            }
            for iface in &target.interfaces {
                if let Some(err) = &iface.last_error {
                    println!(
                        "  {:<24} {:<20} ERROR: {err}",
                        target.display_name(),
                        truncate(&iface.name, 20)
                    );
                    continue;
                }
                println!(
                    "  {:<24} {:<20} {:>6} in {:>12} out {:>12} util {:>6.2}%",
                    target.display_name(),
                    truncate(&iface.name, 20),
                    iface.status.to_string(),
                    format_bps(iface.in_bps),
                    format_bps(iface.out_bps),
                    iface.utilization,
                );
            }
        }
    }
}
