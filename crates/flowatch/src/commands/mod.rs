pub mod config_cmd;
pub mod discover;
pub mod identity;
pub mod watch;

use std::sync::Arc;

use color_eyre::eyre::Context;
use color_eyre::Result;
use secrecy::SecretString;

use flowatch_core::FileStore;

/// Open the identity vault, creating directories as needed.
///
/// Tries the empty password first (no-password vaults); otherwise reads
/// the master password from `FLOWATCH_MASTER_KEY` or prompts for it.
pub(crate) fn open_store() -> Result<Arc<FileStore>> {
    flowatch_config::ensure_dirs().context("creating config directories")?;
    let path = flowatch_config::identity_store_path();

    if let Ok(store) = FileStore::open(&path, &SecretString::from(String::new())) {
        return Ok(Arc::new(store));
    }

    let password = master_password()?;
    let store = FileStore::open(&path, &password).context("opening identity store")?;
    Ok(Arc::new(store))
}

fn master_password() -> Result<SecretString> {
    if let Ok(key) = std::env::var(flowatch_config::MASTER_KEY_ENV) {
        return Ok(SecretString::from(key));
    }

    let password = dialoguer::Password::new()
        .with_prompt("Master password")
        .interact()
        .context("reading master password")?;
    Ok(SecretString::from(password))
}

/// `flowatch dashboards` — list dashboard files in the config directory.
pub(crate) fn dashboards() -> Result<()> {
    flowatch_config::ensure_dirs().context("creating config directories")?;
    let names = flowatch_config::list_dashboards(&flowatch_config::dashboards_dir())?;

    if names.is_empty() {
        println!(
            "No dashboards found in {}.",
            flowatch_config::dashboards_dir().display()
        );
        return Ok(());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}
