//! `flowatch config` — application configuration management.

use color_eyre::eyre::bail;
use color_eyre::Result;

use crate::cli::ConfigCommand;

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Path => {
            println!("{}", flowatch_config::config_dir().display());
            Ok(())
        }

        ConfigCommand::Identity { name } => {
            let mut config = flowatch_config::load_config_or_default();
            config.default_identity = name.clone();
            flowatch_config::save_config(&config)?;
            println!("Default identity set to '{name}'.");
            Ok(())
        }

        ConfigCommand::Interval { secs } => {
            if secs < 1 {
                bail!("poll interval must be at least 1 second");
            }
            let mut config = flowatch_config::load_config_or_default();
            config.interval_secs = secs;
            flowatch_config::save_config(&config)?;
            println!("Default poll interval set to {secs}s.");
            Ok(())
        }
    }
}
