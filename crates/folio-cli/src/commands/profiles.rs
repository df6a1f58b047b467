//! Profiles command implementation.

use crate::cli::ProfilesArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use folio_extractor::SourceProfile;

/// Execute the profiles command.
pub async fn execute_profiles(args: ProfilesArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    if let Some(name) = args.show {
        let profile = config.profile(&name)?;
        let toml = profile
            .to_toml()
            .map_err(|e| CliError::Config(format!("Failed to render profile '{}': {}", name, e)))?;
        println!("{}", toml);
        return Ok(());
    }

    println!("{}", formatter.format_profiles(&list_profiles(config))?);
    Ok(())
}

/// Every resolvable profile, flagged when it comes from the config file.
///
/// Configured profiles that fail validation are skipped.
pub fn list_profiles(config: &Config) -> Vec<(SourceProfile, bool)> {
    config
        .profile_names()
        .into_iter()
        .filter_map(|name| {
            let configured = config.profiles.contains_key(&name);
            config.profile(&name).ok().map(|profile| (profile, configured))
        })
        .collect()
}
