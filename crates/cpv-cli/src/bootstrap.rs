use anyhow::Context;
use cpv_client::CheckplotClient;
use cpv_config::CpvConfig;
use cpv_review::UpdateLog;

use crate::cli::GlobalFlags;

/// Load layered configuration and apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<CpvConfig> {
    let mut config = CpvConfig::load_with_dotenv().context("failed to load cpview configuration")?;

    if let Some(server) = &flags.server {
        config.server.base_url.clone_from(server);
        config
            .server
            .validate()
            .context("invalid --server value")?;
    }

    tracing::debug!(server = %config.server.base_url, "configuration loaded");
    Ok(config)
}

pub fn client(config: &CpvConfig) -> anyhow::Result<CheckplotClient> {
    CheckplotClient::new(&config.server).context("failed to build checkplot client")
}

/// The session's update log, mirrored to disk when a path is configured.
pub fn update_log(config: &CpvConfig) -> anyhow::Result<UpdateLog> {
    match config.review.update_log_path() {
        Some(path) => {
            let display = path.display().to_string();
            UpdateLog::with_mirror(path)
                .with_context(|| format!("failed to prepare update log at {display}"))
        }
        None => Ok(UpdateLog::new()),
    }
}
