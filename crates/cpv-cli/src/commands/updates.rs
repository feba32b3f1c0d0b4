use anyhow::Context;
use cpv_config::CpvConfig;
use cpv_review::UpdateLog;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::UpdatesArgs;
use crate::output::output;

/// Handle `cpv updates`.
pub fn handle(args: &UpdatesArgs, config: &CpvConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let Some(path) = args.file.clone().or_else(|| config.review.update_log_path()) else {
        anyhow::bail!(
            "no update log configured; set review.update_log_path or pass --file"
        );
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "update log not written yet");
        return output(&Vec::<cpv_core::UpdateRecord>::new(), flags.format);
    }

    let mut records = UpdateLog::read_mirror(&path)
        .with_context(|| format!("failed to read update log at {}", path.display()))?;
    if let Some(object) = &args.object {
        records.retain(|record| &record.object_identifier == object);
    }

    output(&records, flags.format)
}
