use anyhow::Context;
use cpv_config::CpvConfig;
use cpv_core::panels::build_panels;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::ShowArgs;
use crate::commands::shared::{CheckplotSummary, panel_rows};
use crate::output::output;

/// Handle `cpv show`.
pub async fn handle(args: &ShowArgs, config: &CpvConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let client = bootstrap::client(config)?;
    let cp = client
        .fetch(&args.identifier)
        .await
        .with_context(|| format!("failed to fetch checkplot {}", args.identifier))?;

    let best = cp
        .candidate_matching_varinfo()
        .map(|(method, slot)| cpv_core::BestCandidate { method, slot });

    if args.panels {
        let layout = build_panels(
            &cp,
            best,
            &config.review.method_priority,
            &config.review.image_mime,
        );
        return output(&panel_rows(&layout), flags.format);
    }

    output(&CheckplotSummary::new(&args.identifier, &cp, best), flags.format)
}
