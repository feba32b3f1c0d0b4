use cpv_config::CpvConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    config: &CpvConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Show(args) => commands::show::handle(&args, config, flags).await,
        Commands::Review(args) => commands::review::handle(&args, config, flags).await,
        Commands::Updates(args) => commands::updates::handle(&args, config, flags),
        Commands::Encode(_) | Commands::Decode(_) => {
            unreachable!("encode/decode are pre-dispatched in main")
        }
    }
}
