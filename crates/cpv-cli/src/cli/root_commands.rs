use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Fetch one checkplot and print its summary and panels.
    Show(ShowArgs),
    /// Review a queue of checkplots interactively.
    Review(ReviewArgs),
    /// Encode a checkplot identifier into its URL token.
    Encode(EncodeArgs),
    /// Decode a URL token back into the checkplot identifier.
    Decode(DecodeArgs),
    /// List accepted edits recorded in the update log file.
    Updates(UpdatesArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ShowArgs {
    /// Checkplot identifier as known to the server (e.g. `obj001.pkl`).
    pub identifier: String,

    /// Print one row per panel instead of the object summary.
    #[arg(long)]
    pub panels: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ReviewArgs {
    /// Checkplot identifiers to review, in order.
    pub identifiers: Vec<String>,

    /// File with one identifier per line, appended after the positional ones.
    #[arg(long)]
    pub queue_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct EncodeArgs {
    pub identifier: String,
}

#[derive(Clone, Debug, Args)]
pub struct DecodeArgs {
    pub token: String,
}

#[derive(Clone, Debug, Args)]
pub struct UpdatesArgs {
    /// Only list updates for this checkplot identifier.
    #[arg(long)]
    pub object: Option<String>,

    /// Read this JSONL file instead of the configured update log.
    #[arg(long)]
    pub file: Option<PathBuf>,
}
