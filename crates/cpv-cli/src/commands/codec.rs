use anyhow::Context;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{DecodeArgs, EncodeArgs};
use crate::output::output;

#[derive(Debug, Serialize)]
struct TokenResponse {
    identifier: String,
    token: String,
}

/// Handle `cpv encode`.
pub fn handle_encode(args: &EncodeArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(
        &TokenResponse {
            token: cpv_core::codec::encode_identifier(&args.identifier),
            identifier: args.identifier.clone(),
        },
        flags.format,
    )
}

/// Handle `cpv decode`.
pub fn handle_decode(args: &DecodeArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let identifier = cpv_core::codec::decode_identifier(&args.token)
        .with_context(|| format!("'{}' is not a checkplot token", args.token))?;
    output(
        &TokenResponse {
            identifier,
            token: args.token.clone(),
        },
        flags.format,
    )
}
