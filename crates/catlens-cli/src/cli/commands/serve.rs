//! `catlens serve --origin <origin>` – native messaging host on stdin/stdout.

use anyhow::Result;
use catlens_core::background::{Background, Sender};
use catlens_core::native_messaging;

pub async fn run_serve(bg: &Background, origin: &str) -> Result<()> {
    let sender = Sender::from_origin(origin)?;
    if !bg.is_authorized(&sender) {
        tracing::warn!(origin, "caller is not the configured extension; requests will be refused");
    }
    tracing::info!(origin, "native messaging session started");
    let handled =
        native_messaging::serve(bg, &sender, tokio::io::stdin(), tokio::io::stdout()).await?;
    tracing::info!(handled, "native messaging session closed");
    Ok(())
}
