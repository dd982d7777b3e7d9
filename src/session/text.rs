//! Typed conversation over any line-based reader and writer.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{is_exit_command, ExchangeHandler, SessionEnd, SessionOutcome};
use crate::error::Result;

pub const TEXT_BANNER: &str = "Text mode. Type 'exit' to quit.";
pub const FAREWELL: &str = "Goodbye!";

pub struct TextSession {
    handler: Arc<dyn ExchangeHandler>,
}

impl TextSession {
    pub fn new(handler: Arc<dyn ExchangeHandler>) -> Self {
        Self { handler }
    }

    /// Read questions line by line until an exit word, EOF, or `cancel`.
    pub async fn run<R, W>(&self, input: R, mut output: W, cancel: CancellationToken) -> Result<SessionOutcome>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut exchanges = 0;
        write_line(&mut output, TEXT_BANNER).await?;

        let end = loop {
            output.write_all(b"\nYou: ").await?;
            output.flush().await?;

            let line = tokio::select! {
                biased;
                _ = cancel.cancelled() => break SessionEnd::Interrupted,
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                break SessionEnd::EndOfInput;
            };
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            if is_exit_command(text) {
                break SessionEnd::ExitCommand;
            }

            let answer = tokio::select! {
                biased;
                _ = cancel.cancelled() => break SessionEnd::Interrupted,
                answer = self.handler.handle(text) => answer,
            };
            exchanges += 1;
            write_line(&mut output, &format!("Assistant: {answer}")).await?;
        };

        write_line(&mut output, &format!("\n{FAREWELL}")).await?;
        info!(exchanges, ?end, "text session ended");
        Ok(SessionOutcome { exchanges, end })
    }
}

pub(crate) async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
