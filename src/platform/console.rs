//! Console confirmation dialog

use super::traits::ConfirmDialog;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;
use tracing::debug;

/// [`ConfirmDialog`] that prompts on a writer and reads the answer from a reader
///
/// The answer may be the button number (`1`/`2`) or the button label
/// (case-insensitive). Anything else, including end of input, dismisses the
/// dialog.
pub struct ConsoleConfirm<R, W> {
    io: Mutex<(R, W)>,
}

impl ConsoleConfirm<BufReader<Stdin>, Stdout> {
    /// Prompt on stdout, read from stdin
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> ConsoleConfirm<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Prompt on `writer`, read answers from `reader`
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }

    /// Give back the reader and writer
    pub fn into_inner(self) -> (R, W) {
        self.io.into_inner()
    }
}

#[async_trait]
impl<R, W> ConfirmDialog for ConsoleConfirm<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn confirm(&self, title: &str, message: &str, buttons: [&str; 2]) -> u32 {
        let mut io = self.io.lock().await;
        let (reader, writer) = &mut *io;

        let prompt = format!(
            "{title}\n{message}\n[1] {}  [2] {}\n> ",
            buttons[0], buttons[1]
        );
        if let Err(e) = writer.write_all(prompt.as_bytes()).await {
            debug!(error = %e, "failed to write confirmation prompt");
            return 0;
        }
        if let Err(e) = writer.flush().await {
            debug!(error = %e, "failed to flush confirmation prompt");
            return 0;
        }

        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) => 0,
            Ok(_) => parse_answer(line.trim(), buttons),
            Err(e) => {
                debug!(error = %e, "failed to read confirmation answer");
                0
            }
        }
    }
}

fn parse_answer(answer: &str, buttons: [&str; 2]) -> u32 {
    if answer == "1" || answer.eq_ignore_ascii_case(buttons[0]) {
        1
    } else if answer == "2" || answer.eq_ignore_ascii_case(buttons[1]) {
        2
    } else {
        0
    }
}
