//! Console card input.
//!
//! Each stdin line is one card event fed to the mock reader:
//!
//! - a hex identifier (`04A31B9C`, `04 a3 1b 9c`, `04:A3:1B:9C`) presents a card
//! - `withdraw` presents a card that leaves before its serial is read
//! - blank lines and `#` comments are ignored

use anyhow::Context;
use std::str::FromStr;
use taplink_core::CardUid;
use taplink_hardware::mock::MockReaderHandle;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Card(CardUid),
    Withdrawn,
    Skip,
}

impl FromStr for ConsoleInput {
    type Err = taplink_core::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Self::Skip);
        }
        if line.eq_ignore_ascii_case("withdraw") {
            return Ok(Self::Withdrawn);
        }
        line.parse().map(Self::Card)
    }
}

/// Feed stdin to the reader on a background task.
///
/// A failed feed is logged and cancels `shutdown`.
pub fn spawn_stdin(cards: MockReaderHandle, shutdown: CancellationToken) -> JoinHandle<()> {
    info!("Type a card identifier in hex and press enter to present it");
    spawn_feed(BufReader::new(tokio::io::stdin()), cards, shutdown)
}

fn spawn_feed<In>(input: In, cards: MockReaderHandle, shutdown: CancellationToken) -> JoinHandle<()>
where
    In: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = feed(input, &cards, &shutdown).await {
            error!("Console input failed: {e:#}");
            shutdown.cancel();
        }
    })
}

/// Read lines until EOF or cancellation, presenting cards to the reader.
async fn feed<In>(input: In, cards: &MockReaderHandle, shutdown: &CancellationToken) -> anyhow::Result<()>
where
    In: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line.context("reading console input")?,
        };
        let Some(line) = line else {
            debug!("Console input closed");
            break;
        };

        match line.parse::<ConsoleInput>() {
            Ok(ConsoleInput::Card(uid)) => {
                debug!(uid = %uid, "Presenting card");
                cards.present_card(uid.as_bytes().to_vec()).await?;
            }
            Ok(ConsoleInput::Withdrawn) => cards.present_withdrawn_card().await?,
            Ok(ConsoleInput::Skip) => {}
            Err(e) => warn!(error = %e, "Ignoring console input"),
        }
    }

    Ok(())
}
