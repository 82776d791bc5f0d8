//! Shared building blocks for the Postfix queue checks.
//!
//! Reading the queue directories under `/var/spool/postfix` requires root
//! or postfix privileges, so all queue information is scraped from the
//! textual output of the `mailq` binary instead. This crate captures one
//! such snapshot per check run and provides pure functions over the text:
//! classification of queue entries into logical queues and estimation of
//! message ages from the year-less arrival column.

pub mod age;
pub mod listing;
pub mod status;

pub use crate::age::{message_age, TimestampParseError};
pub use crate::listing::{classify, LogicalQueue, Marker, MessageRecord, UnknownQueueName};
pub use crate::status::Status;

use anyhow::{ensure, Context, Result};
use std::path::Path;
use subprocess::{Exec, Redirection::Pipe};

/// Captures a point-in-time snapshot of the queue listing by running the
/// `mailq` binary. The locale is pinned so that the output format stays
/// parseable.
pub fn read_queue<P: AsRef<Path>>(mailq: P) -> Result<String> {
    let mailq = mailq.as_ref();
    let c = Exec::cmd(mailq)
        .stdout(Pipe)
        .env("LANG", "C")
        .capture()
        .with_context(|| format!("Failed to execute {:?}", mailq))?;
    ensure!(c.success(), "{:?} status: {:?}", mailq, c.exit_status);
    Ok(c.stdout_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_reports_cause() {
        let error = read_queue("/no/such/mailq").unwrap_err();
        assert!(
            format!("{:#}", error).contains("Failed to execute \"/no/such/mailq\""),
            "{:#}",
            error
        );
    }

    #[test]
    fn failing_binary_is_an_error() {
        let error = read_queue("/bin/false").unwrap_err();
        assert!(
            error.to_string().contains("\"/bin/false\" status"),
            "{:#}",
            error
        );
    }
}
