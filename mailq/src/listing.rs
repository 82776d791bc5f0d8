//! Classification of `mailq` output into logical queues.
//!
//! `mailq` prints one header line per message: the queue id (uppercase hex,
//! possibly tagged with a state marker), the size in bytes, the arrival
//! time, and the sender. Recipients follow on indented lines, deferred
//! messages additionally get their deferral reason on a parenthesized line
//! right below the header. The listing ends with either a summary footer
//! (`-- 11 Kbytes in 31 Requests.`) or `Mail queue is empty`.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

lazy_static! {
    static ref RECORD: Regex = Regex::new(r"^(?P<id>[0-9A-F]+)(?P<marker>[*!])?\s+").expect("RE");
    static ref ANNOTATION: Regex = Regex::new(r"^\(.*\)$").expect("RE");
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown queue name '{0}', expected active, deferred, hold, incoming, or all")]
pub struct UnknownQueueName(pub String);

/// The queue a message is reported to sit in.
///
/// Only `active` and `hold` are directly visible in `mailq` output (as `*`
/// and `!` markers on the queue id). `deferred` and `incoming` have to be
/// inferred from the presence or absence of a deferral reason below the
/// header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalQueue {
    Active,
    Deferred,
    Hold,
    Incoming,
    All,
}

impl LogicalQueue {
    /// Queue name as used in check messages. The whole queue has always
    /// been reported as the "mail" queue.
    pub fn message_name(&self) -> &'static str {
        match self {
            LogicalQueue::Active => "active",
            LogicalQueue::Deferred => "deferred",
            LogicalQueue::Hold => "hold",
            LogicalQueue::Incoming => "incoming",
            LogicalQueue::All => "mail",
        }
    }
}

impl FromStr for LogicalQueue {
    type Err = UnknownQueueName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LogicalQueue::Active),
            "deferred" => Ok(LogicalQueue::Deferred),
            "hold" => Ok(LogicalQueue::Hold),
            "incoming" => Ok(LogicalQueue::Incoming),
            "all" => Ok(LogicalQueue::All),
            _ => Err(UnknownQueueName(s.to_owned())),
        }
    }
}

impl fmt::Display for LogicalQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalQueue::All => "all",
            other => other.message_name(),
        })
    }
}

/// State marker `mailq` appends to the queue id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `*` - the message is being delivered right now.
    Active,
    /// `!` - the message is on hold.
    Hold,
}

/// One queue entry scraped from the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub queue_id: String,
    pub marker: Option<Marker>,
    /// Arrival time column, e.g. `"Wed May 13 17:28:57"`. Note that `mailq`
    /// omits the year.
    pub arrival: String,
    /// Parenthesized deferral reason from the line below the header. Only
    /// filled in when classification had to inspect that line.
    pub annotation: Option<String>,
}

// The arrival time occupies the four fields after queue id and size
// (weekday, month, day, time).
fn arrival_column(line: &str) -> String {
    line.split_whitespace()
        .skip(2)
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the records of `listing` that belong to `queue`, in listing
/// order.
///
/// Lines that do not look like a record header (column headings, recipient
/// continuations, deferral reasons, the summary footer, `Mail queue is
/// empty`) are skipped. `All` matches every record header without looking
/// at the following line; `Deferred` and `Incoming` are told apart solely
/// by the parenthesized reason below the header, where a missing next line
/// (end of listing) counts as "no reason". Malformed input never fails,
/// it just yields no records.
pub fn classify(listing: &str, queue: LogicalQueue) -> Vec<MessageRecord> {
    let lines: Vec<&str> = listing.lines().collect();
    let mut records = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let caps = match RECORD.captures(line) {
            Some(caps) => caps,
            None => continue,
        };
        let marker = caps.name("marker").map(|m| match m.as_str() {
            "*" => Marker::Active,
            _ => Marker::Hold,
        });
        // The `All` path deliberately skips the lookahead and reports no
        // annotation even for deferred messages.
        let annotation = match (queue, marker) {
            (LogicalQueue::All, _) | (_, Some(_)) => None,
            _ => lines
                .get(i + 1)
                .map(|next| next.trim())
                .filter(|next| ANNOTATION.is_match(next))
                .map(|next| next.to_owned()),
        };
        let wanted = match queue {
            LogicalQueue::All => true,
            LogicalQueue::Active => marker == Some(Marker::Active),
            LogicalQueue::Hold => marker == Some(Marker::Hold),
            LogicalQueue::Deferred => marker.is_none() && annotation.is_some(),
            LogicalQueue::Incoming => marker.is_none() && annotation.is_none(),
        };
        if wanted {
            records.push(MessageRecord {
                queue_id: caps["id"].to_owned(),
                marker,
                arrival: arrival_column(line),
                annotation,
            });
        }
    }
    records
}
