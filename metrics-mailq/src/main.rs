//! Emits the Postfix mail queue depth as one Graphite plaintext line:
//!
//! ```text
//! $ metrics_mailq --scheme servers.mail01
//! servers.mail01.postfixMailqCount 3333 1409060355
//! ```
//!
//! Queue depth is reported for the whole queue; exit status is always OK
//! unless `mailq` itself cannot be run.

use anyhow::{Context, Result};
use chrono::Utc;
use mailq::{classify, read_queue, LogicalQueue, Status};
use std::path::PathBuf;
use std::process::exit;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
struct Opt {
    /// Metric naming scheme, text to prepend to the metric
    /// [default: <hostname>.tcp]
    #[structopt(short, long, value_name = "SCHEME")]
    scheme: Option<String>,
    /// Path to the `mailq` binary
    #[structopt(
        short,
        long,
        default_value = "/usr/bin/mailq",
        value_name = "PATH",
        parse(from_os_str)
    )]
    path: PathBuf,
}

fn default_scheme() -> Result<String> {
    let host = hostname::get().context("cannot determine hostname")?;
    Ok(format!("{}.tcp", host.to_string_lossy()))
}

fn graphite_line(scheme: &str, count: usize, timestamp: i64) -> String {
    format!("{}.postfixMailqCount {} {}", scheme, count, timestamp)
}

fn run(opt: &Opt) -> Result<()> {
    let scheme = match &opt.scheme {
        Some(scheme) => scheme.clone(),
        None => default_scheme()?,
    };
    let out = read_queue(&opt.path)?;
    let count = classify(&out, LogicalQueue::All).len();
    println!("{}", graphite_line(&scheme, count, Utc::now().timestamp()));
    Ok(())
}

fn main() {
    let opt = Opt::from_args();
    match run(&opt) {
        Ok(()) => exit(Status::Ok.exit_code()),
        Err(error) => {
            println!("{}: {:#}", Status::Unknown, error);
            exit(Status::Unknown.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphite_line_format() {
        assert_eq!(
            graphite_line("servers.mail01", 3333, 1409060355),
            "servers.mail01.postfixMailqCount 3333 1409060355"
        );
    }

    #[test]
    fn scheme_override() {
        let opt = Opt::from_iter(&["metrics_mailq", "--scheme", "servers.mail01"]);
        assert_eq!(opt.scheme.as_deref(), Some("servers.mail01"));
    }

    #[test]
    fn empty_queue_counts_zero() {
        assert!(classify("Mail queue is empty\n", LogicalQueue::All).is_empty());
    }
}
