//! Checks for delayed messages in the Postfix mail queue.
//!
//! Unlike `check_mailq` this keeps every queue entry in memory to look at
//! its arrival time, which may be undesirable on heavily-trafficked
//! systems; hence a separate check.
//!
//! Examples:
//!
//! ```text
//! check_mail_delay -w 100 -c 200
//! check_mail_delay -q hold -w 50 -c 100
//! check_mail_delay -q deferred -d 7200 -w 10 -c 20
//! ```

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use log::warn;
use mailq::{classify, message_age, read_queue, LogicalQueue, MessageRecord, Status};
use std::path::PathBuf;
use std::process::exit;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
struct Opt {
    /// Warning if at least N messages are delayed
    #[structopt(short, long, value_name = "N", display_order = 1)]
    warning: usize,
    /// Critical if at least N messages are delayed
    #[structopt(short, long, value_name = "N", display_order = 2)]
    critical: usize,
    /// Age in seconds above which a message counts as delayed
    #[structopt(short, long, default_value = "3600", value_name = "SECONDS")]
    delay: i64,
    /// Queue to check (active, deferred, hold, incoming, or all)
    #[structopt(short, long, default_value = "all", value_name = "NAME")]
    queue: LogicalQueue,
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

// One unreadable arrival time must not mask real queue problems, so such
// records are skipped (with a note) instead of failing the whole check.
fn count_delayed<Tz: TimeZone>(records: &[MessageRecord], delay: i64, now: &DateTime<Tz>) -> usize {
    records
        .iter()
        .filter(|r| match message_age(&r.arrival, now) {
            Ok(age) => age > delay,
            Err(error) => {
                warn!("skipping queue entry {}: {}", r.queue_id, error);
                false
            }
        })
        .count()
}

fn message(count: usize, queue: LogicalQueue, delay: i64) -> String {
    format!(
        "{} messages in the postfix {} queue older than {} seconds",
        count,
        queue.message_name(),
        delay
    )
}

fn run(opt: &Opt) -> Result<Status> {
    let out = read_queue(&opt.path)?;
    let records = classify(&out, opt.queue);
    let count = count_delayed(&records, opt.delay, &Local::now());
    let status = Status::from_count(count, opt.warning, opt.critical);
    println!("{}: {}", status, message(count, opt.queue, opt.delay));
    Ok(status)
}

// A bad option (e.g. a typo'd queue name) must still leave a status line
// on stdout, not just a usage dump on stderr.
fn argument_error(error: &structopt::clap::Error) -> String {
    format!(
        "{}: {}",
        Status::Unknown,
        error.message.lines().next().unwrap_or("invalid arguments")
    )
}

fn parse_args() -> Opt {
    Opt::from_args_safe().unwrap_or_else(|error| {
        if error.use_stderr() {
            println!("{}", argument_error(&error));
            exit(Status::Unknown.exit_code());
        }
        // --help and --version keep clap's output
        error.exit()
    })
}

fn main() {
    env_logger::init();
    let opt = parse_args();
    match run(&opt) {
        Ok(status) => exit(status.exit_code()),
        Err(error) => {
            println!("{}: {:#}", Status::Unknown, error);
            exit(Status::Unknown.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    static LISTING: &str = "\
-Queue ID-  --Size-- ----Arrival Time---- -Sender/Recipient-------
A1B2C3D4E5*     4096 Sun Mar 10 09:00:00  sender@example.com
                                          recipient@example.org

D4E5F60718       512 Sun Mar 10 11:30:00  sender@example.com
                                          recipient@example.org

-- 4 Kbytes in 2 Requests.
";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn counts_only_messages_older_than_delay() {
        let records = classify(LISTING, LogicalQueue::All);
        assert_eq!(records.len(), 2);
        assert_eq!(count_delayed(&records, 3600, &now()), 1);
        assert_eq!(count_delayed(&records, 600, &now()), 2);
        assert_eq!(count_delayed(&records, 4 * 3600, &now()), 0);
    }

    #[test]
    fn delay_is_a_strict_bound() {
        let records = classify(LISTING, LogicalQueue::All);
        // the older message is exactly 3 hours old
        assert_eq!(count_delayed(&records, 3 * 3600, &now()), 0);
        assert_eq!(count_delayed(&records, 3 * 3600 - 1, &now()), 1);
    }

    #[test]
    fn unreadable_arrival_is_skipped() {
        let listing = "FFFFFFFFFF 512 not a real date  sender@example.com\n";
        let records = classify(listing, LogicalQueue::All);
        assert_eq!(records.len(), 1);
        assert_eq!(count_delayed(&records, 0, &now()), 0);
    }

    #[test]
    fn message_template() {
        let opt = Opt::from_iter(&["check_mail_delay", "-w", "100", "-c", "200"]);
        assert_eq!(opt.delay, 3600);
        assert_eq!(
            message(3, opt.queue, opt.delay),
            "3 messages in the postfix mail queue older than 3600 seconds"
        );
    }

    #[test]
    fn unknown_queue_name_is_rejected() {
        assert!(
            Opt::from_iter_safe(&["check_mail_delay", "-q", "foo", "-w", "1", "-c", "2"]).is_err()
        );
    }

    #[test]
    fn unknown_queue_name_reports_unknown_status() {
        let error = Opt::from_iter_safe(&["check_mail_delay", "-q", "foo", "-w", "1", "-c", "2"])
            .unwrap_err();
        assert!(error.use_stderr());
        let line = argument_error(&error);
        assert!(line.starts_with("UNKNOWN: "), "{}", line);
        assert!(line.contains("unknown queue name 'foo'"), "{}", line);
        assert_eq!(line.lines().count(), 1);
    }
}
