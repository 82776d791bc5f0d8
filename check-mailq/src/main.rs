//! Checks the number of messages in the Postfix mail queue.
//!
//! Examples:
//!
//! ```text
//! check_mailq -w 200 -c 400
//! check_mailq -q deferred -w 100 -c 200
//! check_mailq -p /usr/local/bin/mailq -q active -w 50 -c 100
//! ```

use anyhow::Result;
use mailq::{classify, read_queue, LogicalQueue, Status};
use std::path::PathBuf;
use std::process::exit;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
struct Opt {
    /// Warning if there are at least N messages in the queue
    #[structopt(short, long, value_name = "N", display_order = 1)]
    warning: usize,
    /// Critical if there are at least N messages in the queue
    #[structopt(short, long, value_name = "N", display_order = 2)]
    critical: usize,
    /// Queue to check (active, deferred, hold, incoming, or all)
    #[structopt(short, long, default_value = "all", value_name = "NAME")]
    queue: LogicalQueue,
    /// Prints full `mailq` output
    #[structopt(short, long)]
    verbose: bool,
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

fn message(count: usize, queue: LogicalQueue) -> String {
    format!(
        "{} messages in the postfix {} queue",
        count,
        queue.message_name()
    )
}

fn run(opt: &Opt) -> Result<Status> {
    let out = read_queue(&opt.path)?;
    let count = classify(&out, opt.queue).len();
    let status = Status::from_count(count, opt.warning, opt.critical);
    println!("{}: {}", status, message(count, opt.queue));
    if opt.verbose {
        print!("{}", out);
    }
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
    let opt = parse_args();
    match run(&opt) {
        Ok(status) => exit(status.exit_code()),
        Err(error) => {
            println!("{}: {:#}", Status::Unknown, error);
            exit(Status::Unknown.exit_code())
        }
    }
}
