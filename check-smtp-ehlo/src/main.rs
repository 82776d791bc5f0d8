//! Probes an SMTP server by completing a connection handshake with EHLO.
//!
//! A server that greets and accepts EHLO within the timeout is considered
//! alive. Anything else (connection refused, negative reply, timeout)
//! goes critical, or only warning with `--warn-only`.

use humantime::Duration as HDur;
use lettre::transport::smtp::extension::ClientId;
use lettre::SmtpTransport;
use mailq::Status;
use std::io::ErrorKind;
use std::process::exit;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
struct Opt {
    /// SMTP server to probe
    #[structopt(
        short = "H",
        long,
        default_value = "localhost",
        value_name = "HOSTNAME"
    )]
    hostname: String,
    /// SMTP port
    #[structopt(short, long, default_value = "25", value_name = "PORT")]
    port: u16,
    /// Domain to greet the server with
    #[structopt(short, long, default_value = "localhost", value_name = "DOMAIN")]
    domain: String,
    /// Gives up on handshakes taking longer than this
    #[structopt(short, long, default_value = "6s", value_name = "DURATION")]
    timeout: HDur,
    /// Warn instead of going critical on failure
    #[structopt(short, long)]
    warn_only: bool,
}

impl Opt {
    fn failure_status(&self) -> Status {
        if self.warn_only {
            Status::Warning
        } else {
            Status::Critical
        }
    }
}

// lettre wraps socket timeouts a few layers deep, dig through the cause
// chain for them
fn is_timeout(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut cause = Some(error);
    while let Some(error) = cause {
        if let Some(io) = error.downcast_ref::<std::io::Error>() {
            if matches!(io.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) {
                return true;
            }
        }
        cause = error.source();
    }
    false
}

fn run(opt: &Opt) -> Status {
    let transport = SmtpTransport::builder_dangerous(opt.hostname.as_str())
        .port(opt.port)
        .hello_name(ClientId::Domain(opt.domain.clone()))
        .timeout(Some(*opt.timeout))
        .build();
    match transport.test_connection() {
        Ok(true) => {
            println!(
                "{}: SMTP EHLO succeeded on {}:{}",
                Status::Ok,
                opt.hostname,
                opt.port
            );
            Status::Ok
        }
        Ok(false) => {
            let status = opt.failure_status();
            println!(
                "{}: SMTP EHLO rejected on {}:{}",
                status, opt.hostname, opt.port
            );
            status
        }
        Err(error) if is_timeout(&error) => {
            let status = opt.failure_status();
            println!(
                "{}: SMTP EHLO timed out after {} on {}:{}",
                status, opt.timeout, opt.hostname, opt.port
            );
            status
        }
        Err(error) => {
            let status = opt.failure_status();
            println!(
                "{}: cannot reach SMTP server {}:{}: {}",
                status, opt.hostname, opt.port, error
            );
            status
        }
    }
}

fn main() {
    let opt = Opt::from_args();
    exit(run(&opt).exit_code());
}
