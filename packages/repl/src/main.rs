use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use webfs::config::{DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
use webfs::{Config, WebFs};
use webfs_repl::host::terminal::EDIT_MODE_ENV;
use webfs_repl::Shell;

/// webfs - HTTP requests and responses as a file tree
#[derive(Parser, Debug)]
#[command(name = "webfs")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// User agent sent with every request
    #[arg(short = 'A', long = "useragent", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Request timeout in milliseconds
    #[arg(short = 'T', long, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout: u64,

    /// Log more; repeat for trace output
    #[arg(short = 'd', long = "debug", action = ArgAction::Count)]
    debug: u8,

    /// Address a file server would listen on
    #[arg(long)]
    addr: Option<String>,

    /// Force vi editing mode
    #[arg(long)]
    vi: bool,

    /// Force emacs editing mode
    #[arg(long)]
    emacs: bool,
}

fn init_logging(debug: u8) {
    let default = match debug {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if args.vi {
        std::env::set_var(EDIT_MODE_ENV, "vi");
    } else if args.emacs {
        std::env::set_var(EDIT_MODE_ENV, "emacs");
    }

    let config = Config::from_env()
        .with_user_agent(args.user_agent)
        .with_timeout(Duration::from_millis(args.timeout));
    tracing::info!(
        useragent = %config.user_agent,
        timeout_ms = args.timeout,
        owner = %config.owner,
        "webfs starting"
    );
    if let Some(addr) = &args.addr {
        tracing::info!(%addr, "no network listener in this build; serving the local shell only");
    }

    let fs = match WebFs::with_reqwest(config) {
        Ok(fs) => fs,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = webfs_repl::run(Shell::new(fs)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
