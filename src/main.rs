//! memwatch - single-process memory and socket monitor.
//!
//! Polls one target process at a fixed interval and reports its memory
//! accounting, ancestry, memory mappings and network connections from
//! the `/proc` filesystem.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use memwatch::collector::{
    AncestryWalker, FileSystem, IdentityError, MappingsReader, MemoryError, MemoryReader,
    MemorySnapshot, NetError, ProcessIdentity, Protocol, RealFs, SocketCorrelator, SocketTable,
    SocketTableLoader,
};
use memwatch::collector::procfs::memory::pressure_percent;
use memwatch::report;

/// Single-process memory and socket monitor.
#[derive(Parser)]
#[command(name = "memwatch", about = "Single-process memory and socket monitor", version)]
struct Args {
    /// Target process id.
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pid: u32,

    /// Full path of the target process executable.
    #[arg(short, long)]
    exename: String,

    /// Poll interval in seconds.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Only report in detail when the process occupies at least this
    /// percentage of system memory.
    #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..=99))]
    memory_pressure_threshold: Option<i64>,

    /// Number of polls to run before exiting (default: run forever).
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    count: Option<u64>,

    /// Path to the proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("memwatch={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Why a tick stopped short of a full report.
enum TickFailure {
    /// Process identity precondition failed; the program must exit.
    Identity(IdentityError),
    /// Memory accounting unreadable; retry next interval.
    Memory(MemoryError),
    /// An IPv4 socket table was unreadable; retry next interval.
    SocketTable(NetError),
}

/// Runs one poll tick against the target, printing the report sections
/// to stdout in order. Advisory failures (IPv6 tables, OOM score, fd
/// directory, maps file) degrade to omitted subsections.
fn poll_once<F: FileSystem + Clone>(fs: &F, args: &Args) -> Result<(), TickFailure> {
    let proc_path = args.proc_path.as_str();

    println!("Report Time: {}", Local::now().format("%a %b %e %H:%M:%S %Y"));

    ProcessIdentity::new(fs.clone(), proc_path)
        .verify(args.pid, &args.exename)
        .map_err(TickFailure::Identity)?;

    println!("{}", report::BASIC_BANNER);
    println!("{}\n", report::basic_section(args.pid, &args.exename));

    // Memory accounting: all three reads gate the rest of the tick.
    let mem = MemoryReader::new(fs.clone(), proc_path);
    let total_kb = mem.system_total_kb().map_err(TickFailure::Memory)?;
    let usage = mem.usage(args.pid).map_err(TickFailure::Memory)?;
    let page_tables_kb = mem.page_tables_kb(args.pid).map_err(TickFailure::Memory)?;

    if let Some(threshold) = args.memory_pressure_threshold
        && pressure_percent(usage.rss_kb, total_kb) < threshold
    {
        println!("{}\n", report::BELOW_THRESHOLD_NOTICE);
        return Ok(());
    }

    let oom = match mem.oom_score(args.pid) {
        Ok(oom) => Some(oom),
        Err(e) => {
            warn!("failed to get process OOM score: {}", e);
            None
        }
    };
    let snapshot = MemorySnapshot {
        total_kb,
        usage,
        page_tables_kb,
        oom,
    };

    println!("{}", report::MEMORY_BANNER);
    println!("{}\n", report::memory_section(&snapshot));

    println!("{}", report::TREE_BANNER);
    match AncestryWalker::new(fs.clone(), proc_path).walk(args.pid) {
        Ok(chain) => {
            for ancestor in &chain {
                println!("{}", report::ancestor_row(ancestor));
            }
        }
        Err(e) => warn!("failed to walk process tree: {}", e),
    }
    println!();

    println!("{}", report::MAPPING_BANNER);
    match MappingsReader::new(fs.clone(), proc_path).regions(args.pid) {
        Ok(regions) => {
            println!("{}", report::mapping_header());
            for region in &regions {
                println!("{}", report::mapping_row(region));
            }
        }
        Err(e) => warn!("failed to read memory mappings: {}", e),
    }
    println!();

    println!("{}", report::NETWORK_BANNER);
    print_connections(fs, args)?;
    println!();

    Ok(())
}

/// Loads the socket tables and prints the rows matching the target's
/// descriptors. IPv4 tables are required, IPv6 tables advisory, and an
/// unreadable fd directory costs only this section.
fn print_connections<F: FileSystem + Clone>(fs: &F, args: &Args) -> Result<(), TickFailure> {
    let correlator = SocketCorrelator::new(fs.clone(), args.proc_path.as_str());
    let entries = match correlator.fd_entries(args.pid) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("{}", e);
            return Ok(());
        }
    };

    let loader = SocketTableLoader::new(fs.clone(), args.proc_path.as_str());
    let mut tables: Vec<SocketTable> = Vec::with_capacity(4);
    for protocol in [Protocol::Tcp, Protocol::Udp, Protocol::Tcp6, Protocol::Udp6] {
        match loader.load(protocol) {
            Ok(table) => tables.push(table),
            Err(e) if protocol.optional() => warn!("{}", e),
            Err(e) => return Err(TickFailure::SocketTable(e)),
        }
    }

    println!("{}", report::socket_header());
    for record in correlator.matches(&entries, &tables) {
        println!("{}", report::socket_row(record));
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("memwatch {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: pid={}, exe={}, interval={}s, proc={}",
        args.pid, args.exename, args.interval, args.proc_path
    );

    let fs = RealFs::new();
    let interval = Duration::from_secs(args.interval);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let mut remaining = args.count;

    while running.load(Ordering::SeqCst) {
        match poll_once(&fs, &args) {
            Ok(()) => {}
            Err(TickFailure::Identity(e)) => {
                error!("{}", e);
                std::process::exit(1);
            }
            Err(TickFailure::Memory(e)) => error!("{}", e),
            Err(TickFailure::SocketTable(e)) => error!("{}", e),
        }

        if let Some(count) = remaining.as_mut() {
            *count -= 1;
            if *count == 0 {
                break;
            }
        }
        if !running.load(Ordering::SeqCst) {
            break;
        }

        std::thread::sleep(interval);
        println!();
    }
}
