#[macro_use]
extern crate log;

use chordring::config::Config;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "chordctl",
    version = "0.1",
    author = "bene",
    about = "Chord ring node"
)]
struct Opt {
    /// Path to a config file
    #[structopt(short = "c", parse(from_os_str))]
    config: PathBuf,

    /// Address of a bootstrap peer, overriding the config file
    #[structopt(short = "b")]
    bootstrap: Option<SocketAddr>,

    /// Silence all output
    #[structopt(short = "q", long = "quiet")]
    quiet: bool,

    /// Level of verbosity (v, vv, vvv)
    #[structopt(short = "v", parse(from_occurrences))]
    verbose: usize,

    /// Timestamp (sec, ms, ns, none)
    #[structopt(short = "t")]
    timestamp: Option<stderrlog::Timestamp>,
}

fn main() {
    let opt = Opt::from_args();

    stderrlog::new()
        .module(module_path!())
        .quiet(opt.quiet)
        .verbosity(opt.verbose)
        .timestamp(opt.timestamp.unwrap_or(stderrlog::Timestamp::Off))
        .init()
        .expect("failed to initialize logger");

    let path = opt
        .config
        .to_str()
        .expect("config path must be valid UTF-8");

    let mut config = Config::load_from_file(path).unwrap_or_else(|err| {
        error!("error while loading config file: {}", err);
        process::exit(2);
    });

    if opt.bootstrap.is_some() {
        config.bootstrap = opt.bootstrap;
    }

    if let Err(err) = chordring::run(config) {
        error!("fatal application error: {}", err);
        process::exit(1);
    }
}
