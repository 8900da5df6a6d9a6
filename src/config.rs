//! Configuration inputs for the control plane (§6, §2.1).
//!
//! `m`, `r` and the network address are immutable once a [`Config`] has been
//! used to build a [`crate::node::Node`]; the maintenance periods and RPC
//! timeout are read by the control plane once at startup and handed to the
//! maintenance loops and the `TcpPeerClient` respectively.
//!
//! [`crate::node::Node`]: ../node/struct.Node.html

use crate::Error;
use ini::Ini;
use std::net::SocketAddr;

/// Defaults matching the reference periods from §4.4: stabilize and
/// check-predecessor every two seconds, fix-fingers every one second.
pub const DEFAULT_STABILIZE_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_FIX_FINGERS_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_CHECK_PREDECESSOR_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_WORKER_THREADS: usize = 4;
pub const DEFAULT_M: u32 = 10;
pub const DEFAULT_R: u32 = 1;

#[derive(Debug, Clone)]
pub struct Config {
    /// Address this node listens for peer-to-peer requests on, and the
    /// address its identifier is derived from.
    pub listen_address: SocketAddr,
    /// Address of a bootstrap peer to join through. Absent means this node
    /// should create a new ring.
    pub bootstrap: Option<SocketAddr>,
    /// Finger count / address-space exponent.
    pub m: u32,
    /// Replication parameter, accepted but unused by the core (§9).
    pub r: u32,
    pub stabilize_interval_ms: u64,
    pub fix_fingers_interval_ms: u64,
    pub check_predecessor_interval_ms: u64,
    pub rpc_timeout_ms: u64,
    pub worker_threads: usize,
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Config, Error> {
        let conf = Ini::load_from_file(path)
            .map_err(|err| Error::Config(format!("could not read {}: {}", path, err)))?;

        let dht = conf
            .section(Some("dht"))
            .ok_or_else(|| Error::Config("missing section `dht`".to_string()))?;

        let listen_address = dht
            .get("listen_address")
            .ok_or_else(|| Error::Config("missing value `listen_address`".to_string()))?
            .parse()?;

        let bootstrap = match dht.get("bootstrap") {
            Some(addr) if !addr.trim().is_empty() => Some(addr.parse()?),
            _ => None,
        };

        let m = parse_or_default(dht.get("m").map(|x| x.as_str()), DEFAULT_M, "m")?;
        if m == 0 || m >= 64 {
            return Err(Error::Config(format!("`m` must be in 1..64, got {}", m)));
        }
        let r = parse_or_default(dht.get("r").map(|x| x.as_str()), DEFAULT_R, "r")?;

        let timing = conf.section(Some("timing"));

        let stabilize_interval_ms = parse_or_default(
            timing
                .and_then(|s| s.get("stabilize_interval_ms"))
                .map(|x| x.as_str()),
            DEFAULT_STABILIZE_INTERVAL_MS,
            "stabilize_interval_ms",
        )?;
        let fix_fingers_interval_ms = parse_or_default(
            timing
                .and_then(|s| s.get("fix_fingers_interval_ms"))
                .map(|x| x.as_str()),
            DEFAULT_FIX_FINGERS_INTERVAL_MS,
            "fix_fingers_interval_ms",
        )?;
        let check_predecessor_interval_ms = parse_or_default(
            timing
                .and_then(|s| s.get("check_predecessor_interval_ms"))
                .map(|x| x.as_str()),
            DEFAULT_CHECK_PREDECESSOR_INTERVAL_MS,
            "check_predecessor_interval_ms",
        )?;
        let rpc_timeout_ms = parse_or_default(
            timing
                .and_then(|s| s.get("rpc_timeout_ms"))
                .map(|x| x.as_str()),
            DEFAULT_RPC_TIMEOUT_MS,
            "rpc_timeout_ms",
        )?;
        let worker_threads = parse_or_default(
            timing
                .and_then(|s| s.get("worker_threads"))
                .map(|x| x.as_str()),
            DEFAULT_WORKER_THREADS,
            "worker_threads",
        )?;

        Ok(Config {
            listen_address,
            bootstrap,
            m,
            r,
            stabilize_interval_ms,
            fix_fingers_interval_ms,
            check_predecessor_interval_ms,
            rpc_timeout_ms,
            worker_threads,
        })
    }
}

fn parse_or_default<T: std::str::FromStr>(
    value: Option<&str>,
    default: T,
    field: &str,
) -> Result<T, Error> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("invalid value for `{}`: {}", field, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    struct TempIni {
        path: PathBuf,
    }

    impl TempIni {
        fn new(contents: &str) -> Self {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let mut path = std::env::temp_dir();
            path.push(format!("chordring-config-test-{}-{}.ini", std::process::id(), n));
            fs::write(&path, contents).expect("write temp config");
            TempIni { path }
        }
    }

    impl Drop for TempIni {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    #[test]
    fn loads_minimal_config_with_defaults() {
        let file = TempIni::new("[dht]\nlisten_address = 127.0.0.1:9000\n");
        let config = Config::load_from_file(file.path.to_str().unwrap()).unwrap();

        assert_eq!(config.listen_address, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.bootstrap, None);
        assert_eq!(config.m, DEFAULT_M);
        assert_eq!(config.r, DEFAULT_R);
        assert_eq!(config.stabilize_interval_ms, DEFAULT_STABILIZE_INTERVAL_MS);
    }

    #[test]
    fn loads_bootstrap_and_overrides() {
        let file = TempIni::new(
            "[dht]\nlisten_address = 127.0.0.1:9001\nbootstrap = 127.0.0.1:9000\nm = 16\n\n[timing]\nfix_fingers_interval_ms = 500\n",
        );
        let config = Config::load_from_file(file.path.to_str().unwrap()).unwrap();

        assert_eq!(config.bootstrap, Some("127.0.0.1:9000".parse().unwrap()));
        assert_eq!(config.m, 16);
        assert_eq!(config.fix_fingers_interval_ms, 500);
    }

    #[test]
    fn missing_section_is_an_error() {
        let file = TempIni::new("[other]\nfoo = bar\n");
        let err = Config::load_from_file(file.path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("dht"));
    }

    #[test]
    fn missing_listen_address_is_an_error() {
        let file = TempIni::new("[dht]\nm = 10\n");
        let err = Config::load_from_file(file.path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("listen_address"));
    }

    #[test]
    fn zero_m_is_an_error() {
        let file = TempIni::new("[dht]\nlisten_address = 127.0.0.1:9000\nm = 0\n");
        let err = Config::load_from_file(file.path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("`m`"));
    }

    #[test]
    fn m_at_or_above_64_is_an_error() {
        let file = TempIni::new("[dht]\nlisten_address = 127.0.0.1:9000\nm = 64\n");
        let err = Config::load_from_file(file.path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("`m`"));
    }
}
