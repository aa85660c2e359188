//! Ping-based reachability probe.
//!
//! Raw ICMP sockets need privileges the daemon should not hold, so each
//! probe round shells out to the system `ping` binary (which is setuid or has
//! `cap_net_raw`) for a single echo request and parses the round-trip time
//! from its output.

use anyhow::{Context, Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::{IpAddr, ToSocketAddrs};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Matches the `time=12.3 ms` part of an echo reply line.
static RTT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time[=<]\s*([0-9]+(?:\.[0-9]+)?)\s*ms").expect("valid regex"));

/// One probe round against the watched host.
pub trait LivenessProbe: Send {
    /// Address being probed, reported alongside replies.
    fn target(&self) -> IpAddr;

    /// Run one round. `Ok(Some(rtt))` on a reply, `Ok(None)` when nothing
    /// answered before the timeout. `Err` only for local failures such as a
    /// missing `ping` binary.
    fn probe(&mut self) -> Result<Option<Duration>>;
}

/// Resolve the configured target (IP literal or host name) once at startup.
pub fn resolve_target(target: &str) -> Result<IpAddr> {
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(ip);
    }

    (target, 0)
        .to_socket_addrs()
        .with_context(|| format!("Failed to resolve ping target '{target}'"))?
        .map(|addr| addr.ip())
        .next()
        .ok_or_else(|| anyhow!("Ping target '{target}' resolved to no addresses"))
}

/// Probe that runs `ping -c 1 -W <timeout> <addr>`.
pub struct PingProbe {
    addr: IpAddr,
    timeout: Duration,
}

impl PingProbe {
    pub fn new(addr: IpAddr, timeout: Duration) -> Self {
        Self { addr, timeout }
    }
}

impl LivenessProbe for PingProbe {
    fn target(&self) -> IpAddr {
        self.addr
    }

    fn probe(&mut self) -> Result<Option<Duration>> {
        let family = if self.addr.is_ipv6() { "-6" } else { "-4" };
        let output = Command::new("ping")
            .arg(family)
            .args(["-n", "-c", "1", "-W"])
            .arg(self.timeout.as_secs().max(1).to_string())
            .arg(self.addr.to_string())
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .context("Failed to run ping")?;

        if !output.status.success() {
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        // A successful exit without a parseable time still counts as a reply
        Ok(Some(parse_rtt(&stdout).unwrap_or_default()))
    }
}

/// Extract the round-trip time from `ping` output.
pub(crate) fn parse_rtt(output: &str) -> Option<Duration> {
    let caps = RTT_PATTERN.captures(output)?;
    let millis: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(Duration::from_nanos((millis * 1_000_000.0).round() as u64))
}
