// src/emit/statsd.rs

//! Minimal DogStatsD client over UDP.
//!
//! Only what cronner emits is supported: events, timings and gauges.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use anyhow::anyhow;
use tracing::trace;

use super::{Event, MetricsEmitter, NotificationEmitter};
use crate::errors::Result;

/// DogStatsD client bound to one agent address and metric namespace.
#[derive(Debug)]
pub struct DogStatsd {
    socket: UdpSocket,
    namespace: String,
}

impl DogStatsd {
    /// Resolve `addr` and open a connected UDP socket to it.
    pub fn connect(addr: &str, namespace: impl Into<String>) -> Result<Self> {
        let target = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| anyhow!("statsd address '{addr}' did not resolve"))?;

        let local: SocketAddr = if target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(local)?;
        socket.connect(target)?;

        Ok(Self {
            socket,
            namespace: namespace.into(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn send(&self, datagram: String) -> Result<()> {
        trace!(%datagram, "statsd send");
        self.socket.send(datagram.as_bytes())?;
        Ok(())
    }
}

impl NotificationEmitter for DogStatsd {
    fn event(&self, event: &Event) -> Result<()> {
        self.send(encode_event(event))
    }
}

impl MetricsEmitter for DogStatsd {
    fn timing(&self, name: &str, value_ms: f64, tags: &[String]) -> Result<()> {
        self.send(encode_metric(&self.namespace, name, value_ms, "ms", tags))
    }

    fn gauge(&self, name: &str, value: f64, tags: &[String]) -> Result<()> {
        self.send(encode_metric(&self.namespace, name, value, "g", tags))
    }
}

/// `_e{<tlen>,<blen>}:<title>|<body>|k:<key>|s:<source>|t:<severity>|#<tags>`
///
/// Newlines in title and body are escaped; the lengths are of the escaped
/// text.
pub fn encode_event(event: &Event) -> String {
    let title = escape_newlines(&event.title);
    let body = escape_newlines(&event.body);

    let mut out = format!("_e{{{},{}}}:{}|{}", title.len(), body.len(), title, body);

    if let Some(key) = &event.aggregation_key {
        out.push_str("|k:");
        out.push_str(key);
    }
    if let Some(source) = &event.source_type_name {
        out.push_str("|s:");
        out.push_str(source);
    }
    out.push_str("|t:");
    out.push_str(event.severity.as_str());
    push_tags(&mut out, &event.tags);
    out
}

/// `<namespace>.<name>:<value>|<kind>[|#tags]`
pub fn encode_metric(namespace: &str, name: &str, value: f64, kind: &str, tags: &[String]) -> String {
    let mut out = if namespace.is_empty() {
        format!("{name}:{value}|{kind}")
    } else {
        format!("{namespace}.{name}:{value}|{kind}")
    };
    push_tags(&mut out, tags);
    out
}

fn push_tags(out: &mut String, tags: &[String]) {
    if !tags.is_empty() {
        out.push_str("|#");
        out.push_str(&tags.join(","));
    }
}

fn escape_newlines(s: &str) -> String {
    s.replace('\n', "\\n")
}
