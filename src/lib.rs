// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A bounded StatsD datagram encoder for Rust!
//!
//! The core of this crate is the `DatagramBuilder`: a reusable encoder that
//! turns a metric name, value, type, optional sample rate and tags into a
//! single StatsD (or DogStatsD) line, never larger than 4096 bytes.
//!
//! ## Features
//!
//! * A fixed size buffer reused for every datagram, the prefix is written once.
//! * Name normalization (`:`, `|` and `@` become `_`) with a borrowing fast path.
//! * Bounded caches for normalized names and tag lists.
//! * Datadog style tags, given per metric and as defaults for every metric.
//! * Truncation that always stops at a complete segment instead of failing.
//! * A `StatsdClient` on top, with sampling, protocol flavors and pluggable
//!   `MetricSink` backends (UDP, logging, no-op, and a spy for tests).
//!
//! ## Install
//!
//! ```toml
//! [dependencies]
//! statsd-datagram = "x.y.z"
//! ```
//!
//! Client side sampling (dropping a share of metrics sent with a rate below
//! `1`) needs the `sample-rate` feature. Without it every metric is sent and
//! the rate is only written to the datagram.
//!
//! ## Usage
//!
//! ### Encoding datagrams
//!
//! ```
//! use statsd_datagram::{DatagramBuilder, MetricValue, Tags};
//!
//! let mut builder = DatagramBuilder::new("my.app.", &["env:prod"]);
//!
//! let datagram = builder.encode("page:views", MetricValue::Signed(1), "c", None, &Tags::None);
//! assert_eq!(&b"my.app.page_views:1|c|#env:prod"[..], datagram);
//!
//! let tags = [("route", "home")];
//! let datagram = builder.encode("latency", MetricValue::Float(12.5), "ms", None, &Tags::from(&tags));
//! assert_eq!(&b"my.app.latency:12.5|ms|#route:home,env:prod"[..], datagram);
//! ```
//!
//! ### Sending metrics
//!
//! ```no_run
//! use statsd_datagram::{StatsdClient, DEFAULT_PORT};
//!
//! let client = StatsdClient::from_udp_host("my.app", ("localhost", DEFAULT_PORT)).unwrap();
//!
//! client.incr("requests").unwrap();
//! client.gauge("queue.depth", 12u64).unwrap();
//! client.time_with_tags("render", 35u64)
//!     .with_tags(&["page:home"])
//!     .with_sample_rate(0.1)
//!     .send();
//! ```
//!
//! ### Custom sinks
//!
//! ```
//! use std::io;
//! use statsd_datagram::{MetricSink, StatsdClient};
//!
//! #[derive(Debug)]
//! struct StderrSink;
//!
//! impl MetricSink for StderrSink {
//!     fn emit(&self, metric: &str) -> io::Result<usize> {
//!         eprintln!("{}", metric);
//!         Ok(metric.len())
//!     }
//! }
//!
//! let client = StatsdClient::from_sink("my.app", StderrSink);
//! client.count("jobs.done", 3).unwrap();
//! ```
//!
//! ### Environment configuration
//!
//! `ClientConfig::from_env` reads `STATSD_ADDR`, `STATSD_PREFIX`,
//! `STATSD_DEFAULT_TAGS`, `STATSD_SAMPLE_RATE` and `STATSD_IMPLEMENTATION`,
//! and `StatsdClient::from_config` builds a UDP client from the result.

#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub const DEFAULT_PORT: u16 = 8125;

pub use self::builder::{DatagramBuilder, MetricValue, SampleRate, DATAGRAM_SIZE_MAX};

pub use self::cache::{CacheKey, NormalizationCache, OwnedTags, NORMALIZATION_CACHE_MAX};

pub use self::client::{log_error_handler, MetricBuilder, StatsdClient, StatsdClientBuilder, ToTimerValue};

pub use self::config::ClientConfig;

pub use self::normalize::{normalize_name, normalize_name_bytes, normalize_tag, Tags};

pub use self::sinks::{LoggingMetricSink, MetricSink, NopMetricSink, SinkStats, SpyMetricSink, UdpMetricSink};

pub use self::types::{ErrorKind, MetricError, MetricResult, MetricType, Protocol};

mod builder;
mod cache;
mod client;
pub mod config;
mod normalize;
pub mod prelude;
mod sampler;
mod sinks;
mod types;
