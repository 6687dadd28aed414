// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Client settings read from `STATSD_*` environment variables.

use std::env;

use crate::types::{ErrorKind, MetricError, MetricResult, Protocol};
use crate::DEFAULT_PORT;

pub const ENV_ADDR: &str = "STATSD_ADDR";
pub const ENV_PREFIX: &str = "STATSD_PREFIX";
pub const ENV_DEFAULT_TAGS: &str = "STATSD_DEFAULT_TAGS";
pub const ENV_SAMPLE_RATE: &str = "STATSD_SAMPLE_RATE";
pub const ENV_IMPLEMENTATION: &str = "STATSD_IMPLEMENTATION";

/// Settings for a UDP `StatsdClient`.
///
/// | Variable                | Default          | Meaning                           |
/// |-------------------------|------------------|-----------------------------------|
/// | `STATSD_ADDR`           | `localhost:8125` | Server address                    |
/// | `STATSD_PREFIX`         | none             | Prefix for every metric name      |
/// | `STATSD_DEFAULT_TAGS`   | none             | Comma separated default tags      |
/// | `STATSD_SAMPLE_RATE`    | `1.0`            | Default sample rate in `[0, 1]`   |
/// | `STATSD_IMPLEMENTATION` | `datadog`        | `datadog`, `statsd` or `statsite` |
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub addr: String,
    pub prefix: Option<String>,
    pub default_tags: Vec<String>,
    pub sample_rate: f64,
    pub protocol: Protocol,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            addr: format!("localhost:{}", DEFAULT_PORT),
            prefix: None,
            default_tags: Vec::new(),
            sample_rate: 1.0,
            protocol: Protocol::default(),
        }
    }
}

impl ClientConfig {
    /// Read settings from the environment of the current process.
    pub fn from_env() -> MetricResult<Self> {
        Self::from_vars(env::vars())
    }

    /// Read settings from the given variables, ignoring any that aren't
    /// `STATSD_*` settings.
    ///
    /// # Example
    ///
    /// ```
    /// use statsd_datagram::{ClientConfig, Protocol};
    ///
    /// let config = ClientConfig::from_vars(vec![
    ///     ("STATSD_PREFIX", "my.app"),
    ///     ("STATSD_DEFAULT_TAGS", "env:prod,region:eu"),
    ///     ("STATSD_IMPLEMENTATION", "statsd"),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(Some("my.app".to_string()), config.prefix);
    /// assert_eq!(vec!["env:prod", "region:eu"], config.default_tags);
    /// assert_eq!(Protocol::Statsd, config.protocol);
    /// ```
    ///
    /// # Failures
    ///
    /// An `InvalidInput` error is returned if the sample rate isn't a number
    /// in `[0, 1]` or the implementation isn't a known protocol.
    pub fn from_vars<I, K, V>(vars: I) -> MetricResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = ClientConfig::default();

        for (key, value) in vars {
            let value: String = value.into();
            match key.as_ref() {
                ENV_ADDR => config.addr = value,
                ENV_PREFIX => config.prefix = Some(value),
                ENV_DEFAULT_TAGS => config.default_tags = parse_tags(&value),
                ENV_SAMPLE_RATE => config.sample_rate = parse_sample_rate(&value)?,
                ENV_IMPLEMENTATION => config.protocol = value.trim().parse()?,
                _ => {}
            }
        }

        Ok(config)
    }
}

fn parse_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn parse_sample_rate(value: &str) -> MetricResult<f64> {
    let rate = value
        .trim()
        .parse::<f64>()
        .map_err(|_| MetricError::from((ErrorKind::InvalidInput, "Sample rate is not a number")))?;

    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(MetricError::from((
            ErrorKind::InvalidInput,
            "Sample rate must be between 0.0 and 1.0",
        )))
    }
}
