// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::cache::{NormalizationCache, OwnedTags};
use crate::normalize::{has_reserved_name_bytes, normalize_name_slow, normalize_tag, Tags};
use crate::types::{ErrorKind, MetricError, MetricResult};
use std::str;
use buffer::{DatagramBuffer, Truncated};
use value::ValueFormatter;

pub use sample_rate::SampleRate;
pub use value::MetricValue;

mod buffer;
mod sample_rate;
mod value;

/// Largest datagram the builder will ever produce, in bytes.
pub const DATAGRAM_SIZE_MAX: usize = 4096;

const TAG_PREFIX: &[u8] = b"|#";
const TAG_SEPARATOR: &[u8] = b",";
const SAMPLE_RATE_PREFIX: &[u8] = b"|@";

/// Encoder for single StatsD datagrams.
///
/// The builder owns a fixed 4096 byte buffer that is reused by every call
/// to `encode` and a pair of bounded caches for normalized names and tag
/// lists. The prefix is written to the start of the buffer once, when the
/// builder is created.
///
/// The datagram format is:
///
/// ``` text
/// [<prefix>]<name>:<value>|<type>[|@<sample_rate>][|#<tag1>,<tag2>,...]
/// ```
///
/// Encoding never fails. If a datagram would grow past `DATAGRAM_SIZE_MAX`
/// the output stops after the last complete segment that fit (the name,
/// `:value`, `|type`, `|@rate`, `|#first-tag` or `,tag`).
///
/// Since `encode` takes `&mut self` a builder can't be used by two threads
/// at once. Give each thread its own builder or put it behind a lock, as
/// `StatsdClient` does.
///
/// # Example
///
/// ```
/// use statsd_datagram::{DatagramBuilder, MetricValue, SampleRate, Tags};
///
/// let mut builder = DatagramBuilder::new("app.", &["env:prod"]);
/// let datagram = builder.encode(
///     "requests",
///     MetricValue::Signed(1),
///     "c",
///     Some(SampleRate::from(0.5)),
///     &Tags::from(&["route:home"]),
/// );
///
/// assert_eq!(&b"app.requests:1|c|@0.5|#route:home,env:prod"[..], datagram);
/// ```
#[derive(Debug)]
pub struct DatagramBuilder {
    buf: DatagramBuffer,
    prefix_len: usize,
    default_tags: Vec<String>,
    name_cache: NormalizationCache<Box<str>, String>,
    tag_cache: NormalizationCache<OwnedTags, Vec<String>>,
    fmt: ValueFormatter,
}

impl DatagramBuilder {
    /// Create a builder that writes `prefix` verbatim at the start of every
    /// datagram and appends `default_tags` after any per-call tags.
    ///
    /// A prefix that doesn't leave room for anything else in the datagram is
    /// dropped entirely rather than cut short. Default tags are normalized
    /// here, once.
    pub fn new<I, T>(prefix: &str, default_tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut buf = DatagramBuffer::new(DATAGRAM_SIZE_MAX);
        let prefix_len = if !prefix.is_empty() && prefix.len() < DATAGRAM_SIZE_MAX {
            // can't fail, we just checked that it fits
            let _ = buf.try_extend(prefix.as_bytes());
            prefix.len()
        } else {
            if !prefix.is_empty() {
                warn!("dropping metric prefix of {} bytes, it does not fit in a datagram", prefix.len());
            }
            0
        };

        let default_tags = default_tags
            .into_iter()
            .map(|t| normalize_tag(t.as_ref()).into_owned())
            .collect();

        DatagramBuilder {
            buf,
            prefix_len,
            default_tags,
            name_cache: NormalizationCache::new(),
            tag_cache: NormalizationCache::new(),
            fmt: ValueFormatter::new(),
        }
    }

    /// Encode a single metric, returning the datagram bytes.
    ///
    /// The returned slice borrows the builder's buffer and is overwritten by
    /// the next call.
    pub fn encode(
        &mut self,
        name: &str,
        value: MetricValue<'_>,
        metric_type: &str,
        sample_rate: Option<SampleRate>,
        tags: &Tags<'_>,
    ) -> &[u8] {
        self.buf.truncate(self.prefix_len);
        if self.write_datagram(name, &value, metric_type, sample_rate, tags).is_err() {
            trace!(
                "datagram for {} truncated to {} bytes",
                name,
                self.buf.len()
            );
        }

        self.buf.as_bytes()
    }

    /// Encode a metric whose name arrives as raw bytes.
    ///
    /// # Failures
    ///
    /// Fails with `ErrorKind::InvalidInput` if `name` is not UTF-8 text.
    /// Nothing is written in that case.
    pub fn encode_bytes(
        &mut self,
        name: &[u8],
        value: MetricValue<'_>,
        metric_type: &str,
        sample_rate: Option<SampleRate>,
        tags: &Tags<'_>,
    ) -> MetricResult<&[u8]> {
        let name = str::from_utf8(name)
            .map_err(|_| MetricError::from((ErrorKind::InvalidInput, "Metric name is not UTF-8 text")))?;
        Ok(self.encode(name, value, metric_type, sample_rate, tags))
    }

    fn write_datagram(
        &mut self,
        name: &str,
        value: &MetricValue<'_>,
        metric_type: &str,
        sample_rate: Option<SampleRate>,
        tags: &Tags<'_>,
    ) -> Result<(), Truncated> {
        let DatagramBuilder {
            buf,
            default_tags,
            name_cache,
            tag_cache,
            fmt,
            ..
        } = self;

        if has_reserved_name_bytes(name) {
            let normalized = name_cache.get_or_compute(name, || normalize_name_slow(name));
            buf.try_extend(normalized.as_bytes())?;
        } else {
            buf.try_extend(name.as_bytes())?;
        }

        fmt.write_value(buf, value)?;
        buf.try_extend_all(&[b"|", metric_type.as_bytes()])?;

        if let Some(rate) = sample_rate.filter(SampleRate::is_partial) {
            buf.try_extend_all(&[SAMPLE_RATE_PREFIX, rate.render(fmt).as_bytes()])?;
        }

        if tags.is_empty() && default_tags.is_empty() {
            return Ok(());
        }

        let call_tags = if tags.is_empty() {
            None
        } else {
            Some(tag_cache.get_or_compute(tags, || tags.normalize()))
        };

        let call_tags: &[String] = match call_tags {
            Some(ref normalized) => normalized.as_slice(),
            None => &[],
        };
        for (i, tag) in call_tags.iter().chain(default_tags.iter()).enumerate() {
            let sep = if i == 0 { TAG_PREFIX } else { TAG_SEPARATOR };
            buf.try_extend_all(&[sep, tag.as_bytes()])?;
        }

        Ok(())
    }

    /// Bytes written at the start of every datagram.
    pub fn prefix(&self) -> &[u8] {
        &self.buf.as_bytes()[..self.prefix_len]
    }

    pub fn default_tags(&self) -> &[String] {
        &self.default_tags
    }

    /// Number of entries in the name and tag caches.
    pub fn cache_sizes(&self) -> (usize, usize) {
        (self.name_cache.len(), self.tag_cache.len())
    }
}
