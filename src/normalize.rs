// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Removal of protocol-reserved characters from metric names and tags.
//!
//! Names may not contain the field delimiters `:`, `|` or `@` and have them
//! replaced with `_`. Tags may not contain `|` (field delimiter) or `,` (tag
//! delimiter) and have them deleted. Both functions return borrowed input
//! when nothing needs to change, which is by far the common case.

use crate::types::{ErrorKind, MetricError, MetricResult};
use std::borrow::Cow;
use std::str;

const NAME_RESERVED: [u8; 3] = [b':', b'|', b'@'];
const NAME_REPLACEMENT: char = '_';
const TAG_RESERVED: [u8; 2] = [b'|', b','];

/// Replace every `:`, `|` and `@` in `name` with `_`.
///
/// # Example
///
/// ```
/// use statsd_datagram::normalize_name;
///
/// assert_eq!("api.requests", normalize_name("api.requests"));
/// assert_eq!("user_login_ok", normalize_name("user:login|ok"));
/// ```
#[inline]
pub fn normalize_name(name: &str) -> Cow<'_, str> {
    if has_reserved_name_bytes(name) {
        Cow::Owned(normalize_name_slow(name))
    } else {
        Cow::Borrowed(name)
    }
}

/// Like `normalize_name` but for raw bytes of unknown origin, failing with
/// `ErrorKind::InvalidInput` if the bytes are not UTF-8 text.
pub fn normalize_name_bytes(name: &[u8]) -> MetricResult<Cow<'_, str>> {
    match str::from_utf8(name) {
        Ok(s) => Ok(normalize_name(s)),
        Err(_) => Err(MetricError::from((ErrorKind::InvalidInput, "Metric name is not UTF-8 text"))),
    }
}

#[inline]
pub(crate) fn has_reserved_name_bytes(name: &str) -> bool {
    name.bytes().any(|b| NAME_RESERVED.contains(&b))
}

pub(crate) fn normalize_name_slow(name: &str) -> String {
    // All reserved bytes are ASCII so replacing per-char can't split a
    // multi-byte sequence.
    name.chars()
        .map(|c| if c.is_ascii() && NAME_RESERVED.contains(&(c as u8)) { NAME_REPLACEMENT } else { c })
        .collect()
}

/// Delete every `|` and `,` from `tag`.
#[inline]
pub fn normalize_tag(tag: &str) -> Cow<'_, str> {
    if has_reserved_tag_bytes(tag) {
        Cow::Owned(tag.chars().filter(|c| *c != '|' && *c != ',').collect())
    } else {
        Cow::Borrowed(tag)
    }
}

#[inline]
fn has_reserved_tag_bytes(tag: &str) -> bool {
    tag.bytes().any(|b| TAG_RESERVED.contains(&b))
}

/// Tags attached to a single metric.
///
/// Tags are either plain strings (typically already `key:value` formatted)
/// or separate key and value pairs which are joined with `:` when written.
///
/// # Example
///
/// ```
/// use statsd_datagram::Tags;
///
/// let list = Tags::from(&["env:prod", "beta"]);
/// let pairs = Tags::from(&[("region", "us-east-1")]);
///
/// assert!(!list.is_empty());
/// assert_eq!(vec!["region:us-east-1".to_string()], pairs.normalize());
/// assert!(Tags::None.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Tags<'a> {
    #[default]
    None,
    List(&'a [&'a str]),
    Pairs(&'a [(&'a str, &'a str)]),
}

impl<'a> Tags<'a> {
    /// True unless this is a non-empty list or a non-empty set of pairs.
    pub fn is_empty(&self) -> bool {
        match *self {
            Tags::None => true,
            Tags::List(tags) => tags.is_empty(),
            Tags::Pairs(pairs) => pairs.is_empty(),
        }
    }

    /// Number of tags that will be written.
    pub fn len(&self) -> usize {
        match *self {
            Tags::None => 0,
            Tags::List(tags) => tags.len(),
            Tags::Pairs(pairs) => pairs.len(),
        }
    }

    /// Convert to the canonical form: one normalized `String` per tag, in
    /// the order given.
    pub fn normalize(&self) -> Vec<String> {
        match *self {
            Tags::None => Vec::new(),
            Tags::List(tags) => tags.iter().map(|t| normalize_tag(t).into_owned()).collect(),
            Tags::Pairs(pairs) => pairs
                .iter()
                .map(|(k, v)| {
                    let mut tag = String::with_capacity(k.len() + 1 + v.len());
                    tag.push_str(k);
                    tag.push(':');
                    tag.push_str(v);
                    if has_reserved_tag_bytes(&tag) {
                        normalize_tag(&tag).into_owned()
                    } else {
                        tag
                    }
                })
                .collect(),
        }
    }
}

impl<'a> From<&'a [&'a str]> for Tags<'a> {
    fn from(tags: &'a [&'a str]) -> Self {
        Tags::List(tags)
    }
}

impl<'a, const N: usize> From<&'a [&'a str; N]> for Tags<'a> {
    fn from(tags: &'a [&'a str; N]) -> Self {
        Tags::List(&tags[..])
    }
}

impl<'a> From<&'a [(&'a str, &'a str)]> for Tags<'a> {
    fn from(pairs: &'a [(&'a str, &'a str)]) -> Self {
        Tags::Pairs(pairs)
    }
}

impl<'a, const N: usize> From<&'a [(&'a str, &'a str); N]> for Tags<'a> {
    fn from(pairs: &'a [(&'a str, &'a str); N]) -> Self {
        Tags::Pairs(&pairs[..])
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, normalize_name_bytes, normalize_tag, Tags};
    use crate::types::ErrorKind;
    use std::borrow::Cow;

    #[test]
    fn test_normalize_name_fast_path_borrows() {
        assert!(matches!(normalize_name("foo.bar"), Cow::Borrowed("foo.bar")));
    }

    #[test]
    fn test_normalize_name_replaces_each_reserved() {
        assert_eq!("fo_o", normalize_name("fo|o"));
        assert_eq!("fo_o", normalize_name("fo@o"));
        assert_eq!("fo_o", normalize_name("fo:o"));
        assert_eq!("___", normalize_name(":|@"));
    }

    #[test]
    fn test_normalize_name_keeps_multibyte() {
        assert_eq!("caf\u{e9}_latte", normalize_name("caf\u{e9}:latte"));
    }

    #[test]
    fn test_normalize_name_bytes_rejects_invalid_utf8() {
        let err = normalize_name_bytes(&[0x66, 0xff, 0x6f]).unwrap_err();
        assert_eq!(ErrorKind::InvalidInput, err.kind());
    }

    #[test]
    fn test_normalize_name_bytes_valid() {
        assert_eq!("a_b", normalize_name_bytes(b"a@b").unwrap());
    }

    #[test]
    fn test_normalize_tag_deletes_reserved() {
        assert_eq!("ign#ored", normalize_tag("ign#o|re,d"));
        assert!(matches!(normalize_tag("lol::class:omg::lol"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_tags_emptiness() {
        let empty_list: [&str; 0] = [];
        let empty_pairs: [(&str, &str); 0] = [];

        assert!(Tags::None.is_empty());
        assert!(Tags::from(&empty_list).is_empty());
        assert!(Tags::from(&empty_pairs).is_empty());
        assert!(!Tags::from(&["a"]).is_empty());
        assert!(!Tags::from(&[("a", "b")]).is_empty());
    }

    #[test]
    fn test_tags_len() {
        let empty_list: [&str; 0] = [];

        assert_eq!(0, Tags::None.len());
        assert_eq!(0, Tags::from(&empty_list).len());
        assert_eq!(2, Tags::from(&["a", "b"]).len());

        let pairs = Tags::from(&[("a", "1"), ("b", "2"), ("c", "3")]);
        assert_eq!(3, pairs.len());
        assert_eq!(pairs.len(), pairs.normalize().len());
    }

    #[test]
    fn test_tags_normalize_pairs() {
        let tags = Tags::from(&[("tag1", "v1"), ("tag2", "v|2")]);
        assert_eq!(vec!["tag1:v1".to_string(), "tag2:v2".to_string()], tags.normalize());
    }

    #[test]
    fn test_tags_normalize_pairs_reserved_in_key() {
        let tags = Tags::from(&[("a,b", "c|d"), ("plain", "")]);
        assert_eq!(vec!["ab:cd".to_string(), "plain:".to_string()], tags.normalize());
    }

    #[test]
    fn test_tags_normalize_list() {
        let tags = Tags::from(&["foo", "f,o|o"]);
        assert_eq!(vec!["foo".to_string(), "foo".to_string()], tags.normalize());
    }
}
