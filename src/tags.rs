//! Tag selection for the recorded CSV columns
//!
//! The host enables system tags by name; the sink records a fixed, sorted
//! subset of them as columns. Tags whose values change on nearly every
//! sample (per-VU and per-iteration identifiers) would explode column
//! cardinality without grouping value, so they are never recorded even
//! when enabled.

use crate::{Error, Result};
use std::collections::HashMap;

/// Canonical identifiers for the system tags the host may enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTag {
    Proto,
    SubProto,
    Status,
    Method,
    Url,
    Name,
    Group,
    Check,
    Error,
    ErrorCode,
    TlsVersion,
    Scenario,
    Service,
    ExpectedResponse,
    Ip,
    Vu,
    Iter,
}

impl SystemTag {
    /// Resolve a tag name to its canonical identifier.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "proto" => Ok(Self::Proto),
            "subproto" => Ok(Self::SubProto),
            "status" => Ok(Self::Status),
            "method" => Ok(Self::Method),
            "url" => Ok(Self::Url),
            "name" => Ok(Self::Name),
            "group" => Ok(Self::Group),
            "check" => Ok(Self::Check),
            "error" => Ok(Self::Error),
            "error_code" => Ok(Self::ErrorCode),
            "tls_version" => Ok(Self::TlsVersion),
            "scenario" => Ok(Self::Scenario),
            "service" => Ok(Self::Service),
            "expected_response" => Ok(Self::ExpectedResponse),
            "ip" => Ok(Self::Ip),
            "vu" => Ok(Self::Vu),
            "iter" => Ok(Self::Iter),
            other => Err(Error::UnknownTag(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proto => "proto",
            Self::SubProto => "subproto",
            Self::Status => "status",
            Self::Method => "method",
            Self::Url => "url",
            Self::Name => "name",
            Self::Group => "group",
            Self::Check => "check",
            Self::Error => "error",
            Self::ErrorCode => "error_code",
            Self::TlsVersion => "tls_version",
            Self::Scenario => "scenario",
            Self::Service => "service",
            Self::ExpectedResponse => "expected_response",
            Self::Ip => "ip",
            Self::Vu => "vu",
            Self::Iter => "iter",
        }
    }

    /// Tags whose value is effectively unique per sample.
    pub fn is_high_cardinality(&self) -> bool {
        matches!(self, Self::Vu | Self::Iter)
    }
}

/// Derive the fixed set of tag columns from the host's enabled-tag map.
///
/// Fails fast on unrecognized names. High-cardinality tags are excluded
/// regardless of their enabled flag. The result is sorted lexically
/// ascending, so the same input map always yields the same column order.
pub fn select_tags(enabled_system_tags: &HashMap<String, bool>) -> Result<Vec<String>> {
    let mut tags = Vec::new();

    for (name, enabled) in enabled_system_tags {
        let tag = SystemTag::from_name(name)?;

        if tag.is_high_cardinality() {
            continue;
        }

        if *enabled {
            tags.push(tag.as_str().to_string());
        }
    }

    tags.sort();

    Ok(tags)
}
