//! Comparable-company documents.
//!
//! A comparable set pairs the target company with a map of peers. Peers are
//! kept in the order they appear in the document because only the leading
//! peers are summarized.

use crate::fundamentals::{Overview, StatementSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Target company block of a comparable-analysis document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparableTarget {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ticker: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub industry: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sector: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub market_cap: Option<Value>,

  /// Headline figures in millions, keyed by label ("Sales ($M)", ...)
  #[serde(default)]
  pub financial_metrics: BTreeMap<String, Value>,

  #[serde(default)]
  pub financials: StatementSet,
}

/// One peer company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerEntry {
  #[serde(default)]
  pub financial_metrics: BTreeMap<String, Value>,

  #[serde(default, skip_serializing_if = "Overview::is_empty")]
  pub overview: Overview,

  #[serde(default)]
  pub financials: StatementSet,
}

impl PeerEntry {
  /// Profile of the peer. The profile nested in `financials` wins over the
  /// top-level one when it carries anything.
  pub fn profile(&self) -> &Overview {
    if self.financials.overview.is_empty() {
      &self.overview
    } else {
      &self.financials.overview
    }
  }
}

/// Target plus peers, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparableSet {
  #[serde(default)]
  pub target: ComparableTarget,

  #[serde(default, with = "ordered_peers")]
  pub peers: Vec<(String, PeerEntry)>,
}

impl ComparableSet {
  /// The first `max` peers in document order
  pub fn leading_peers(&self, max: usize) -> &[(String, PeerEntry)] {
    &self.peers[..self.peers.len().min(max)]
  }
}

/// Serde adapter that reads a JSON object into an ordered list of entries.
mod ordered_peers {
  use super::PeerEntry;
  use serde::de::{MapAccess, Visitor};
  use serde::ser::SerializeMap;
  use serde::{Deserializer, Serializer};
  use std::fmt;

  #[allow(clippy::ptr_arg)]
  pub fn serialize<S>(peers: &Vec<(String, PeerEntry)>, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let mut map = serializer.serialize_map(Some(peers.len()))?;
    for (ticker, entry) in peers {
      map.serialize_entry(ticker, entry)?;
    }
    map.end()
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, PeerEntry)>, D::Error>
  where
    D: Deserializer<'de>,
  {
    struct PeersVisitor;

    impl<'de> Visitor<'de> for PeersVisitor {
      type Value = Vec<(String, PeerEntry)>;

      fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map from ticker to peer entry")
      }

      fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
      where
        A: MapAccess<'de>,
      {
        let mut peers = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((ticker, entry)) = access.next_entry::<String, PeerEntry>()? {
          peers.push((ticker, entry));
        }
        Ok(peers)
      }
    }

    deserializer.deserialize_map(PeersVisitor)
  }
}
