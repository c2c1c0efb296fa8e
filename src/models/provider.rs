use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// One of the four chat-completion services queried side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Claude,
    ChatGpt,
    Grok,
    Perplexity,
}

impl ProviderId {
    /// Every provider in display order (top-left, top-right, bottom-left, bottom-right).
    pub const ALL: [ProviderId; 4] =
        [ProviderId::Claude, ProviderId::ChatGpt, ProviderId::Grok, ProviderId::Perplexity];

    /// Position of this provider in [`ProviderId::ALL`]
    pub fn index(self) -> usize {
        match self {
            ProviderId::Claude => 0,
            ProviderId::ChatGpt => 1,
            ProviderId::Grok => 2,
            ProviderId::Perplexity => 3,
        }
    }

    /// Stable lowercase key, matches the serialized form
    pub fn key(self) -> &'static str {
        match self {
            ProviderId::Claude => "claude",
            ProviderId::ChatGpt => "chatgpt",
            ProviderId::Grok => "grok",
            ProviderId::Perplexity => "perplexity",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProviderId::Claude => "Claude",
            ProviderId::ChatGpt => "ChatGPT",
            ProviderId::Grok => "Grok",
            ProviderId::Perplexity => "Perplexity",
        }
    }

    /// Next provider in display order, wrapping around
    pub fn next(self) -> ProviderId {
        ProviderId::ALL[(self.index() + 1) % ProviderId::ALL.len()]
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Fixed-size map holding exactly one value per provider.
///
/// Serializes as a JSON object keyed by [`ProviderId::key`]. Keys missing from the
/// serialized form are filled with `T::default()`, so a deserialized map always
/// carries all four providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMap<T> {
    values: [T; 4],
}

impl<T> ProviderMap<T> {
    pub fn from_fn(mut f: impl FnMut(ProviderId) -> T) -> Self {
        Self { values: std::array::from_fn(|idx| f(ProviderId::ALL[idx])) }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProviderId, &T)> {
        ProviderId::ALL.into_iter().zip(self.values.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ProviderId, &mut T)> {
        ProviderId::ALL.into_iter().zip(self.values.iter_mut())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }
}

impl<T: Default> Default for ProviderMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<ProviderId> for ProviderMap<T> {
    type Output = T;

    fn index(&self, provider: ProviderId) -> &T {
        &self.values[provider.index()]
    }
}

impl<T> IndexMut<ProviderId> for ProviderMap<T> {
    fn index_mut(&mut self, provider: ProviderId) -> &mut T {
        &mut self.values[provider.index()]
    }
}

impl<T: Serialize> Serialize for ProviderMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (provider, value) in self.iter() {
            map.serialize_entry(&provider, value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for ProviderMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<ProviderId, T>::deserialize(deserializer)?;
        let mut map = ProviderMap::default();
        for (provider, value) in raw {
            map[provider] = value;
        }
        Ok(map)
    }
}
