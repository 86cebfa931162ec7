//! Encryption type identifiers
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::error::{KeyError, KeyResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported encryption types.
///
/// Declaration order is the canonical order of a key set: strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EncryptionType {
    #[serde(rename = "aes256-cts-hmac-sha384-192")]
    Aes256CtsHmacSha384,
    #[serde(rename = "aes128-cts-hmac-sha256-128")]
    Aes128CtsHmacSha256,
    #[serde(rename = "aes256-cts-hmac-sha1-96")]
    Aes256CtsHmacSha1,
    #[serde(rename = "aes128-cts-hmac-sha1-96")]
    Aes128CtsHmacSha1,
    #[serde(rename = "camellia256-cts-cmac")]
    Camellia256CtsCmac,
    #[serde(rename = "camellia128-cts-cmac")]
    Camellia128CtsCmac,
}

impl EncryptionType {
    pub const ALL: [EncryptionType; 6] = [
        EncryptionType::Aes256CtsHmacSha384,
        EncryptionType::Aes128CtsHmacSha256,
        EncryptionType::Aes256CtsHmacSha1,
        EncryptionType::Aes128CtsHmacSha1,
        EncryptionType::Camellia256CtsCmac,
        EncryptionType::Camellia128CtsCmac,
    ];

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            EncryptionType::Aes256CtsHmacSha384 => "aes256-cts-hmac-sha384-192",
            EncryptionType::Aes128CtsHmacSha256 => "aes128-cts-hmac-sha256-128",
            EncryptionType::Aes256CtsHmacSha1 => "aes256-cts-hmac-sha1-96",
            EncryptionType::Aes128CtsHmacSha1 => "aes128-cts-hmac-sha1-96",
            EncryptionType::Camellia256CtsCmac => "camellia256-cts-cmac",
            EncryptionType::Camellia128CtsCmac => "camellia128-cts-cmac",
        }
    }

    /// Key length in bytes
    pub fn key_len(&self) -> usize {
        match self {
            EncryptionType::Aes256CtsHmacSha384
            | EncryptionType::Aes256CtsHmacSha1
            | EncryptionType::Camellia256CtsCmac => 32,
            EncryptionType::Aes128CtsHmacSha256
            | EncryptionType::Aes128CtsHmacSha1
            | EncryptionType::Camellia128CtsCmac => 16,
        }
    }
}

impl fmt::Display for EncryptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EncryptionType {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EncryptionType::ALL
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| KeyError::UnsupportedEnctype(s.to_string()))
    }
}

/// The configured set of enctypes keys are generated for.
///
/// Never empty, no duplicates, always in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnctypeSet(Vec<EncryptionType>);

impl EnctypeSet {
    pub fn new(enctypes: impl IntoIterator<Item = EncryptionType>) -> KeyResult<Self> {
        let mut set: Vec<EncryptionType> = enctypes.into_iter().collect();
        set.sort();
        set.dedup();
        if set.is_empty() {
            return Err(KeyError::Configuration(
                "At least one enctype must be configured".to_string(),
            ));
        }
        Ok(Self(set))
    }

    /// Parse a list of enctype names, rejecting any unknown name
    pub fn parse<S: AsRef<str>>(names: &[S]) -> KeyResult<Self> {
        let parsed = names
            .iter()
            .map(|n| n.as_ref().parse::<EncryptionType>())
            .collect::<KeyResult<Vec<_>>>()?;
        Self::new(parsed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EncryptionType> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[EncryptionType] {
        &self.0
    }
}

/// The set configuration falls back to when `KEYFORGE_ENCTYPES` is unset
#[cfg(test)]
pub(crate) fn default_enctypes() -> EnctypeSet {
    let names: Vec<&str> = keyforge_config::DEFAULT_ENCTYPES.split(',').collect();
    EnctypeSet::parse(&names).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "aes256-cts-hmac-sha1-96".parse::<EncryptionType>().unwrap(),
            EncryptionType::Aes256CtsHmacSha1
        );
        assert_eq!(
            " AES128-CTS-HMAC-SHA1-96 ".parse::<EncryptionType>().unwrap(),
            EncryptionType::Aes128CtsHmacSha1
        );
        assert!(matches!(
            "des-cbc-crc".parse::<EncryptionType>(),
            Err(KeyError::UnsupportedEnctype(_))
        ));
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        for enctype in EncryptionType::ALL {
            let json = serde_json::to_string(&enctype).unwrap();
            assert_eq!(json, format!("\"{}\"", enctype.name()));
            let back: EncryptionType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, enctype);
        }
    }

    #[test]
    fn test_set_is_canonical() {
        let set = EnctypeSet::parse(&[
            "aes128-cts-hmac-sha1-96",
            "aes256-cts-hmac-sha1-96",
            "aes128-cts-hmac-sha1-96",
        ])
        .unwrap();
        assert_eq!(
            set.as_slice(),
            &[
                EncryptionType::Aes256CtsHmacSha1,
                EncryptionType::Aes128CtsHmacSha1
            ]
        );
        assert_eq!(set, default_enctypes());
    }

    #[test]
    fn test_default_set_follows_config() {
        let config = keyforge_config::AppConfig::from_vars(Default::default()).unwrap();
        let configured = EnctypeSet::parse(&config.enctype_names()).unwrap();
        assert_eq!(configured, default_enctypes());
        assert_eq!(
            configured.as_slice(),
            &[
                EncryptionType::Aes256CtsHmacSha1,
                EncryptionType::Aes128CtsHmacSha1
            ]
        );
    }

    #[test]
    fn test_set_rejects_empty_and_unknown() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            EnctypeSet::parse(&empty),
            Err(KeyError::Configuration(_))
        ));
        assert!(matches!(
            EnctypeSet::parse(&["aes256-cts-hmac-sha1-96", "rc4-hmac"]),
            Err(KeyError::UnsupportedEnctype(name)) if name == "rc4-hmac"
        ));
    }

    #[test]
    fn test_key_lengths() {
        assert_eq!(EncryptionType::Aes256CtsHmacSha1.key_len(), 32);
        assert_eq!(EncryptionType::Aes128CtsHmacSha1.key_len(), 16);
        assert_eq!(EncryptionType::Camellia128CtsCmac.key_len(), 16);
    }
}
