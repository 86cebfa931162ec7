//! Principal and key material definitions
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


use crate::enctype::EncryptionType;
use crate::error::{KeyError, KeyResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a security principal, e.g. `host/a.example.org@EXAMPLE.ORG`.
///
/// Opaque: the only rule is that it is not empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrincipalName(String);

impl PrincipalName {
    pub fn new(name: impl Into<String>) -> KeyResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(KeyError::InvalidPrincipal(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PrincipalName {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PrincipalName> for String {
    fn from(name: PrincipalName) -> Self {
        name.0
    }
}

impl AsRef<str> for PrincipalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One key for one enctype
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterial {
    pub enctype: EncryptionType,
    /// Hex encoded key bytes
    pub secret: String,
}

impl KeyMaterial {
    pub fn new(enctype: EncryptionType, secret: impl Into<String>) -> Self {
        Self {
            enctype,
            secret: secret.into(),
        }
    }
}

/// Full persisted state of a principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRecord {
    pub principal: PrincipalName,
    /// Key version number, starts at 1
    pub kvno: u32,
    /// One key per enctype, in canonical enctype order
    pub keys: Vec<KeyMaterial>,
    /// When the principal was created
    pub created_at: i64,
    /// When the key set was last replaced
    pub updated_at: i64,
}

impl PrincipalRecord {
    /// Build the first version of a principal
    pub fn new(principal: PrincipalName, keys: Vec<KeyMaterial>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            principal,
            kvno: 1,
            keys,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the next version of this principal with a fresh key set
    pub fn rotated(&self, keys: Vec<KeyMaterial>) -> KeyResult<Self> {
        let kvno = self
            .kvno
            .checked_add(1)
            .ok_or_else(|| KeyError::VersionExhausted(self.principal.clone()))?;

        Ok(Self {
            principal: self.principal.clone(),
            kvno,
            keys,
            created_at: self.created_at,
            updated_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Check the structural invariants a decoded record must satisfy
    pub fn validate(&self) -> KeyResult<()> {
        if self.kvno == 0 {
            return Err(KeyError::corrupt(&self.principal, "kvno must be at least 1"));
        }
        if self.keys.is_empty() {
            return Err(KeyError::corrupt(&self.principal, "record has no keys"));
        }
        // Canonical order also rules out duplicates
        if self.keys.windows(2).any(|w| w[0].enctype >= w[1].enctype) {
            return Err(KeyError::corrupt(
                &self.principal,
                "keys are duplicated or out of canonical order",
            ));
        }
        if let Some(key) = self.keys.iter().find(|k| k.secret.is_empty()) {
            return Err(KeyError::corrupt(
                &self.principal,
                format!("empty secret for {}", key.enctype),
            ));
        }
        Ok(())
    }
}

/// Key material handed back to callers after create or extract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keytab {
    pub principal: PrincipalName,
    pub kvno: u32,
    pub keys: Vec<KeyMaterial>,
}

impl From<PrincipalRecord> for Keytab {
    fn from(record: PrincipalRecord) -> Self {
        Self {
            principal: record.principal,
            kvno: record.kvno,
            keys: record.keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> Vec<KeyMaterial> {
        vec![
            KeyMaterial::new(EncryptionType::Aes256CtsHmacSha1, "aa"),
            KeyMaterial::new(EncryptionType::Aes128CtsHmacSha1, "bb"),
        ]
    }

    #[test]
    fn test_principal_name_rejects_empty() {
        assert!(matches!(
            PrincipalName::new(""),
            Err(KeyError::InvalidPrincipal(_))
        ));
        assert!(serde_json::from_str::<PrincipalName>("\"\"").is_err());

        let name = PrincipalName::new("host/a.example.org@EXAMPLE.ORG").unwrap();
        assert_eq!(name.as_str(), "host/a.example.org@EXAMPLE.ORG");
    }

    #[test]
    fn test_new_record_starts_at_kvno_one() {
        let record = PrincipalRecord::new(PrincipalName::new("host/a").unwrap(), keys());
        assert_eq!(record.kvno, 1);
        assert_eq!(record.created_at, record.updated_at);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_rotation_bumps_kvno_by_one() {
        let record = PrincipalRecord::new(PrincipalName::new("host/a").unwrap(), keys());
        let next = record.rotated(keys()).unwrap();
        assert_eq!(next.kvno, 2);
        assert_eq!(next.created_at, record.created_at);
        assert_eq!(next.principal, record.principal);
    }

    #[test]
    fn test_rotation_refuses_to_wrap() {
        let mut record = PrincipalRecord::new(PrincipalName::new("host/a").unwrap(), keys());
        record.kvno = u32::MAX;
        assert!(matches!(
            record.rotated(keys()),
            Err(KeyError::VersionExhausted(_))
        ));
    }

    #[test]
    fn test_validate_rejects_broken_records() {
        let name = PrincipalName::new("host/a").unwrap();

        let mut record = PrincipalRecord::new(name.clone(), keys());
        record.kvno = 0;
        assert!(matches!(record.validate(), Err(KeyError::CorruptRecord { .. })));

        let record = PrincipalRecord::new(name.clone(), vec![]);
        assert!(matches!(record.validate(), Err(KeyError::CorruptRecord { .. })));

        let mut dup = keys();
        dup[1].enctype = EncryptionType::Aes256CtsHmacSha1;
        let record = PrincipalRecord::new(name, dup);
        assert!(matches!(record.validate(), Err(KeyError::CorruptRecord { .. })));
    }

    #[test]
    fn test_keytab_from_record() {
        let record = PrincipalRecord::new(PrincipalName::new("host/a").unwrap(), keys());
        let keytab = Keytab::from(record.clone());
        assert_eq!(keytab.principal, record.principal);
        assert_eq!(keytab.kvno, 1);
        assert_eq!(keytab.keys, record.keys);
    }
}
