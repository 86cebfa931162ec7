//! Key material generation
//!
//! The state machine never creates key bytes itself; it asks a
//! [`KeyGenerator`]. The reference [`RandomKeyGenerator`] produces random
//! bytes of the right length for each enctype. A deployment talking to a real
//! KDC swaps in a generator that performs proper string-to-key derivation.
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


use crate::enctype::EnctypeSet;
use crate::error::{KeyError, KeyResult};
use crate::principal::KeyMaterial;
use rand::rngs::OsRng;
use rand::RngCore;

/// Produces a complete key set for a set of enctypes
pub trait KeyGenerator: Send + Sync {
    /// One key per enctype, in the set's canonical order
    fn generate(&self, enctypes: &EnctypeSet) -> KeyResult<Vec<KeyMaterial>>;
}

/// Random key generator backed by the OS RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomKeyGenerator;

impl RandomKeyGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl KeyGenerator for RandomKeyGenerator {
    fn generate(&self, enctypes: &EnctypeSet) -> KeyResult<Vec<KeyMaterial>> {
        enctypes
            .iter()
            .map(|enctype| {
                let mut bytes = vec![0u8; enctype.key_len()];
                OsRng
                    .try_fill_bytes(&mut bytes)
                    .map_err(|e| KeyError::KeyGeneration(format!("RNG failure: {}", e)))?;
                Ok(KeyMaterial::new(*enctype, hex::encode(bytes)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enctype::{default_enctypes, EncryptionType};

    #[test]
    fn test_one_key_per_enctype_in_order() {
        let set = EnctypeSet::new([
            EncryptionType::Camellia128CtsCmac,
            EncryptionType::Aes256CtsHmacSha1,
            EncryptionType::Aes128CtsHmacSha1,
        ])
        .unwrap();

        let keys = RandomKeyGenerator::new().generate(&set).unwrap();
        let enctypes: Vec<_> = keys.iter().map(|k| k.enctype).collect();
        assert_eq!(enctypes, set.as_slice());
    }

    #[test]
    fn test_secret_length_matches_enctype() {
        let keys = RandomKeyGenerator::new()
            .generate(&default_enctypes())
            .unwrap();
        for key in keys {
            let bytes = hex::decode(&key.secret).unwrap();
            assert_eq!(bytes.len(), key.enctype.key_len());
        }
    }

    #[test]
    fn test_consecutive_sets_differ() {
        let generator = RandomKeyGenerator::new();
        let set = default_enctypes();
        let first = generator.generate(&set).unwrap();
        let second = generator.generate(&set).unwrap();
        assert_ne!(first, second);
    }
}
