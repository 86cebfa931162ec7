//! File-backed principal store
//!
//! Each principal owns a directory named after the hex SHA-256 of its name, so
//! distinct names never share a path and long names never exceed file name
//! limits. Inside it every key version is its own immutable document,
//! `<kvno>.principal`. The highest kvno present is the current state; older
//! versions stay behind as history. Documents are wrapped in an envelope
//! carrying a format number and a SHA-256 checksum of the record, which lets
//! truncated or hand-edited files surface as `CorruptRecord` instead of being
//! trusted.
//!
//! Writes go to a fsynced temp file first and are then published:
//! - `insert` and `compare_and_swap` hard-link the temp file to the path of
//!   the version they create. The link fails if that version already exists,
//!   so exactly one writer claims each kvno, even across processes.
//! - `write` renames over its own version and drops any newer ones.
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
use crate::principal::{PrincipalName, PrincipalRecord};
use crate::store::PrincipalStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Extension of published version documents
const RECORD_EXTENSION: &str = "principal";

/// Current on-disk document format
const FORMAT_VERSION: u32 = 1;

/// How often a read looks again after the current version vanished under it
const READ_ATTEMPTS: u32 = 3;

/// On-disk document
#[derive(Debug, Serialize, Deserialize)]
struct RecordEnvelope {
    format: u32,
    /// Hex SHA-256 of the compact JSON encoding of `record`
    checksum: String,
    record: PrincipalRecord,
}

/// Just enough of a document to learn whose it is
#[derive(Deserialize)]
struct EnvelopeOwner {
    record: RecordOwner,
}

#[derive(Deserialize)]
struct RecordOwner {
    principal: PrincipalName,
}

fn checksum(record: &PrincipalRecord) -> KeyResult<String> {
    let bytes = serde_json::to_vec(record)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

fn version_file_name(kvno: u32) -> String {
    format!("{}.{}", kvno, RECORD_EXTENSION)
}

/// Key version a file name publishes, if it is a version document
fn parse_version(file_name: &str) -> Option<u32> {
    let stem = file_name.strip_suffix(RECORD_EXTENSION)?.strip_suffix('.')?;
    let kvno: u32 = stem.parse().ok()?;
    // "01.principal" is not the document for kvno 1
    (kvno.to_string() == stem).then_some(kvno)
}

/// Published versions in a principal directory, ascending
async fn versions(dir: &Path) -> KeyResult<Vec<u32>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut found = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Some(kvno) = entry.file_name().to_str().and_then(parse_version) {
            found.push(kvno);
        }
    }
    found.sort_unstable();
    Ok(found)
}

/// Bytes of the current version in a principal directory
async fn read_current(dir: &Path) -> KeyResult<Option<(u32, Vec<u8>)>> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let Some(kvno) = versions(dir).await?.last().copied() else {
            return Ok(None);
        };
        match fs::read(dir.join(version_file_name(kvno))).await {
            Ok(bytes) => return Ok(Some((kvno, bytes))),
            // Dropped by a concurrent `write`
            Err(e) if e.kind() == ErrorKind::NotFound && attempt < READ_ATTEMPTS => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Principal store keeping one directory of versions per principal
pub struct FilePrincipalStore {
    /// Storage directory
    storage_path: PathBuf,
}

impl FilePrincipalStore {
    /// Open a store rooted at `storage_path`, creating the directory if needed
    pub async fn new<P: AsRef<Path>>(storage_path: P) -> KeyResult<Self> {
        let storage_path = storage_path.as_ref().to_path_buf();
        fs::create_dir_all(&storage_path).await?;

        info!(path = %storage_path.display(), "Opened file principal store");

        Ok(Self { storage_path })
    }

    /// Directory holding every version of a principal
    pub fn principal_dir(&self, principal: &PrincipalName) -> PathBuf {
        let digest = Sha256::digest(principal.as_str().as_bytes());
        self.storage_path.join(hex::encode(digest))
    }

    /// Path of the document for one key version of a principal
    pub fn version_path(&self, principal: &PrincipalName, kvno: u32) -> PathBuf {
        self.principal_dir(principal).join(version_file_name(kvno))
    }

    fn temp_path(&self, principal: &PrincipalName) -> PathBuf {
        self.principal_dir(principal)
            .join(format!(".{}.tmp", Uuid::new_v4().simple()))
    }

    async fn current_kvno(&self, principal: &PrincipalName) -> KeyResult<Option<u32>> {
        Ok(versions(&self.principal_dir(principal)).await?.last().copied())
    }

    fn encode(record: &PrincipalRecord) -> KeyResult<Vec<u8>> {
        let envelope = RecordEnvelope {
            format: FORMAT_VERSION,
            checksum: checksum(record)?,
            record: record.clone(),
        };
        Ok(serde_json::to_vec_pretty(&envelope)?)
    }

    fn decode(principal: &PrincipalName, kvno: u32, bytes: &[u8]) -> KeyResult<PrincipalRecord> {
        let envelope: RecordEnvelope = serde_json::from_slice(bytes)
            .map_err(|e| KeyError::corrupt(principal, format!("malformed document: {}", e)))?;

        if envelope.format != FORMAT_VERSION {
            return Err(KeyError::corrupt(
                principal,
                format!("unsupported document format {}", envelope.format),
            ));
        }

        let record = envelope.record;
        if &record.principal != principal {
            return Err(KeyError::corrupt(
                principal,
                format!("document belongs to {}", record.principal),
            ));
        }
        if checksum(&record)? != envelope.checksum {
            return Err(KeyError::corrupt(principal, "checksum mismatch"));
        }
        if record.kvno != kvno {
            return Err(KeyError::corrupt(
                principal,
                format!("document for kvno {} stored as version {}", record.kvno, kvno),
            ));
        }
        record.validate()?;

        Ok(record)
    }

    async fn load(&self, principal: &PrincipalName) -> KeyResult<PrincipalRecord> {
        match read_current(&self.principal_dir(principal)).await? {
            Some((kvno, bytes)) => Self::decode(principal, kvno, &bytes),
            None => Err(KeyError::PrincipalNotFound(principal.clone())),
        }
    }

    /// Write the encoded record to a fresh temp file and flush it to disk
    async fn stage(&self, record: &PrincipalRecord) -> KeyResult<PathBuf> {
        let bytes = Self::encode(record)?;
        fs::create_dir_all(self.principal_dir(&record.principal)).await?;
        let temp_path = self.temp_path(&record.principal);

        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            Ok::<(), std::io::Error>(())
        }
        .await;

        match result {
            Ok(()) => Ok(temp_path),
            Err(e) => {
                discard(&temp_path).await;
                Err(e.into())
            }
        }
    }

    /// Publish the staged document as `record.kvno` unless that version exists.
    ///
    /// Returns `false` when another writer already holds the version.
    async fn claim(&self, temp_path: &Path, record: &PrincipalRecord) -> KeyResult<bool> {
        let target = self.version_path(&record.principal, record.kvno);
        let linked = fs::hard_link(temp_path, &target).await;
        discard(temp_path).await;

        match linked {
            Ok(()) => {
                self.sync_dirs(&record.principal).await?;
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace `record.kvno` with the staged document and drop newer versions
    async fn overwrite(&self, temp_path: &Path, record: &PrincipalRecord) -> KeyResult<()> {
        let target = self.version_path(&record.principal, record.kvno);
        if let Err(e) = fs::rename(temp_path, &target).await {
            discard(temp_path).await;
            return Err(e.into());
        }

        let dir = self.principal_dir(&record.principal);
        for newer in versions(&dir).await?.into_iter().filter(|v| *v > record.kvno) {
            match fs::remove_file(dir.join(version_file_name(newer))).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.sync_dirs(&record.principal).await
    }

    #[cfg(unix)]
    async fn sync_dirs(&self, principal: &PrincipalName) -> KeyResult<()> {
        for dir in [self.principal_dir(principal), self.storage_path.clone()] {
            fs::File::open(&dir).await?.sync_all().await?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    async fn sync_dirs(&self, _principal: &PrincipalName) -> KeyResult<()> {
        Ok(())
    }

    /// Owner of the current document in a principal directory, if it can be told
    async fn owner_of(&self, dir: &Path) -> KeyResult<Option<PrincipalName>> {
        let Some((_, bytes)) = read_current(dir).await? else {
            return Ok(None);
        };

        let owner = match serde_json::from_slice::<EnvelopeOwner>(&bytes) {
            Ok(envelope) => envelope.record.principal,
            Err(e) => {
                warn!(
                    path = %dir.display(),
                    error = %e,
                    "Cannot tell whose principal directory this is"
                );
                return Ok(None);
            }
        };

        if self.principal_dir(&owner) != dir {
            warn!(
                path = %dir.display(),
                principal = %owner,
                "Document stored under the wrong directory"
            );
            return Ok(None);
        }
        Ok(Some(owner))
    }
}

/// Best-effort removal of a temp file
async fn discard(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %temp_path.display(), error = %e, "Failed to remove temp file");
        }
    }
}

#[async_trait]
impl PrincipalStore for FilePrincipalStore {
    async fn exists(&self, principal: &PrincipalName) -> KeyResult<bool> {
        Ok(self.current_kvno(principal).await?.is_some())
    }

    async fn read(&self, principal: &PrincipalName) -> KeyResult<PrincipalRecord> {
        self.load(principal).await
    }

    async fn write(&self, record: &PrincipalRecord) -> KeyResult<()> {
        let temp_path = self.stage(record).await?;
        self.overwrite(&temp_path, record).await?;

        debug!(principal = %record.principal, kvno = record.kvno, "Record written");
        Ok(())
    }

    async fn insert(&self, record: &PrincipalRecord) -> KeyResult<()> {
        if self.current_kvno(&record.principal).await?.is_some() {
            return Err(KeyError::PrincipalAlreadyExists(record.principal.clone()));
        }

        let temp_path = self.stage(record).await?;
        if !self.claim(&temp_path, record).await? {
            return Err(KeyError::PrincipalAlreadyExists(record.principal.clone()));
        }

        debug!(principal = %record.principal, kvno = record.kvno, "Record inserted");
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        expected_kvno: u32,
        record: &PrincipalRecord,
    ) -> KeyResult<()> {
        let current = self.load(&record.principal).await?;
        if current.kvno != expected_kvno {
            return Err(KeyError::VersionConflict {
                principal: record.principal.clone(),
                expected: expected_kvno,
                found: current.kvno,
            });
        }

        let temp_path = self.stage(record).await?;
        if !self.claim(&temp_path, record).await? {
            let found = self
                .current_kvno(&record.principal)
                .await?
                .unwrap_or(expected_kvno);
            return Err(KeyError::VersionConflict {
                principal: record.principal.clone(),
                expected: expected_kvno,
                found,
            });
        }

        debug!(principal = %record.principal, kvno = record.kvno, "Record swapped");
        Ok(())
    }

    async fn list(&self) -> KeyResult<Vec<PrincipalName>> {
        let mut names = Vec::new();

        let mut entries = fs::read_dir(&self.storage_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_dir() {
                warn!(path = %path.display(), "Ignoring unrecognised file in store");
                continue;
            }
            if let Some(name) = self.owner_of(&path).await? {
                names.push(name);
            }
        }

        names.sort();
        debug!("Listed {} principals", names.len());
        Ok(names)
    }

    fn backend_name(&self) -> &str {
        "file"
    }
}
