//! HMAC-SHA256 signing and verification of log records.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use triad_contracts::{
    audit::{LogEntry, LogRecord},
    error::{TriadError, TriadResult},
};

use crate::canonical::canonical_record;

type HmacSha256 = Hmac<Sha256>;

/// Holds the shared secret. Cloning shares nothing mutable.
#[derive(Clone)]
pub struct HmacSigner {
    key: Vec<u8>,
}

impl fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSigner").field("key", &"<redacted>").finish()
    }
}

impl HmacSigner {
    /// Returns `TriadError::Configuration` for an empty secret.
    pub fn new(secret: impl AsRef<[u8]>) -> TriadResult<Self> {
        let key = secret.as_ref().to_vec();
        if key.is_empty() {
            return Err(TriadError::Configuration {
                reason: "audit secret must not be empty".to_string(),
            });
        }
        Ok(Self { key })
    }

    fn mac(&self) -> TriadResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| TriadError::Configuration {
            reason: format!("invalid audit secret: {}", e),
        })
    }

    /// Lowercase hex HMAC of the record's canonical bytes.
    pub fn sign(&self, record: &LogRecord) -> TriadResult<String> {
        let mut mac = self.mac()?;
        mac.update(&canonical_record(record)?);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time check of `entry.hmac` against its record.
    ///
    /// A signature that is not valid hex simply fails verification.
    pub fn verify(&self, entry: &LogEntry) -> TriadResult<bool> {
        let Ok(expected) = hex::decode(&entry.hmac) else {
            return Ok(false);
        };
        let mut mac = self.mac()?;
        mac.update(&canonical_record(&entry.record)?);
        Ok(mac.verify_slice(&expected).is_ok())
    }

    /// Timestamp and sign a new record.
    pub fn seal(&self, payload: &Value, extra: &Value) -> TriadResult<LogEntry> {
        let record = LogRecord {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            payload: payload.clone(),
            extra: extra.clone(),
        };
        let hmac = self.sign(&record)?;
        Ok(LogEntry { record, hmac })
    }
}

/// Verify every entry; the first failure is reported by its index.
pub fn verify_entries(signer: &HmacSigner, entries: &[LogEntry]) -> TriadResult<()> {
    for (index, entry) in entries.iter().enumerate() {
        if !signer.verify(entry)? {
            return Err(TriadError::Signature { index });
        }
    }
    Ok(())
}
