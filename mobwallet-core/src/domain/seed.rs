//! Account seed codec
//!
//! A seed can be given in three forms, tried in this order:
//!
//! 1. 64 hex characters of root entropy
//! 2. a 24-word BIP-39 English mnemonic
//! 3. a path to a JSON recovery file (`root_entropy` + `first_block_index`),
//!    such as one written by [`ExportRecord::write_to`]
//!
//! Hex is tried first because a 32-byte hex string is unambiguous. Each form
//! has a pure classifier that either matches or does not; only the recovery
//! file branch touches the filesystem and it is the last resort.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use bip39::{Language, Mnemonic};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::account::Account;
use super::result::{Error, Result};
use super::wire::u64_from_str_or_num;

/// Length of account root entropy in bytes
pub const ENTROPY_LEN: usize = 32;

/// 32 bytes of account root entropy
///
/// Wiped from memory on drop. `Debug` never prints the bytes.
#[derive(Clone)]
pub struct SecretEntropy(Zeroizing<[u8; ENTROPY_LEN]>);

impl SecretEntropy {
    pub fn from_bytes(bytes: [u8; ENTROPY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Returns `None` unless `bytes` is exactly 32 bytes long
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != ENTROPY_LEN {
            return None;
        }
        let mut buf = Zeroizing::new([0u8; ENTROPY_LEN]);
        buf.copy_from_slice(bytes);
        Some(Self(buf))
    }

    pub fn as_bytes(&self) -> &[u8; ENTROPY_LEN] {
        &self.0
    }

    /// Lowercase hex encoding, as expected by the wallet server
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&self.0[..]))
    }
}

impl PartialEq for SecretEntropy {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

impl Eq for SecretEntropy {}

impl std::fmt::Debug for SecretEntropy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretEntropy(<redacted>)")
    }
}

/// Which encoding a seed was given in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedKind {
    HexEntropy,
    Mnemonic,
    RecoveryFile,
}

impl SeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedKind::HexEntropy => "hex_entropy",
            SeedKind::Mnemonic => "mnemonic",
            SeedKind::RecoveryFile => "recovery_file",
        }
    }
}

/// A seed string after classification
#[derive(Debug)]
pub enum SeedInput {
    HexEntropy(SecretEntropy),
    Mnemonic(SecretEntropy),
    /// Not hex or mnemonic; may still be a recovery file on disk
    RecoveryFile(PathBuf),
}

impl SeedInput {
    /// Classify a user-supplied seed string, first match wins
    pub fn classify(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_seed("seed is empty"));
        }

        if let Some(entropy) = parse_hex_entropy(trimmed) {
            return Ok(SeedInput::HexEntropy(entropy));
        }
        if let Some(entropy) = parse_mnemonic(trimmed) {
            return Ok(SeedInput::Mnemonic(entropy));
        }
        Ok(SeedInput::RecoveryFile(PathBuf::from(trimmed)))
    }

    pub fn kind(&self) -> SeedKind {
        match self {
            SeedInput::HexEntropy(_) => SeedKind::HexEntropy,
            SeedInput::Mnemonic(_) => SeedKind::Mnemonic,
            SeedInput::RecoveryFile(_) => SeedKind::RecoveryFile,
        }
    }

    /// Resolve to entropy, reading the recovery file if needed
    pub fn into_decoded(self) -> Result<DecodedSeed> {
        match self {
            SeedInput::HexEntropy(entropy) => Ok(DecodedSeed {
                entropy,
                first_block_index: None,
                kind: SeedKind::HexEntropy,
            }),
            SeedInput::Mnemonic(entropy) => Ok(DecodedSeed {
                entropy,
                first_block_index: None,
                kind: SeedKind::Mnemonic,
            }),
            SeedInput::RecoveryFile(path) => read_recovery_file(&path),
        }
    }
}

/// Canonical form of a seed
#[derive(Debug)]
pub struct DecodedSeed {
    pub entropy: SecretEntropy,
    /// Only recovery files carry a starting block
    pub first_block_index: Option<u64>,
    pub kind: SeedKind,
}

/// Decode a seed given in any supported form
pub fn decode(input: &str) -> Result<DecodedSeed> {
    SeedInput::classify(input)?.into_decoded()
}

/// Encode entropy as a BIP-39 English mnemonic
pub fn encode(entropy: &SecretEntropy) -> Result<Zeroizing<String>> {
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy.as_bytes())
        .map_err(|e| Error::invalid_seed(format!("cannot encode entropy: {}", e)))?;
    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// Strict hex: whole string, exactly 32 bytes
pub fn parse_hex_entropy(input: &str) -> Option<SecretEntropy> {
    let bytes = Zeroizing::new(hex::decode(input).ok()?);
    SecretEntropy::from_slice(&bytes)
}

/// Checksum-validated English mnemonic carrying exactly 32 bytes of entropy
pub fn parse_mnemonic(input: &str) -> Option<SecretEntropy> {
    let normalized = Zeroizing::new(input.to_lowercase());
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, &normalized).ok()?;
    let bytes = Zeroizing::new(mnemonic.to_entropy());
    SecretEntropy::from_slice(&bytes)
}

/// Fields required from a recovery file; export files carry more
#[derive(Deserialize)]
struct RecoveryFile {
    root_entropy: String,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    first_block_index: u64,
}

/// Read a JSON recovery file
///
/// Error messages mention what went wrong but never the file contents.
pub fn read_recovery_file(path: &Path) -> Result<DecodedSeed> {
    let content = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
        Error::invalid_seed(format!(
            "not 32-byte hex or a 24-word seed phrase, and not a readable seed file ({})",
            e
        ))
    })?);

    let file: RecoveryFile = serde_json::from_str(&content).map_err(|e| {
        Error::invalid_seed(format!(
            "seed file is not valid JSON with root_entropy and first_block_index (line {}, column {})",
            e.line(),
            e.column()
        ))
    })?;

    let root_entropy = Zeroizing::new(file.root_entropy);
    let entropy = parse_hex_entropy(root_entropy.trim())
        .ok_or_else(|| Error::invalid_seed("seed file root_entropy is not 32 bytes of hex"))?;

    Ok(DecodedSeed {
        entropy,
        first_block_index: Some(file.first_block_index),
        kind: SeedKind::RecoveryFile,
    })
}

/// Everything needed to restore an account, as written to an export file
#[derive(Clone, Serialize, Deserialize)]
pub struct ExportRecord {
    pub seed_phrase: String,
    pub root_entropy: String,
    pub account_id: String,
    pub account_name: String,
    pub account_key: serde_json::Value,
    pub first_block_index: u64,
}

impl std::fmt::Debug for ExportRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportRecord")
            .field("account_id", &self.account_id)
            .field("account_name", &self.account_name)
            .field("first_block_index", &self.first_block_index)
            .finish_non_exhaustive()
    }
}

impl Drop for ExportRecord {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.seed_phrase.zeroize();
        self.root_entropy.zeroize();
    }
}

impl ExportRecord {
    /// Assemble an export record; no side effects
    pub fn build(
        account: &Account,
        entropy: &SecretEntropy,
        account_key: serde_json::Value,
    ) -> Result<Self> {
        let seed_phrase = encode(entropy)?;
        Ok(Self {
            seed_phrase: seed_phrase.to_string(),
            root_entropy: entropy.to_hex().to_string(),
            account_id: account.account_id.clone(),
            account_name: account.name.clone(),
            account_key,
            first_block_index: account.first_block_index.unwrap_or(0),
        })
    }

    /// File name used when the caller does not choose one
    pub fn default_file_name(&self) -> String {
        let prefix: String = self.account_id.chars().take(16).collect();
        format!("mobilecoin_seed_phrase_{}.json", prefix)
    }

    /// Pretty JSON, four-space indent, trailing newline
    pub fn to_json(&self) -> Result<Zeroizing<String>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        let text = String::from_utf8(buf)
            .map_err(|e| Error::validation(format!("export is not UTF-8: {}", e)))?;
        Ok(Zeroizing::new(text))
    }

    /// Write the record to a new file
    ///
    /// Refuses to overwrite an existing file. On Unix the file is created
    /// readable by the owner only.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}
