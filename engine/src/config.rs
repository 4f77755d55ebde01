//! Engine configuration with TOML file support.

use directsend_crypto::voter_keys_from_seed;
use directsend_types::{OutPoint, SecretKey, TxHash, VoterId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Confirmations reported for a locked transaction.
const DEFAULT_LOCK_DEPTH: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid hex in field {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },
}

/// Configuration for the locking subsystem.
///
/// Can be loaded from a TOML file via [`DirectsendConfig::from_toml_file`]
/// or built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectsendConfig {
    /// Master switch. When off, every query reports the subsystem disabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Confirmations reported by `confirmations()` for a locked tx.
    #[serde(default = "default_lock_depth")]
    pub lock_depth: u32,

    /// External command run when one of our transactions locks; `%s` is
    /// replaced with the tx-hash. Best-effort, never joined.
    #[serde(default)]
    pub notify_command: Option<String>,

    /// Present when this node is a voting masternode.
    #[serde(default)]
    pub masternode: Option<MasternodeConfig>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Identity of the local voting masternode.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MasternodeConfig {
    /// Collateral funding txid, hex.
    pub collateral_txid: String,
    /// Collateral output index.
    pub collateral_index: u32,
    /// 32-byte Ed25519 signing seed, hex.
    pub key_seed: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_lock_depth() -> u32 {
    DEFAULT_LOCK_DEPTH
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DirectsendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lock_depth: DEFAULT_LOCK_DEPTH,
            notify_command: None,
            masternode: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

impl DirectsendConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Build the local voter identity, if this node is configured as a
    /// masternode. Voting is skipped entirely when this returns `None`.
    pub fn local_voter(&self) -> Result<Option<LocalVoter>, ConfigError> {
        let Some(mn) = &self.masternode else {
            return Ok(None);
        };

        let txid: [u8; 32] = decode_hex_array(&mn.collateral_txid, "collateral_txid")?;
        let seed: [u8; 32] = decode_hex_array(&mn.key_seed, "key_seed")?;
        let keys = voter_keys_from_seed(&seed);

        Ok(Some(LocalVoter {
            id: VoterId::new(OutPoint::new(TxHash::new(txid), mn.collateral_index)),
            key: keys.secret,
        }))
    }
}

/// The local masternode's voting identity and signing seed.
pub struct LocalVoter {
    pub id: VoterId,
    pub key: SecretKey,
}

fn decode_hex_array(s: &str, field: &'static str) -> Result<[u8; 32], ConfigError> {
    let bytes = decode_hex(s).map_err(|reason| ConfigError::InvalidHex { field, reason })?;
    bytes.try_into().map_err(|_| ConfigError::InvalidHex {
        field,
        reason: "expected 32 bytes".to_string(),
    })
}

fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    if s.len() % 2 != 0 {
        return Err("odd length".to_string());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = DirectsendConfig::default();
        assert!(cfg.enabled);
        assert_eq!(cfg.lock_depth, DEFAULT_LOCK_DEPTH);
        assert!(cfg.notify_command.is_none());
        assert!(cfg.local_voter().unwrap().is_none());
    }

    #[test]
    fn parse_minimal_toml() {
        let cfg: DirectsendConfig = toml::from_str("").unwrap();
        assert!(cfg.enabled);
        assert_eq!(cfg.log_format, "human");
    }

    #[test]
    fn parse_masternode_section() {
        let cfg: DirectsendConfig = toml::from_str(
            r#"
            notify_command = "notify-send 'locked %s'"

            [masternode]
            collateral_txid = "0101010101010101010101010101010101010101010101010101010101010101"
            collateral_index = 1
            key_seed = "0202020202020202020202020202020202020202020202020202020202020202"
            "#,
        )
        .unwrap();

        let voter = cfg.local_voter().unwrap().expect("masternode configured");
        assert_eq!(voter.id.as_outpoint().txid, TxHash::new([1; 32]));
        assert_eq!(voter.id.as_outpoint().index, 1);
        assert!(cfg.notify_command.is_some());
    }

    #[test]
    fn bad_hex_is_rejected() {
        let cfg = DirectsendConfig {
            masternode: Some(MasternodeConfig {
                collateral_txid: "zz".to_string(),
                collateral_index: 0,
                key_seed: "00".repeat(32),
            }),
            ..Default::default()
        };
        assert!(matches!(
            cfg.local_voter(),
            Err(ConfigError::InvalidHex { field: "collateral_txid", .. })
        ));
    }

    #[test]
    fn short_seed_is_rejected() {
        let cfg = DirectsendConfig {
            masternode: Some(MasternodeConfig {
                collateral_txid: "00".repeat(32),
                collateral_index: 0,
                key_seed: "0011".to_string(),
            }),
            ..Default::default()
        };
        assert!(cfg.local_voter().is_err());
    }
}
