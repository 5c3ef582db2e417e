//! Layered session configuration.
//!
//! Config is a stack of YAML files merged in order (base -> environment ->
//! local override): later files win, maps merge recursively, everything
//! else replaces. The merged form is hashed (SHA-256 of canonical JSON) so
//! logs can record exactly which configuration a session ran with.
//!
//! Configs must never embed signing material. [`scan_for_secrets`] refuses
//! any config whose leaf strings look like key material; the wallet section
//! names an environment variable instead.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Leaf-string shapes that indicate embedded key material.
const SECRET_PREFIXES: &[&str] = &[
    "-----BEGIN", // PEM private keys
    "xprv",       // BIP-32 extended private keys
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSection {
    /// RPC endpoint of the ledger node the live transport connects to.
    pub endpoint: String,
    /// Address of the deck contract on that ledger.
    pub deck_contract: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSection {
    /// Account the session acts as.
    pub account: String,
    /// Name of the environment variable holding the signing key. The key
    /// itself never appears in config files.
    #[serde(default)]
    pub key_env: Option<String>,
}

/// Typed view of the merged configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub ledger: LedgerSection,
    pub wallet: WalletSection,
}

/// Merge the YAML files at `paths` in order and return the combined value.
pub fn merged_value(paths: &[impl AsRef<Path>]) -> Result<Value> {
    let mut merged = Value::Object(serde_json::Map::new());
    for path in paths {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let layer: Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        merge(&mut merged, layer);
    }
    Ok(merged)
}

/// Load, merge, secret-scan, and deserialize the layered configuration.
pub fn load_layered(paths: &[impl AsRef<Path>]) -> Result<SessionConfig> {
    let merged = merged_value(paths)?;
    scan_for_secrets(&merged)?;
    serde_json::from_value(merged).context("config is missing required keys")
}

/// Recursive merge: objects merge key-by-key, anything else is replaced by
/// the overlay.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}

/// SHA-256 over the canonical JSON form of the merged config.
///
/// `serde_json` keeps object keys sorted, so the same effective config
/// always hashes identically regardless of key order in the source files.
pub fn config_digest(value: &Value) -> String {
    let canonical = value.to_string();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// Refuse configs embedding key material in any leaf string.
pub fn scan_for_secrets(value: &Value) -> Result<()> {
    let mut offending = Vec::new();
    collect_secret_pointers(value, String::new(), &mut offending);
    if !offending.is_empty() {
        bail!(
            "CONFIG_SECRET_DETECTED: key material found at {}; \
             reference an environment variable instead",
            offending.join(", ")
        );
    }
    Ok(())
}

fn collect_secret_pointers(value: &Value, pointer: String, offending: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                collect_secret_pointers(child, format!("{pointer}/{key}"), offending);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_secret_pointers(child, format!("{pointer}/{index}"), offending);
            }
        }
        Value::String(leaf) => {
            if looks_like_secret(leaf) {
                offending.push(pointer);
            }
        }
        _ => {}
    }
}

fn looks_like_secret(leaf: &str) -> bool {
    if SECRET_PREFIXES.iter().any(|prefix| leaf.starts_with(prefix)) {
        return true;
    }
    // A raw 32-byte private key rendered as hex, with or without 0x.
    let hex_part = leaf.strip_prefix("0x").unwrap_or(leaf);
    hex_part.len() == 64 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_yaml(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn later_layers_override_earlier_ones() {
        let base = write_yaml(
            r#"
ledger:
  endpoint: wss://node.example/rpc
  deck_contract: "0xdeck"
wallet:
  account: "0xaaa"
"#,
        );
        let local = write_yaml(
            r#"
ledger:
  endpoint: ws://localhost:8546
"#,
        );

        let config = load_layered(&[base.path(), local.path()]).unwrap();
        assert_eq!(config.ledger.endpoint, "ws://localhost:8546");
        assert_eq!(config.ledger.deck_contract, "0xdeck");
        assert_eq!(config.wallet.account, "0xaaa");
        assert_eq!(config.wallet.key_env, None);
    }

    #[test]
    fn digest_ignores_key_order() {
        let a = write_yaml("ledger: {endpoint: x, deck_contract: y}\nwallet: {account: z}\n");
        let b = write_yaml("wallet: {account: z}\nledger: {deck_contract: y, endpoint: x}\n");

        let digest_a = config_digest(&merged_value(&[a.path()]).unwrap());
        let digest_b = config_digest(&merged_value(&[b.path()]).unwrap());
        assert_eq!(digest_a, digest_b);
        assert_eq!(digest_a.len(), 64);
    }

    #[test]
    fn embedded_private_key_is_refused() {
        let config = write_yaml(&format!(
            r#"
ledger:
  endpoint: x
  deck_contract: y
wallet:
  account: "0xaaa"
  key: "0x{}"
"#,
            "ab".repeat(32)
        ));

        let err = load_layered(&[config.path()]).unwrap_err();
        assert!(err.to_string().contains("CONFIG_SECRET_DETECTED"));
        assert!(err.to_string().contains("/wallet/key"));
    }

    #[test]
    fn key_env_reference_is_allowed() {
        let config = write_yaml(
            r#"
ledger:
  endpoint: x
  deck_contract: y
wallet:
  account: "0xaaa"
  key_env: DH_WALLET_KEY
"#,
        );
        assert!(load_layered(&[config.path()]).is_ok());
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = load_layered(&["/nonexistent/deckhand.yaml"]).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/deckhand.yaml"));
    }
}
