//! Configuration surface (§6, §10): a `ClientConfig` deserialized from
//! TOML via `serde`, with process environment overrides layered on top.
//! Unknown keys in either source are a hard [`ClientError::UnsupportedConfigOption`],
//! never a silent ignore.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use hashgraph_common::EntityId;
use hashgraph_crypto::Signer;

use crate::error::ClientError;
use crate::network::{Network, SelectionPolicy};
use crate::node::NodeRecord;

fn default_max_attempts() -> u32 {
    10
}

fn default_grpc_deadline_secs() -> u64 {
    10
}

fn default_min_backoff_ms() -> u64 {
    250
}

fn default_max_backoff_secs() -> u64 {
    8
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkConfig {
    Predefined(String),
    Map(HashMap<String, String>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorConfig {
    pub payer_id: String,
    pub private_key: String,
}

/// Mirrors the recognized option set in §6 exactly; any TOML table key not
/// named here fails deserialization via `deny_unknown_fields` rather than
/// being silently dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub network: NetworkConfig,
    #[serde(default)]
    pub mirror_endpoints: Vec<String>,
    pub operator: OperatorConfig,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_grpc_deadline_secs")]
    pub grpc_deadline_secs: u64,
    #[serde(default = "default_min_backoff_ms")]
    pub min_backoff_ms: u64,
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
    #[serde(default = "default_true")]
    pub regenerate_tx_id: bool,
    #[serde(default)]
    pub max_transaction_fee: Option<u64>,
    #[serde(default)]
    pub ledger_id: Option<String>,
}

/// The process environment variable prefix consulted by [`ClientConfig::apply_env_overrides`].
pub const ENV_PREFIX: &str = "HASHGRAPH_CLIENT_";

impl ClientConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ClientError> {
        toml::from_str(text).map_err(|err| ClientError::UnsupportedConfigOption(err.to_string()))
    }

    /// Applies `HASHGRAPH_CLIENT_*` environment overrides for the scalar
    /// operational knobs. Any `HASHGRAPH_CLIENT_*` variable that doesn't
    /// name one of these knobs is a hard error, per §6.
    pub fn apply_env_overrides(mut self, vars: impl Iterator<Item = (String, String)>) -> Result<Self, ClientError> {
        for (key, value) in vars {
            let Some(suffix) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match suffix {
                "MAX_ATTEMPTS" => {
                    self.max_attempts = parse_env(suffix, &value)?;
                }
                "GRPC_DEADLINE_SECS" => {
                    self.grpc_deadline_secs = parse_env(suffix, &value)?;
                }
                "MIN_BACKOFF_MS" => {
                    self.min_backoff_ms = parse_env(suffix, &value)?;
                }
                "MAX_BACKOFF_SECS" => {
                    self.max_backoff_secs = parse_env(suffix, &value)?;
                }
                "REGENERATE_TX_ID" => {
                    self.regenerate_tx_id = parse_env(suffix, &value)?;
                }
                "MAX_TRANSACTION_FEE" => {
                    self.max_transaction_fee = Some(parse_env(suffix, &value)?);
                }
                "LEDGER_ID" => {
                    self.ledger_id = Some(value);
                }
                other => {
                    return Err(ClientError::UnsupportedConfigOption(format!(
                        "{ENV_PREFIX}{other} is not a recognized configuration key"
                    )));
                }
            }
        }
        Ok(self)
    }

    pub fn grpc_deadline(&self) -> Duration {
        Duration::from_secs(self.grpc_deadline_secs)
    }

    pub fn min_backoff(&self) -> Duration {
        Duration::from_millis(self.min_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }

    /// Validates and lowers the config into the immutable runtime types
    /// named in §6: the operator's account id and signer, and a `Network`
    /// seeded with the configured nodes. `predefined` resolves a named
    /// network (e.g. `"testnet"`) to its node set; a `Map` network is used
    /// as-is.
    pub fn build_operator(&self) -> Result<(EntityId, Signer), ClientError> {
        let payer_id = EntityId::parse(&self.operator.payer_id)
            .map_err(|_| ClientError::Config("operator.payer_id is not a valid account id"))?;
        let key_bytes = hex::decode(&self.operator.private_key)
            .map_err(|_| ClientError::Config("operator.private_key is not valid hex"))?;
        let signer = match key_bytes.len() {
            32 => {
                let bytes: [u8; 32] = key_bytes
                    .try_into()
                    .expect("length checked above");
                Signer::from_ed25519_bytes(&bytes)
            }
            _ => {
                return Err(ClientError::Config("operator.private_key must decode to exactly 32 bytes"));
            }
        };
        Ok((payer_id, signer))
    }

    pub fn build_network(&self, resolve_predefined: impl Fn(&str) -> Option<Vec<NodeRecord>>) -> Result<Network, ClientError> {
        let nodes = match &self.network {
            NetworkConfig::Predefined(name) => resolve_predefined(name)
                .ok_or(ClientError::UnsupportedConfigOption(format!("unknown predefined network {name:?}")))?,
            NetworkConfig::Map(entries) => entries
                .iter()
                .map(|(account_id, _endpoint)| {
                    EntityId::parse(account_id)
                        .map(|id| NodeRecord::new(id, Vec::new(), self.min_backoff()))
                        .map_err(|_| ClientError::Config("network map key is not a valid node account id"))
                })
                .collect::<Result<Vec<_>, ClientError>>()?,
        };
        if nodes.is_empty() {
            return Err(ClientError::Config("network must have at least one node"));
        }
        Ok(Network::new(nodes, SelectionPolicy::RoundRobin, self.min_backoff(), self.max_backoff()))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ClientError> {
    value
        .parse()
        .map_err(|_| ClientError::UnsupportedConfigOption(format!("{ENV_PREFIX}{key} has an invalid value {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML_SAMPLE: &str = r#"
        network = { predefined = "testnet" }
        operator = { payer_id = "0.0.2", private_key = "0101010101010101010101010101010101010101010101010101010101010101" }
        max_attempts = 5
    "#;

    #[test]
    fn parses_toml_with_defaults_filled_in() {
        let config = ClientConfig::from_toml_str(TOML_SAMPLE).unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.grpc_deadline_secs, default_grpc_deadline_secs());
        assert!(config.regenerate_tx_id);
    }

    #[test]
    fn unknown_toml_key_is_a_config_error() {
        let bad = format!("{TOML_SAMPLE}\nbogus_option = 1\n");
        assert!(ClientConfig::from_toml_str(&bad).is_err());
    }

    #[test]
    fn env_override_sets_max_attempts() {
        let config = ClientConfig::from_toml_str(TOML_SAMPLE).unwrap();
        let vars = vec![("HASHGRAPH_CLIENT_MAX_ATTEMPTS".to_string(), "3".to_string())];
        let config = config.apply_env_overrides(vars.into_iter()).unwrap();
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn unknown_env_key_is_a_config_error() {
        let config = ClientConfig::from_toml_str(TOML_SAMPLE).unwrap();
        let vars = vec![("HASHGRAPH_CLIENT_NOT_A_REAL_KEY".to_string(), "1".to_string())];
        assert!(config.apply_env_overrides(vars.into_iter()).is_err());
    }

    #[test]
    fn build_operator_decodes_ed25519_signer() {
        let config = ClientConfig::from_toml_str(TOML_SAMPLE).unwrap();
        let (payer, _signer) = config.build_operator().unwrap();
        assert_eq!(payer, EntityId::new(0, 0, 2));
    }

    #[test]
    fn build_network_rejects_unknown_predefined_name() {
        let config = ClientConfig::from_toml_str(TOML_SAMPLE).unwrap();
        let err = config.build_network(|_| None).unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedConfigOption(_)));
    }
}
