//! Lightweight Solana RPC client
//!
//! Implements only `getAccountInfo`, which is all the reserve snapshot
//! provider needs, over a blocking `ureq` agent.

use async_trait::async_trait;
use base64::Engine;
use curve_core::{ReserveSnapshot, LAMPORTS_PER_SOL};
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RpcConfig;
use crate::core::{ApiError, ApiResult, NetworkError, PoolSnapshot, ReserveSnapshotProvider};

/// Seed of the per-mint bonding curve PDA
pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";

const DISCRIMINATOR_LEN: usize = 8;
const COMPLETE_OFFSET: usize = DISCRIMINATOR_LEN + 5 * 8;
/// Shortest account that still carries the `complete` flag
pub const MIN_CURVE_ACCOUNT_LEN: usize = COMPLETE_OFFSET + 1;

/// Lightweight RPC client for Solana
pub struct LightRpcClient {
    url: String,
    commitment: String,
    agent: ureq::Agent,
}

/// RPC response wrapper
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// RPC error structure
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Account data response from RPC
#[derive(Debug, Deserialize)]
struct AccountInfo {
    data: (String, String), // (data, encoding)
    owner: String,
}

impl LightRpcClient {
    pub fn new(url: String, commitment: String, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(timeout)
            .build();

        Self {
            url,
            commitment,
            agent,
        }
    }

    pub fn from_config(config: &RpcConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.commitment.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Make a JSON-RPC call
    async fn call<T>(&self, method: &str, params: Value) -> ApiResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        debug!("RPC call: {} with params: {:?}", method, params);

        // ureq is sync
        let response_body = tokio::task::spawn_blocking({
            let agent = self.agent.clone();
            let url = self.url.clone();
            let body = request_body.to_string();

            move || {
                let response = agent
                    .post(&url)
                    .set("Content-Type", "application/json")
                    .send_string(&body)?;

                let text = response.into_string()?;
                Ok::<String, ureq::Error>(text)
            }
        })
        .await
        .map_err(|e| ApiError::Other(anyhow::anyhow!("RPC task failed: {}", e)))?
        .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;

        let rpc_response: RpcResponse<T> = serde_json::from_str(&response_body)?;

        if let Some(error) = rpc_response.error {
            return Err(NetworkError::Rpc(format!("RPC error {}: {}", error.code, error.message)).into());
        }

        rpc_response
            .result
            .ok_or_else(|| NetworkError::Rpc("No result in RPC response".to_string()).into())
    }

    /// Raw account data and owner, or `None` when the account does not exist
    pub async fn get_account_data(&self, pubkey: &Pubkey) -> ApiResult<Option<(Vec<u8>, Pubkey)>> {
        let params = json!([
            pubkey.to_string(),
            {
                "encoding": "base64",
                "commitment": self.commitment
            }
        ]);

        let response: Value = self.call("getAccountInfo", params).await?;

        if response["value"].is_null() {
            return Ok(None);
        }

        let account_info: AccountInfo = serde_json::from_value(response["value"].clone())?;
        let invalid = |reason: String| NetworkError::InvalidAccountData {
            address: pubkey.to_string(),
            reason,
        };

        if account_info.data.1 != "base64" {
            return Err(invalid(format!("unsupported data encoding: {}", account_info.data.1)).into());
        }
        let data = base64::engine::general_purpose::STANDARD
            .decode(&account_info.data.0)
            .map_err(|e| invalid(format!("failed to decode account data: {}", e)))?;
        let owner = Pubkey::from_str(&account_info.owner)
            .map_err(|e| invalid(format!("failed to parse owner: {}", e)))?;

        Ok(Some((data, owner)))
    }
}

/// Fields of a bonding curve account, in raw on-chain units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondingCurveAccount {
    pub virtual_token_reserves: u64,
    pub virtual_sol_reserves: u64,
    pub real_token_reserves: u64,
    pub real_sol_reserves: u64,
    pub token_total_supply: u64,
    /// Curve finished and liquidity migrated
    pub complete: bool,
}

impl BondingCurveAccount {
    pub fn from_account_data(data: &[u8]) -> Result<Self, String> {
        if data.len() < MIN_CURVE_ACCOUNT_LEN {
            return Err(format!(
                "account data too short: {} bytes, need {}",
                data.len(),
                MIN_CURVE_ACCOUNT_LEN
            ));
        }

        let read_u64 = |index: usize| {
            let start = DISCRIMINATOR_LEN + index * 8;
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&data[start..start + 8]);
            u64::from_le_bytes(bytes)
        };

        Ok(Self {
            virtual_token_reserves: read_u64(0),
            virtual_sol_reserves: read_u64(1),
            real_token_reserves: read_u64(2),
            real_sol_reserves: read_u64(3),
            token_total_supply: read_u64(4),
            complete: data[COMPLETE_OFFSET] != 0,
        })
    }

    pub fn to_snapshot(&self, token_decimals: u8) -> Result<ReserveSnapshot, curve_core::CurveError> {
        ReserveSnapshot::from_raw(
            self.virtual_sol_reserves,
            self.virtual_token_reserves,
            token_decimals,
            self.complete,
        )
    }

    /// Total supply in whole tokens; `None` when the account leaves it unset
    pub fn total_supply(&self, token_decimals: u8) -> Option<f64> {
        (self.token_total_supply > 0)
            .then(|| self.token_total_supply as f64 / 10f64.powi(token_decimals as i32))
    }

    /// Real SOL as recorded on chain, in whole SOL
    pub fn real_sol(&self) -> f64 {
        self.real_sol_reserves as f64 / LAMPORTS_PER_SOL as f64
    }
}

/// Reads curve accounts over JSON-RPC
pub struct RpcSnapshotProvider {
    client: LightRpcClient,
    program_id: Pubkey,
    token_decimals: u8,
}

impl RpcSnapshotProvider {
    pub fn new(client: LightRpcClient, program_id: Pubkey, token_decimals: u8) -> Self {
        Self {
            client,
            program_id,
            token_decimals,
        }
    }

    pub fn from_config(config: &RpcConfig) -> anyhow::Result<Self> {
        let program_id = Pubkey::from_str(&config.curve_program_id)
            .map_err(|e| anyhow::anyhow!("Invalid curve program id: {}", e))?;
        Ok(Self::new(
            LightRpcClient::from_config(config),
            program_id,
            config.token_decimals,
        ))
    }

    pub fn curve_address(&self, mint: &Pubkey) -> Pubkey {
        bonding_curve_address(mint, &self.program_id)
    }

    /// Decode a curve account fetched for `pool_id`
    pub fn snapshot_from_account(
        &self,
        pool_id: &str,
        curve: &Pubkey,
        data: &[u8],
        owner: &Pubkey,
    ) -> ApiResult<PoolSnapshot> {
        if *owner != self.program_id {
            warn!("Curve account {} owned by unexpected program {}", curve, owner);
            return Err(NetworkError::InvalidAccountData {
                address: curve.to_string(),
                reason: format!("owned by unexpected program {}", owner),
            }
            .into());
        }

        let account = BondingCurveAccount::from_account_data(data).map_err(|reason| {
            NetworkError::InvalidAccountData {
                address: curve.to_string(),
                reason,
            }
        })?;
        let reserves = account
            .to_snapshot(self.token_decimals)
            .map_err(|e| ApiError::Configuration(e.to_string()))?;

        debug!(
            "Snapshot for {}: virtual_sol={}, virtual_token={}, real_sol={}, complete={}",
            pool_id,
            reserves.virtual_sol_reserves,
            reserves.virtual_token_reserves,
            account.real_sol(),
            account.complete
        );

        Ok(PoolSnapshot {
            mint_address: pool_id.to_string(),
            reserves,
            total_supply: account.total_supply(self.token_decimals),
        })
    }
}

/// PDA holding the curve state for `mint`
pub fn bonding_curve_address(mint: &Pubkey, program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[BONDING_CURVE_SEED, mint.as_ref()], program_id).0
}

#[async_trait]
impl ReserveSnapshotProvider for RpcSnapshotProvider {
    async fn fetch_snapshot(&self, pool_id: &str) -> ApiResult<PoolSnapshot> {
        let mint = Pubkey::from_str(pool_id)
            .map_err(|_| ApiError::BadRequest(format!("Invalid mint address: {}", pool_id)))?;
        let curve = self.curve_address(&mint);

        let (data, owner) = self
            .client
            .get_account_data(&curve)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("bonding curve for mint {}", pool_id)))?;

        self.snapshot_from_account(pool_id, &curve, &data, &owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_account(fields: [u64; 5], complete: bool) -> Vec<u8> {
        let mut data = vec![0xAA; DISCRIMINATOR_LEN];
        for field in fields {
            data.extend_from_slice(&field.to_le_bytes());
        }
        data.push(complete as u8);
        // creator pubkey trails the flag
        data.extend_from_slice(&[7u8; 32]);
        data
    }

    #[test]
    fn test_decode_curve_account() {
        let data = encode_account(
            [
                1_073_000_000_000_000,
                30_000_000_000,
                793_100_000_000_000,
                0,
                1_000_000_000_000_000,
            ],
            false,
        );

        let account = BondingCurveAccount::from_account_data(&data).unwrap();
        assert_eq!(account.virtual_token_reserves, 1_073_000_000_000_000);
        assert_eq!(account.virtual_sol_reserves, 30_000_000_000);
        assert_eq!(account.real_token_reserves, 793_100_000_000_000);
        assert_eq!(account.real_sol_reserves, 0);
        assert!(!account.complete);

        let snapshot = account.to_snapshot(6).unwrap();
        assert_eq!(snapshot.virtual_sol_reserves, 30.0);
        assert_eq!(snapshot.virtual_token_reserves, 1_073_000_000.0);
        assert_eq!(account.total_supply(6), Some(1_000_000_000.0));
    }

    #[test]
    fn test_complete_flag_maps_to_migrated() {
        let data = encode_account([1, 1, 0, 0, 0], true);
        let account = BondingCurveAccount::from_account_data(&data).unwrap();
        assert!(account.complete);
        assert!(account.to_snapshot(6).unwrap().is_migrated);
        assert_eq!(account.total_supply(6), None);
    }

    #[test]
    fn test_short_account_rejected() {
        let data = encode_account([1, 2, 3, 4, 5], false);
        assert!(BondingCurveAccount::from_account_data(&data[..MIN_CURVE_ACCOUNT_LEN - 1]).is_err());
        assert!(BondingCurveAccount::from_account_data(&data[..MIN_CURVE_ACCOUNT_LEN]).is_ok());
    }

    #[test]
    fn test_curve_address_is_deterministic() {
        let program = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let first = bonding_curve_address(&mint, &program);
        assert_eq!(first, bonding_curve_address(&mint, &program));
        assert_ne!(first, bonding_curve_address(&Pubkey::new_unique(), &program));
    }

    fn offline_provider(program_id: Pubkey) -> RpcSnapshotProvider {
        RpcSnapshotProvider::new(
            LightRpcClient::new("http://127.0.0.1:1".to_string(), "confirmed".to_string(), Duration::from_secs(1)),
            program_id,
            6,
        )
    }

    #[test]
    fn test_foreign_owner_rejected() {
        let program = Pubkey::new_unique();
        let provider = offline_provider(program);
        let mint = Pubkey::new_unique();
        let curve = provider.curve_address(&mint);
        let data = encode_account([1_073_000_000_000_000, 30_000_000_000, 0, 0, 0], false);

        let result = provider.snapshot_from_account(&mint.to_string(), &curve, &data, &Pubkey::new_unique());
        match result {
            Err(ApiError::Network(NetworkError::InvalidAccountData { address, reason })) => {
                assert_eq!(address, curve.to_string());
                assert!(reason.contains("unexpected program"));
            }
            other => panic!("expected invalid account data, got {:?}", other.map(|s| s.mint_address)),
        }

        let snapshot = provider
            .snapshot_from_account(&mint.to_string(), &curve, &data, &program)
            .unwrap();
        assert_eq!(snapshot.mint_address, mint.to_string());
        assert_eq!(snapshot.reserves.virtual_sol_reserves, 30.0);
    }

    #[tokio::test]
    async fn test_invalid_mint_is_bad_request() {
        let provider = offline_provider(Pubkey::new_unique());
        let result = provider.fetch_snapshot("not-a-mint").await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
