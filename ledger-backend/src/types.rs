//! Request and response types for the ledger backend
//!
//! Amounts travel as decimal strings so u128 values survive JSON clients.

use std::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use strategy_ledger::{
    sandbox::{encode_path, AdapterKind},
    BatchReport, EmergencyReport, StrategyState, SwapSpec,
};

use crate::error::{BackendError, Result};

/// Parse a decimal amount field
pub fn parse_amount(field: &str, raw: &str) -> Result<u128> {
    raw.trim()
        .parse()
        .map_err(|e| BackendError::BadRequest(format!("Invalid {field}: {e}")))
}

pub fn parse_amounts(field: &str, raw: &[String]) -> Result<Vec<u128>> {
    raw.iter().map(|s| parse_amount(field, s)).collect()
}

/// Parse a hex address field (with or without `0x`)
pub fn parse_address(field: &str, raw: &str) -> Result<Address> {
    Address::from_str(raw.trim())
        .map_err(|e| BackendError::BadRequest(format!("Invalid {field}: {e}")))
}

/// Create a sandboxed strategy
#[derive(Debug, Deserialize)]
pub struct CreateStrategyRequest {
    /// Registry key, also used as the strategy name in logs
    pub id: String,

    pub kind: AdapterKind,

    /// Strategy account (hex)
    pub strategy: String,

    /// Underlying asset (hex)
    pub underlying: String,

    /// Receiver of settled withdrawals (hex)
    pub vault: String,

    /// Mint 1:1 with no locked shares instead of the offset policy
    #[serde(default)]
    pub plain_shares: bool,
}

/// One reward swap: minimum output and the hop addresses of its route
#[derive(Debug, Deserialize)]
pub struct SwapSpecRequest {
    pub slippage: String,
    pub path: Vec<String>,
}

impl SwapSpecRequest {
    pub fn parse(&self) -> Result<SwapSpec> {
        let hops = self
            .path
            .iter()
            .map(|hop| parse_address("path", hop))
            .collect::<Result<Vec<_>>>()?;
        Ok(SwapSpec::new(
            parse_amount("slippage", &self.slippage)?,
            encode_path(&hops),
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub shares: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub slippages: Vec<String>,

    #[serde(default)]
    pub do_harvest: bool,

    /// Falls back to direct routes without minimums when omitted
    #[serde(default)]
    pub swap_data: Option<Vec<SwapSpecRequest>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClaimRewardsRequest {
    #[serde(default)]
    pub swap_data: Option<Vec<SwapSpecRequest>>,
}

#[derive(Debug, Deserialize)]
pub struct FastWithdrawRequest {
    pub shares: String,

    pub receiver: String,

    #[serde(default)]
    pub slippages: Vec<String>,

    /// Harvests first when non-empty
    #[serde(default)]
    pub swap_data: Vec<SwapSpecRequest>,
}

#[derive(Debug, Deserialize)]
pub struct EmergencyWithdrawRequest {
    pub recipient: String,

    #[serde(default)]
    pub params: Vec<String>,
}

/// Simulated market movement
#[derive(Debug, Default, Deserialize)]
pub struct AccrueRequest {
    /// Yield on the protocol position, in basis points
    #[serde(default)]
    pub yield_bps: Option<String>,

    #[serde(default)]
    pub rewards: Vec<RewardAccrual>,
}

#[derive(Debug, Deserialize)]
pub struct RewardAccrual {
    /// Reward token symbol, e.g. `COMP`
    pub symbol: String,
    pub amount: String,
}

/// Ledger snapshot
#[derive(Debug, Serialize, Deserialize)]
pub struct StrategyStateResponse {
    pub id: String,
    pub kind: AdapterKind,
    pub index: u64,
    pub processing: bool,
    pub terminated: bool,
    pub total_shares: String,
    pub locked_shares: String,
    pub pending_deposit: String,
    pub pending_shares_to_withdraw: String,
    pub next_deposit: String,
    pub next_shares_to_withdraw: String,
    pub pending_deposit_reward: String,
    pub optimized_shares_withdrawn: String,
    pub pending_redistribute_deposit: String,
    pub pending_redistribute_optimized_deposit: String,
}

impl StrategyStateResponse {
    pub fn new(id: &str, kind: AdapterKind, state: &StrategyState) -> Self {
        Self {
            id: id.to_string(),
            kind,
            index: state.index,
            processing: state.processing,
            terminated: state.terminated,
            total_shares: state.total_shares.to_string(),
            locked_shares: state.locked_shares.to_string(),
            pending_deposit: state.pending_user.deposit.to_string(),
            pending_shares_to_withdraw: state.pending_user.shares_to_withdraw.to_string(),
            next_deposit: state.pending_user_next.deposit.to_string(),
            next_shares_to_withdraw: state.pending_user_next.shares_to_withdraw.to_string(),
            pending_deposit_reward: state.pending_deposit_reward.to_string(),
            optimized_shares_withdrawn: state.optimized_shares_withdrawn.to_string(),
            pending_redistribute_deposit: state.pending_redistribute_deposit.to_string(),
            pending_redistribute_optimized_deposit: state
                .pending_redistribute_optimized_deposit
                .to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub id: String,
    pub balance: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AmountResponse {
    pub amount: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchReportResponse {
    pub index: u64,
    pub harvested: String,
    pub deposited_to_protocol: String,
    pub withdrawn_from_protocol: String,
    pub deposited_shares_received: String,
    pub withdrawn_received: String,
    pub total_shares: String,
    pub total_underlying: String,
}

impl From<BatchReport> for BatchReportResponse {
    fn from(report: BatchReport) -> Self {
        Self {
            index: report.index,
            harvested: report.harvested.to_string(),
            deposited_to_protocol: report.deposited_to_protocol.to_string(),
            withdrawn_from_protocol: report.withdrawn_from_protocol.to_string(),
            deposited_shares_received: report.record.deposited_shares_received.to_string(),
            withdrawn_received: report.record.withdrawn_received.to_string(),
            total_shares: report.record.total_shares.to_string(),
            total_underlying: report.record.total_underlying.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmergencyWithdrawResponse {
    pub recovered_from_protocol: String,
    pub transferred: String,
}

impl From<EmergencyReport> for EmergencyWithdrawResponse {
    fn from(report: EmergencyReport) -> Self {
        Self {
            recovered_from_protocol: report.recovered_from_protocol.to_string(),
            transferred: report.transferred.to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: i64,
}

/// Configuration for the backend server
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// CORS allowed origins
    pub cors_origins: Vec<String>,

    /// API keys for authentication
    pub api_keys: Vec<String>,

    /// Upper bound on hosted strategies
    pub max_strategies: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            cors_origins: vec!["http://localhost:3000".to_string()],
            api_keys: vec![],
            max_strategies: 64,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let cors_origins = std::env::var("CORS_ORIGINS")
            .ok()
            .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or(defaults.cors_origins);

        let api_keys = std::env::var("API_KEYS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let max_strategies = std::env::var("MAX_STRATEGIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_strategies);

        Self {
            port,
            cors_origins,
            api_keys,
            max_strategies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_accepts_u128() {
        assert_eq!(
            parse_amount("amount", "340282366920938463463374607431768211455").unwrap(),
            u128::MAX
        );
        assert!(matches!(
            parse_amount("amount", "-1"),
            Err(BackendError::BadRequest(_))
        ));
    }

    #[test]
    fn test_parse_address() {
        let address = parse_address("vault", "0x7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a7a").unwrap();
        assert_eq!(address, Address::repeat_byte(0x7a));
        assert!(parse_address("vault", "0x12").is_err());
    }

    #[test]
    fn test_swap_spec_encodes_hops() {
        let request = SwapSpecRequest {
            slippage: "5".to_string(),
            path: vec![
                "0x1111111111111111111111111111111111111111".to_string(),
                "0x2222222222222222222222222222222222222222".to_string(),
            ],
        };
        let spec = request.parse().unwrap();
        assert_eq!(spec.slippage, 5);
        assert_eq!(spec.path.len(), 40);
    }
}
