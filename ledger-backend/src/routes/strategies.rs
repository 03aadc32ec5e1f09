//! Strategy ledger endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use strategy_ledger::{
    sandbox::{reward_token_address, Sandbox},
    SwapSpec,
};
use tracing::info;

use crate::{
    error::{BackendError, Result},
    services::StrategyRegistry,
    types::{
        parse_address, parse_amount, parse_amounts, AccrueRequest, AmountResponse,
        BalanceResponse, BatchReportResponse, ClaimRewardsRequest, CreateStrategyRequest,
        DepositRequest, EmergencyWithdrawRequest, EmergencyWithdrawResponse,
        FastWithdrawRequest, ProcessRequest, StrategyStateResponse, SwapSpecRequest,
        WithdrawRequest,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<StrategyRegistry>,
}

/// Create strategies router
pub fn strategies_router(registry: Arc<StrategyRegistry>) -> Router {
    let state = AppState { registry };

    Router::new()
        .route("/api/strategies", post(create_strategy))
        .route("/api/strategies/{id}/state", get(strategy_state))
        .route("/api/strategies/{id}/balance", get(strategy_balance))
        .route("/api/strategies/{id}/deposit", post(queue_deposit))
        .route("/api/strategies/{id}/withdraw", post(queue_withdraw))
        .route("/api/strategies/{id}/lock", post(lock_batch))
        .route("/api/strategies/{id}/process", post(process))
        .route("/api/strategies/{id}/fast-withdraw", post(fast_withdraw))
        .route("/api/strategies/{id}/claim-rewards", post(claim_rewards))
        .route("/api/strategies/{id}/emergency-withdraw", post(emergency_withdraw))
        .route("/api/strategies/{id}/accrue", post(accrue))
        .with_state(state)
}

fn snapshot(id: &str, sandbox: &Sandbox) -> Result<StrategyStateResponse> {
    let state = sandbox.strategy_state()?;
    Ok(StrategyStateResponse::new(id, sandbox.env().kind(), &state))
}

fn parse_swap_data(raw: &[SwapSpecRequest]) -> Result<Vec<SwapSpec>> {
    raw.iter().map(SwapSpecRequest::parse).collect()
}

/// Explicit swap data, or direct routes with no minimum
fn swap_data_or_default(
    sandbox: &Sandbox,
    raw: Option<&[SwapSpecRequest]>,
) -> Result<Vec<SwapSpec>> {
    match raw {
        Some(raw) => parse_swap_data(raw),
        None => Ok(sandbox.default_swap_data()),
    }
}

/// POST /api/strategies
async fn create_strategy(
    State(state): State<AppState>,
    Json(req): Json<CreateStrategyRequest>,
) -> Result<(StatusCode, Json<StrategyStateResponse>)> {
    let (id, _) = state.registry.create(&req).await?;
    let response = state
        .registry
        .with_strategy(&id, |sandbox| snapshot(&id, sandbox))
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/strategies/{id}/state
async fn strategy_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StrategyStateResponse>> {
    let response = state
        .registry
        .with_strategy(&id, |sandbox| snapshot(&id, sandbox))
        .await?;
    Ok(Json(response))
}

/// GET /api/strategies/{id}/balance
async fn strategy_balance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BalanceResponse>> {
    let balance = state
        .registry
        .with_strategy(&id, |sandbox| Ok(sandbox.strategy_balance()))
        .await?;

    Ok(Json(BalanceResponse {
        id,
        balance: balance.to_string(),
    }))
}

/// POST /api/strategies/{id}/deposit
async fn queue_deposit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DepositRequest>,
) -> Result<Json<StrategyStateResponse>> {
    let amount = parse_amount("amount", &req.amount)?;
    info!(%id, amount, "Queueing deposit");

    let response = state
        .registry
        .with_strategy(&id, |sandbox| {
            sandbox.queue_deposit(amount)?;
            snapshot(&id, sandbox)
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/strategies/{id}/withdraw
async fn queue_withdraw(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<WithdrawRequest>,
) -> Result<Json<StrategyStateResponse>> {
    let shares = parse_amount("shares", &req.shares)?;
    info!(%id, shares, "Queueing withdrawal");

    let response = state
        .registry
        .with_strategy(&id, |sandbox| {
            sandbox.queue_withdraw(shares)?;
            snapshot(&id, sandbox)
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/strategies/{id}/lock
async fn lock_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StrategyStateResponse>> {
    let response = state
        .registry
        .with_strategy(&id, |sandbox| {
            sandbox.lock_batch()?;
            snapshot(&id, sandbox)
        })
        .await?;
    Ok(Json(response))
}

/// POST /api/strategies/{id}/process
async fn process(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<BatchReportResponse>> {
    let slippages = parse_amounts("slippage", &req.slippages)?;
    info!(%id, do_harvest = req.do_harvest, "Processing batch");

    let report = state
        .registry
        .with_strategy(&id, |sandbox| {
            let swap_data = if req.do_harvest {
                swap_data_or_default(sandbox, req.swap_data.as_deref())?
            } else {
                Vec::new()
            };
            Ok(sandbox.process(&slippages, req.do_harvest, &swap_data)?)
        })
        .await?;

    info!(%id, index = report.index, "Batch processed");

    Ok(Json(report.into()))
}

/// POST /api/strategies/{id}/fast-withdraw
async fn fast_withdraw(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<FastWithdrawRequest>,
) -> Result<Json<AmountResponse>> {
    let shares = parse_amount("shares", &req.shares)?;
    let receiver = parse_address("receiver", &req.receiver)?;
    let slippages = parse_amounts("slippage", &req.slippages)?;
    let swap_data = parse_swap_data(&req.swap_data)?;
    info!(%id, shares, %receiver, "Fast withdrawal");

    let amount = state
        .registry
        .with_strategy(&id, |sandbox| {
            Ok(sandbox.fast_withdraw(shares, &slippages, &swap_data, receiver)?)
        })
        .await?;

    Ok(Json(AmountResponse {
        amount: amount.to_string(),
    }))
}

/// POST /api/strategies/{id}/claim-rewards
async fn claim_rewards(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ClaimRewardsRequest>,
) -> Result<Json<AmountResponse>> {
    let amount = state
        .registry
        .with_strategy(&id, |sandbox| {
            let swap_data = swap_data_or_default(sandbox, req.swap_data.as_deref())?;
            Ok(sandbox.claim_rewards(&swap_data)?)
        })
        .await?;

    info!(%id, amount, "Rewards claimed");

    Ok(Json(AmountResponse {
        amount: amount.to_string(),
    }))
}

/// POST /api/strategies/{id}/emergency-withdraw
async fn emergency_withdraw(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EmergencyWithdrawRequest>,
) -> Result<Json<EmergencyWithdrawResponse>> {
    let recipient = parse_address("recipient", &req.recipient)?;
    let params = parse_amounts("param", &req.params)?;

    let report = state
        .registry
        .with_strategy(&id, |sandbox| {
            Ok(sandbox.emergency_withdraw(recipient, &params)?)
        })
        .await?;

    Ok(Json(report.into()))
}

/// POST /api/strategies/{id}/accrue
async fn accrue(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AccrueRequest>,
) -> Result<Json<BalanceResponse>> {
    let yield_bps = req
        .yield_bps
        .as_deref()
        .map(|bps| parse_amount("yield_bps", bps))
        .transpose()?;
    let rewards = req
        .rewards
        .iter()
        .map(|r| -> Result<_> {
            Ok((reward_token_address(&r.symbol), parse_amount("amount", &r.amount)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let balance = state
        .registry
        .with_strategy(&id, |sandbox| {
            // Reject unknown tokens before moving anything
            let emitted = sandbox.env().kind().reward_tokens();
            if let Some(symbol) = req
                .rewards
                .iter()
                .zip(&rewards)
                .find(|(_, (token, _))| !emitted.contains(token))
                .map(|(r, _)| &r.symbol)
            {
                return Err(BackendError::BadRequest(format!(
                    "{:?} strategies do not emit {}",
                    sandbox.env().kind(),
                    symbol
                )));
            }
            if let Some(bps) = yield_bps {
                sandbox.accrue_yield(bps)?;
            }
            for (token, amount) in &rewards {
                sandbox.accrue_rewards(*token, *amount)?;
            }
            Ok(sandbox.strategy_balance())
        })
        .await?;

    Ok(Json(BalanceResponse {
        id,
        balance: balance.to_string(),
    }))
}
