//! Per-tool handlers.
//!
//! Handlers run after catalog validation and rate limiting. They resolve
//! their namespace, talk to the chain backend / wallet provider, and map
//! every backend failure through the error normalizer at this boundary —
//! nothing below propagates raw.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::chain::backend::ChainBackend;
use crate::chain::contracts;
use crate::chain::types::BlockRef;
use crate::chain::wallet::WalletProvider;
use crate::chain::{Network, NetworkDirectory};
use crate::errors::{normalize_chain_error, GatewayError, GatewayResult};
use crate::monitor::TransactionMonitor;
use crate::validation::{optional_str, require_confirmation, required_str, validate_tx_hash};

/// Shared collaborators injected into every handler.
pub struct HandlerContext {
    pub directory: Arc<NetworkDirectory>,
    pub monitor: Arc<TransactionMonitor>,
}

impl HandlerContext {
    fn network(&self, args: &Value) -> GatewayResult<Network> {
        self.directory.parse(optional_str(args, "network"))
    }

    fn backend(&self, args: &Value) -> GatewayResult<(Network, Arc<dyn ChainBackend>)> {
        let network = self.network(args)?;
        Ok((network, self.directory.backend(network)?))
    }

    /// Mutating tools need both bindings before any RPC round trip.
    fn backend_and_wallet(
        &self,
        args: &Value,
    ) -> GatewayResult<(Network, Arc<dyn ChainBackend>, Arc<dyn WalletProvider>)> {
        let network = self.network(args)?;
        let backend = self.directory.backend(network)?;
        let wallet = self.directory.wallet(network)?;
        Ok((network, backend, wallet))
    }
}

/// Relay a signed transaction and register it with the monitor.
async fn relay_and_track(
    ctx: &HandlerContext,
    network: Network,
    backend: &dyn ChainBackend,
    raw: &str,
) -> GatewayResult<Value> {
    let txid = backend
        .send_raw_transaction(raw)
        .await
        .map_err(|e| normalize_chain_error(&e))?;
    let record = ctx.monitor.track_transaction(network, &txid);
    Ok(json!({
        "txid": txid,
        "network": network,
        "status": record.status,
    }))
}

pub async fn get_blockchain_info(ctx: Arc<HandlerContext>, args: Value) -> GatewayResult<Value> {
    let (network, backend) = ctx.backend(&args)?;
    let block_count = backend
        .get_block_count()
        .await
        .map_err(|e| normalize_chain_error(&e))?;
    Ok(json!({
        "network": network,
        "blockCount": block_count,
    }))
}

pub async fn get_block(ctx: Arc<HandlerContext>, args: Value) -> GatewayResult<Value> {
    let block_ref = match args.get("hashOrHeight") {
        Some(Value::Number(n)) => BlockRef::Height(n.as_u64().ok_or_else(|| {
            GatewayError::Validation(format!("Invalid block height '{n}': not a non-negative integer"))
        })?),
        // 64 characters is always a hash, even when every digit happens to
        // be decimal.
        Some(Value::String(s)) if s.len() != 64 && !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
            BlockRef::Height(s.parse().map_err(|_| {
                GatewayError::Validation(format!("Invalid block height '{s}': out of range"))
            })?)
        }
        Some(Value::String(s)) => BlockRef::Hash(validate_tx_hash(s)?),
        _ => {
            return Err(GatewayError::Validation(
                "Missing required field: hashOrHeight".to_string(),
            ))
        }
    };
    let (_, backend) = ctx.backend(&args)?;
    backend
        .get_block(&block_ref)
        .await
        .map_err(|e| normalize_chain_error(&e))
}

pub async fn get_transaction(ctx: Arc<HandlerContext>, args: Value) -> GatewayResult<Value> {
    let txid = validate_tx_hash(required_str(&args, "txid")?)?;
    let (_, backend) = ctx.backend(&args)?;
    backend
        .get_transaction(&txid)
        .await
        .map_err(|e| normalize_chain_error(&e))
}

pub async fn get_balance(ctx: Arc<HandlerContext>, args: Value) -> GatewayResult<Value> {
    let address = required_str(&args, "address")?;
    let (_, backend) = ctx.backend(&args)?;
    let balances = backend
        .get_balance(address)
        .await
        .map_err(|e| normalize_chain_error(&e))?;
    serde_json::to_value(balances)
        .map_err(|e| GatewayError::Internal(format!("Failed to encode balances: {e}")))
}

pub async fn transfer_assets(ctx: Arc<HandlerContext>, args: Value) -> GatewayResult<Value> {
    // Commit guard first: an unconfirmed attempt costs no RPC round trip.
    require_confirmation(&args)?;
    let from_wif = required_str(&args, "fromWIF")?;
    let to_address = required_str(&args, "toAddress")?;
    let asset = required_str(&args, "asset")?;
    let amount = crate::validation::validate_amount(
        args.get("amount").unwrap_or(&Value::Null),
    )?;

    let (network, backend, wallet) = ctx.backend_and_wallet(&args)?;
    let signed = wallet
        .build_transfer(from_wif, to_address, asset, &amount)
        .await?;
    relay_and_track(&ctx, network, backend.as_ref(), &signed.raw).await
}

pub async fn invoke_contract(ctx: Arc<HandlerContext>, args: Value) -> GatewayResult<Value> {
    let script_hash = crate::validation::validate_script_hash(required_str(&args, "scriptHash")?)?;
    let operation = required_str(&args, "operation")?.to_string();
    let call_args: Vec<Value> = args
        .get("args")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    // The two paths share a name; a signing key selects the write path.
    match optional_str(&args, "fromWIF") {
        Some(from_wif) => {
            require_confirmation(&args)?;
            let (network, backend, wallet) = ctx.backend_and_wallet(&args)?;
            let signed = wallet
                .build_contract_call(from_wif, &script_hash, &operation, &call_args)
                .await?;
            relay_and_track(&ctx, network, backend.as_ref(), &signed.raw).await
        }
        None => {
            let (_, backend) = ctx.backend(&args)?;
            let invocation = backend
                .invoke_function(&script_hash, &operation, &call_args)
                .await
                .map_err(|e| normalize_chain_error(&e))?;
            if invocation.state == "FAULT" {
                let detail = invocation
                    .exception
                    .unwrap_or_else(|| "no fault detail".to_string());
                return Err(GatewayError::Contract(format!(
                    "Contract invocation faulted: {detail}"
                )));
            }
            Ok(json!({
                "state": invocation.state,
                "gasConsumed": invocation.gas_consumed,
                "stack": invocation.stack,
            }))
        }
    }
}

pub async fn create_wallet(ctx: Arc<HandlerContext>, args: Value) -> GatewayResult<Value> {
    let password = required_str(&args, "password")?;
    let wallet = ctx.directory.default_wallet()?;
    let account = wallet.create_account(password)?;
    Ok(json!({
        "address": account.address,
        "publicKey": account.public_key,
        "encryptedKey": account.encrypted_key,
    }))
}

pub async fn import_wallet(ctx: Arc<HandlerContext>, args: Value) -> GatewayResult<Value> {
    let key = required_str(&args, "key")?;
    let password = optional_str(&args, "password");
    let wallet = ctx.directory.default_wallet()?;
    let account = wallet.import_account(key, password)?;
    Ok(json!({
        "address": account.address,
        "publicKey": account.public_key,
        "encryptedKey": account.encrypted_key,
    }))
}

pub async fn estimate_transfer_fees(ctx: Arc<HandlerContext>, args: Value) -> GatewayResult<Value> {
    let from = required_str(&args, "fromAddress")?;
    let to = required_str(&args, "toAddress")?;
    let asset = required_str(&args, "asset")?;
    let amount =
        crate::validation::validate_amount(args.get("amount").unwrap_or(&Value::Null))?;

    let network = ctx.network(&args)?;
    let wallet = ctx.directory.wallet(network)?;
    let estimate = wallet.estimate_transfer(from, to, asset, &amount).await?;
    Ok(json!({
        "network": network,
        "networkFee": estimate.network_fee,
        "systemFee": estimate.system_fee,
        "total": estimate.total,
    }))
}

pub async fn claim_gas(ctx: Arc<HandlerContext>, args: Value) -> GatewayResult<Value> {
    require_confirmation(&args)?;
    let from_wif = required_str(&args, "fromWIF")?;
    let (network, backend, wallet) = ctx.backend_and_wallet(&args)?;
    let signed = wallet.build_gas_claim(from_wif).await?;
    relay_and_track(&ctx, network, backend.as_ref(), &signed.raw).await
}

pub async fn list_famous_contracts(_ctx: Arc<HandlerContext>, args: Value) -> GatewayResult<Value> {
    // The network here is an optional filter, not a namespace resolution:
    // no backend needs to exist for the listing to work.
    let filter = match optional_str(&args, "network") {
        Some(raw) => Some(raw.parse::<Network>()?),
        None => None,
    };
    let listing: Vec<Value> = contracts::list_contracts(filter)
        .into_iter()
        .map(|contract| {
            json!({
                "name": contract.name,
                "scriptHash": format!("0x{}", contract.script_hash),
                "description": contract.description,
                "networks": contract.networks,
            })
        })
        .collect();
    Ok(json!({ "contracts": listing }))
}

pub async fn get_contract_info(ctx: Arc<HandlerContext>, args: Value) -> GatewayResult<Value> {
    let name_or_hash = required_str(&args, "nameOrHash")?;
    let network = ctx.network(&args)?;
    let contract = contracts::find_contract(name_or_hash).ok_or_else(|| {
        GatewayError::Contract(format!("Unknown contract: {name_or_hash}"))
    })?;
    if !contract.networks.contains(&network) {
        return Err(GatewayError::Contract(format!(
            "Contract '{}' is not deployed on {network}",
            contract.name
        )));
    }
    Ok(json!({
        "name": contract.name,
        "scriptHash": format!("0x{}", contract.script_hash),
        "description": contract.description,
        "network": network,
    }))
}
