use ethers::types::{Address, U256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::chain::TokenReader;
use crate::error::CoreResult;
use crate::math::parse_address;

/// Lowercase form of the native-coin placeholder address.
pub const NATIVE_PLACEHOLDER: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";
/// Shown for an empty or all-zero address.
pub const UNKNOWN_SYMBOL: &str = "-";
pub const DEFAULT_DECIMALS: u8 = 18;

enum Sentinel {
    Native,
    Unknown,
}

fn sentinel(input: &str) -> Option<Sentinel> {
    let lower = input.trim().to_ascii_lowercase();
    let hex = lower.strip_prefix("0x").unwrap_or(&lower);
    if hex.is_empty() || hex.chars().all(|c| c == '0') {
        return Some(Sentinel::Unknown);
    }
    if lower == NATIVE_PLACEHOLDER {
        return Some(Sentinel::Native);
    }
    None
}

/// "0x" plus the first four hex digits.
fn fallback_symbol(address: &Address) -> String {
    let full = format!("{:?}", address);
    full[..6].to_string()
}

/// Session-scoped memo of ERC-20 symbols, decimals and balances.
///
/// Symbols and decimals never expire within a session and failed lookups are
/// cached as fallbacks. Balances are keyed by (token, owner); failures read
/// as zero and are not cached. Each map sits behind its own lock and every
/// write is a single key -> value insert.
pub struct TokenMetadataCache {
    reader: Arc<dyn TokenReader>,
    native_symbol: String,
    symbols: RwLock<HashMap<Address, String>>,
    decimals: RwLock<HashMap<Address, u8>>,
    balances: RwLock<HashMap<(Address, Address), U256>>,
}

impl TokenMetadataCache {
    pub fn new(reader: Arc<dyn TokenReader>, native_symbol: impl Into<String>) -> Self {
        Self {
            reader,
            native_symbol: native_symbol.into(),
            symbols: RwLock::new(HashMap::new()),
            decimals: RwLock::new(HashMap::new()),
            balances: RwLock::new(HashMap::new()),
        }
    }

    pub fn native_symbol(&self) -> &str {
        &self.native_symbol
    }

    /// Symbol for a user-supplied address string.
    ///
    /// Sentinels resolve without a remote call. Anything else must be `0x` +
    /// 40 hex digits or the call fails with `InvalidInput`.
    pub async fn get_symbol(&self, address: &str) -> CoreResult<String> {
        match sentinel(address) {
            Some(Sentinel::Native) => return Ok(self.native_symbol.clone()),
            Some(Sentinel::Unknown) => return Ok(UNKNOWN_SYMBOL.to_string()),
            None => {}
        }
        let address = parse_address(address)?;
        Ok(self.symbol_of(address).await)
    }

    /// Symbol for an already parsed address. Never fails.
    pub async fn symbol_of(&self, address: Address) -> String {
        if address.is_zero() {
            return UNKNOWN_SYMBOL.to_string();
        }
        if is_native(&address) {
            return self.native_symbol.clone();
        }
        if let Some(hit) = self.symbols.read().await.get(&address) {
            log::debug!("symbol cache hit for {:?}", address);
            return hit.clone();
        }

        let symbol = match self.reader.symbol(address).await {
            Ok(s) => s,
            Err(e) => {
                log::warn!("symbol lookup failed for {:?}: {}", address, e);
                fallback_symbol(&address)
            }
        };
        self.symbols.write().await.insert(address, symbol.clone());
        symbol
    }

    pub async fn get_decimals(&self, address: Address) -> u8 {
        if is_native(&address) || address.is_zero() {
            return DEFAULT_DECIMALS;
        }
        if let Some(hit) = self.decimals.read().await.get(&address) {
            return *hit;
        }

        let decimals = match self.reader.decimals(address).await {
            Ok(d) => d,
            Err(e) => {
                log::warn!("decimals lookup failed for {:?}: {}; assuming {}", address, e, DEFAULT_DECIMALS);
                DEFAULT_DECIMALS
            }
        };
        self.decimals.write().await.insert(address, decimals);
        decimals
    }

    /// `balanceOf(owner)` on `token`. Zero on failure.
    pub async fn get_balance(&self, token: Address, owner: Address) -> U256 {
        let key = (token, owner);
        if let Some(hit) = self.balances.read().await.get(&key) {
            return *hit;
        }

        match self.reader.balance_of(token, owner).await {
            Ok(balance) => {
                self.balances.write().await.insert(key, balance);
                balance
            }
            Err(e) => {
                log::warn!("balanceOf({:?}) on {:?} failed: {}", owner, token, e);
                U256::zero()
            }
        }
    }

    /// Balance lookup from address strings; bad input is rejected before any call.
    pub async fn get_balance_str(&self, token: &str, owner: &str) -> CoreResult<U256> {
        let token = parse_address(token)?;
        let owner = parse_address(owner)?;
        Ok(self.get_balance(token, owner).await)
    }

    /// Drops balances owned by `owner`; used on account switch.
    pub async fn clear_balances_for(&self, owner: Address) {
        self.balances.write().await.retain(|(_, o), _| *o != owner);
    }

    pub async fn clear_balances(&self) {
        self.balances.write().await.clear();
    }

    pub async fn clear(&self) {
        self.symbols.write().await.clear();
        self.decimals.write().await.clear();
        self.balances.write().await.clear();
    }
}

fn is_native(address: &Address) -> bool {
    address.as_bytes().iter().all(|b| *b == 0xee)
}

impl std::fmt::Debug for TokenMetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenMetadataCache")
            .field("native_symbol", &self.native_symbol)
            .finish()
    }
}
