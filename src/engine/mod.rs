pub mod pool_form;
pub mod pool_index;
pub mod positions;
pub mod quote;
pub mod session;
pub mod tokens;

pub use pool_form::{CreatePoolForm, CreatePoolParams};
pub use pool_index::{canonicalize_pair, canonicalize_pair_str, PoolIndex, PoolView};
pub use positions::{PositionBook, PositionResolver, PositionView};
pub use quote::{
    select_best, PoolQuote, Quote, QuoteEngine, QuoteFailure, QuotePhase, QuoteRequest,
    QuoteSettings, SwapPlan,
};
pub use session::{Collaborators, Session};
pub use tokens::TokenMetadataCache;
