use futures::future::join_all;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, State};
use std::sync::Arc;

use crate::bootstrap::AppState;
use crate::engine::{QuoteFailure, QuoteRequest};
use crate::math::parse_address;
use crate::models::TradeType;
use crate::web::dto::{
    ErrorResponse, PoolRow, PositionRow, PositionsQuery, QuoteQuery, QuoteResponse, TokenRow,
};

type ApiResult<T> = Result<Json<T>, (Status, Json<ErrorResponse>)>;

fn api_error(status: Status, message: impl ToString) -> (Status, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: message.to_string() }))
}

#[get("/api/v1/pools")]
pub async fn pools(app_state: &State<Arc<AppState>>) -> Json<Vec<PoolRow>> {
    let rows = app_state.session.pool_table().await;
    Json(rows.into_iter().map(PoolRow::from).collect())
}

#[get("/api/v1/tokens")]
pub async fn tokens(app_state: &State<Arc<AppState>>) -> ApiResult<Vec<TokenRow>> {
    let session = &app_state.session;
    let list = session.pools.token_list().await.map_err(|e| {
        log::error!("Failed to load token list: {}", e);
        api_error(Status::BadGateway, e)
    })?;

    let rows = join_all(list.into_iter().map(|address| async move {
        let (symbol, decimals) = futures::join!(
            session.tokens.symbol_of(address),
            session.tokens.get_decimals(address)
        );
        TokenRow { address: format!("{:?}", address), symbol, decimals }
    }))
    .await;
    Ok(Json(rows))
}

#[get("/api/v1/positions?<query..>")]
pub async fn positions(query: PositionsQuery, app_state: &State<Arc<AppState>>) -> ApiResult<Vec<PositionRow>> {
    let owner = match query.owner.as_deref() {
        Some(raw) => Some(parse_address(raw).map_err(|e| api_error(Status::BadRequest, e))?),
        None => None,
    };
    let rows = app_state.session.position_table(owner).await;
    Ok(Json(rows.into_iter().map(PositionRow::from).collect()))
}

#[get("/api/v1/quote?<query..>")]
pub async fn quote(query: QuoteQuery, app_state: &State<Arc<AppState>>) -> ApiResult<QuoteResponse> {
    let token_in = parse_address(&query.token_in).map_err(|e| api_error(Status::BadRequest, e))?;
    let token_out = parse_address(&query.token_out).map_err(|e| api_error(Status::BadRequest, e))?;
    let trade_type = if query.exact_output.unwrap_or(false) {
        TradeType::ExactOutput
    } else {
        TradeType::ExactInput
    };
    let request = QuoteRequest { token_in, token_out, amount: query.amount, trade_type };

    match app_state.session.quotes.quote_best(&request).await {
        Ok(q) => Ok(Json(q.into())),
        Err(failure) => {
            let status = match failure {
                QuoteFailure::Invalid(_) => Status::BadRequest,
                QuoteFailure::NoPool => Status::NotFound,
                QuoteFailure::AllQuotesFailed => Status::BadGateway,
            };
            log::error!("Quote {:?} -> {:?} failed: {}", token_in, token_out, failure);
            Err(api_error(status, failure))
        }
    }
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
