use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{Method, Uri};
use axum::response::Redirect;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use lemma_chain::ChainView;
use lemma_gate::CreateNodeRequest;
use lemma_ledger::{AccountView, Registration, SearchHit};
use lemma_types::{Address, FacetFilter};

use crate::auth::CurrentActor;
use crate::error::ApiError;
use crate::state::AppState;

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /ref`
pub async fn create_ref(
    State(state): State<AppState>,
    Extension(CurrentActor(actor)): Extension<CurrentActor>,
    payload: Result<Json<CreateNodeRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(payload)?;
    let address = state.creator.create(&request, actor).await?;
    Ok(Json(json!({ "link": address.to_string() })))
}

/// `POST /accounts`
pub async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let registration = json_body(payload)?;
    let name = state.accounts.register(&registration).await?;
    Ok(Json(json!({ "name": name })))
}

/// `GET /accounts/:name`
pub async fn show_account(
    State(state): State<AppState>,
    Extension(CurrentActor(actor)): Extension<CurrentActor>,
    Path(name): Path<String>,
) -> Result<Json<AccountView>, ApiError> {
    let view = state.accounts.view(name.trim(), actor.as_ref()).await?;
    Ok(Json(view))
}

/// `GET /verify/:code`
pub async fn verify(
    State(state): State<AppState>,
    code: Option<Path<String>>,
) -> Result<Redirect, ApiError> {
    let website = &state.config.website;
    let code = code.map(|Path(code)| code).unwrap_or_default();
    if code.trim().is_empty() {
        return Ok(Redirect::temporary(website));
    }
    let activated = state.accounts.verify(&code).await?;
    Ok(Redirect::temporary(&format!(
        "{website}?activated={}",
        u8::from(activated)
    )))
}

/// `GET /search/:terms`
pub async fn search(
    State(state): State<AppState>,
    terms: Option<Path<String>>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let terms = terms.map(|Path(terms)| terms).unwrap_or_default();
    let hits = state.search.search(&terms).await?;
    Ok(Json(hits))
}

#[derive(Debug, Default, Deserialize)]
pub struct ChainQuery {
    pub depth: Option<String>,
    pub types: Option<String>,
}

impl ChainQuery {
    fn depth(&self) -> Result<Option<usize>, ApiError> {
        match self.depth.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => match raw.parse::<usize>() {
                Ok(depth) if depth > 0 => Ok(Some(depth)),
                _ => Err(ApiError::BadRequest("depth query param is malformed".into())),
            },
        }
    }

    fn filter(&self) -> Result<FacetFilter, ApiError> {
        match self.types.as_deref() {
            None => Ok(FacetFilter::any()),
            Some(raw) => FacetFilter::parse_list(raw)
                .map_err(|_| ApiError::BadRequest("types query param is malformed".into())),
        }
    }
}

/// `GET /*address`: every path no other route claims.
pub async fn resolve_chain(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    query: Option<Query<ChainQuery>>,
) -> Result<Json<ChainView>, ApiError> {
    if method != Method::GET {
        return Err(ApiError::MethodNotAllowed);
    }

    let raw = uri.path().trim_start_matches('/');
    let address = urlencoding::decode(raw)
        .map(|decoded| decoded.trim().to_string())
        .map_err(|_| ApiError::BadRequest("can't find ref".into()))?;
    if Address::parse(&address).is_err() {
        return Err(ApiError::BadRequest("can't find ref".into()));
    }

    let Query(query) = query.ok_or_else(|| ApiError::BadRequest("query is malformed".into()))?;
    let depth = query.depth()?;
    let filter = query.filter()?;

    let view = state.resolver.resolve(&address, depth, &filter).await?;
    Ok(Json(view))
}
