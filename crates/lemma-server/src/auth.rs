use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use lemma_types::Actor;

use crate::error::ApiError;
use crate::state::AppState;

/// Account name or email.
pub const ACCOUNT_HEADER: &str = "x-auth-account";
pub const PASSWORD_HEADER: &str = "x-auth-password";

/// Login credentials carried in request headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub account: String,
    pub password: String,
}

impl Credentials {
    /// Both headers present and non-blank, or `None`.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            account: header(ACCOUNT_HEADER)?,
            password: header(PASSWORD_HEADER)?,
        })
    }
}

/// The logged-in account for this request, if any. Inserted into request
/// extensions by [`resolve_login`].
#[derive(Clone, Debug, Default)]
pub struct CurrentActor(pub Option<Actor>);

/// Middleware resolving login headers into a [`CurrentActor`].
///
/// Requests without credentials pass through anonymously. Bad credentials
/// end the request with 401.
pub async fn resolve_login(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let actor = match Credentials::from_headers(request.headers()) {
        Some(credentials) => Some(
            state
                .accounts
                .login(&credentials.account, &credentials.password)
                .await?,
        ),
        None => None,
    };
    request.extensions_mut().insert(CurrentActor(actor));
    Ok(next.run(request).await)
}
