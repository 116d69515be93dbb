use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use log::debug;

use crate::user;

use super::Verifier;

/// Resolves the bearer token to a known user and attaches it as [`super::User`].
pub async fn authorize(
    verifier: State<Verifier>,
    user_repository: State<user::Repository>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> crate::Result<Response> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(super::Error::Unauthorized)?;

    let id = verifier.verify(bearer.token())?;

    let user = match user_repository.find_by_id(&id).await {
        Ok(u) => u,
        Err(user::Error::NotFound(_)) => {
            debug!("Token subject {id} is not a known user");
            return Err(super::Error::Unauthorized.into());
        }
        Err(e) => return Err(super::Error::from(e).into()),
    };

    req.extensions_mut().insert(super::User::from(user));

    Ok(next.run(req).await)
}
