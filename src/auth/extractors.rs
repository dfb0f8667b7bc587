use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::ApiError;

/// The authenticated caller, extracted from request extensions populated by
/// `AuthMiddleware`. Handlers receive identity as an explicit argument; there
/// is no ambient current-user state anywhere else.
///
/// If the claims are missing (middleware not mounted, or a route wired up
/// outside the protected scope) the extractor fails with a 401.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub Claims);

impl AuthedUser {
    /// Owner id used to scope every store operation.
    pub fn user_id(&self) -> i64 {
        self.0.sub
    }
}

impl FromRequest for AuthedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(AuthedUser(claims))),
            None => {
                let err = ApiError::Unauthenticated("Missing authentication".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
