use std::future::{ready, Ready};

use actix_web::{
    dev::Payload, error::ErrorInternalServerError, Error, FromRequest, HttpMessage, HttpRequest,
};

use crate::middleware::session::SessionId;

impl FromRequest for SessionId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(session_id) = req.extensions().get::<SessionId>() {
            ready(Ok(session_id.clone()))
        } else {
            ready(Err(ErrorInternalServerError("Session not initialised")))
        }
    }
}
