use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use chrono::{Duration, Utc};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_LIFETIME_DAYS: i64 = 31;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sid: String, // session id
    pub exp: usize,  // expiration time
    pub iat: usize,  // issued at
}

/// Identifies the browser session a request belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

pub fn issue_token(session_id: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = SessionClaims {
        sid: session_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(SESSION_LIFETIME_DAYS)).timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn read_token(token: &str, secret: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "iat", "sid"]);

    decode::<SessionClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
}

/// Attaches a [`SessionId`] to every request, reusing the one carried by a
/// valid signed `session` cookie or starting a new session. The cookie is
/// re-issued on every response so the session slides forward.
pub struct SessionMiddleware {
    secret: Rc<String>,
}

impl SessionMiddleware {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Rc::new(secret.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service,
            secret: self.secret.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: S,
    secret: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let existing = req.cookie(SESSION_COOKIE).and_then(|cookie| {
            read_token(cookie.value(), &self.secret)
                .map_err(|err| log::debug!("Discarding session cookie: {:?}", err))
                .ok()
        });

        let session_id = match existing {
            Some(claims) => claims.sid,
            None => {
                let sid = Uuid::new_v4().to_string();
                log::debug!("Starting session {}", sid);
                sid
            }
        };

        req.extensions_mut().insert(SessionId(session_id.clone()));

        let secret = self.secret.clone();
        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;

            match issue_token(&session_id, &secret) {
                Ok(token) => {
                    let cookie = Cookie::build(SESSION_COOKIE, token)
                        .path("/")
                        .http_only(true)
                        .same_site(SameSite::Lax)
                        .max_age(CookieDuration::days(SESSION_LIFETIME_DAYS))
                        .finish();
                    res.response_mut().add_cookie(&cookie)?;
                }
                Err(err) => log::error!("Failed to sign session cookie: {:?}", err),
            }

            Ok(res)
        })
    }
}
