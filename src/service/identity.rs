use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::error::ApiError;
use crate::structs::alias::UserId;

/// 上游认证层写入的用户标识
pub const USER_HEADER: &str = "X-User-Id";

#[derive(Debug, Clone, PartialEq)]
pub struct Identity(pub UserId);

impl Identity {
    pub fn into_inner(self) -> UserId {
        self.0
    }
}

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req
            .headers()
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Identity(value.to_string()));
        ready(user.ok_or(ApiError::Unauthorized))
    }
}
