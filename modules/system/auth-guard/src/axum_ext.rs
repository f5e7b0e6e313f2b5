//! Axum extractors for the identity attached by the guard

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use sleepr_security::{RequestContext, ResolvedIdentity};

use crate::problem::Problem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentityRejection {
    #[error("no identity attached to request")]
    NoIdentity,
    #[error("RequestContext not found - guard middleware not installed")]
    GuardNotInstalled,
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NoIdentity => Problem::unauthorized().into_response(),
            Self::GuardNotInstalled => {
                tracing::error!("{self}");
                Problem::internal().into_response()
            }
        }
    }
}

fn request_context(parts: &Parts) -> Result<&RequestContext, IdentityRejection> {
    parts
        .extensions
        .get::<RequestContext>()
        .ok_or(IdentityRejection::GuardNotInstalled)
}

/// Identity of the caller. Only usable on guarded routes.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub ResolvedIdentity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        request_context(parts)?
            .identity()
            .cloned()
            .map(CurrentIdentity)
            .map_err(|_| IdentityRejection::NoIdentity)
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(request_context(parts)?
            .identity()
            .ok()
            .cloned()
            .map(CurrentIdentity))
    }
}

/// Identity of the caller if one was attached, `None` on public routes.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<ResolvedIdentity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = request_context(parts)?;
        Ok(Self(ctx.identity().ok().cloned()))
    }
}
