use crate::error::Result;
use crate::facts::{RequestFacts, ResolvedIdentity, ResolvedTenant};
use crate::gate::{Gate, GateDecision};
use crate::meta::RouteMeta;
use crate::usage::UsageSource;
use auth_identity::IdentityService;
use axum::extract::{Request, State};
use axum::http::{header, request::Parts, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use uuid::Uuid;

/// Person id placed in request extensions by the session layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPerson(pub Uuid);

/// Shared state for [`enforce`]
#[derive(Clone)]
pub struct GateState {
    pub gate: Arc<Gate>,
    pub identity: Arc<IdentityService>,
    pub usage: Arc<dyn UsageSource>,
}

impl GateState {
    /// Resolve tenant and identity, then ask the gate
    pub async fn check(
        &self,
        meta: &RouteMeta,
        facts: &RequestFacts,
        session: Option<SessionPerson>,
    ) -> Result<(GateDecision, Option<ResolvedTenant>, Option<ResolvedIdentity>)> {
        let tenant = match self.identity.resolve_tenant(&facts.host).await? {
            Some(account) => {
                let usage = self.usage.usage(&account).await?;
                Some(ResolvedTenant { account, usage })
            }
            None => None,
        };

        let identity = match (&tenant, session) {
            (Some(tenant), Some(SessionPerson(person_id))) => {
                match self.identity.find_person(&tenant.account, person_id).await? {
                    Some(person) => {
                        let roles = self.identity.effective_roles(&person).await?;
                        Some(ResolvedIdentity { person, roles })
                    }
                    None => None,
                }
            }
            _ => None,
        };

        let decision = self
            .gate
            .evaluate(meta, facts, tenant.as_ref(), identity.as_ref())?;
        Ok((decision, tenant, identity))
    }
}

/// Derive request facts, honouring `X-Forwarded-Proto` from a terminating proxy
pub fn facts_from_parts(parts: &Parts) -> RequestFacts {
    let forwarded_https = parts
        .headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"));
    let secure = forwarded_https || parts.uri.scheme_str() == Some("https");

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|authority| authority.to_string()))
        .unwrap_or_default();

    let full_path = parts
        .uri
        .path_and_query()
        .map_or_else(|| "/".to_string(), |pq| pq.as_str().to_string());

    RequestFacts::new(parts.method.clone(), secure, host, full_path)
}

/// Gate every request that carries a [`RouteMeta`] extension
///
/// Allowed requests continue with the resolved tenant and identity stored in
/// the request extensions. Requests without route metadata pass untouched.
pub async fn enforce(State(state): State<GateState>, request: Request, next: Next) -> Response {
    let Some(meta) = request.extensions().get::<RouteMeta>().cloned() else {
        return next.run(request).await;
    };

    let (mut parts, body) = request.into_parts();
    let facts = facts_from_parts(&parts);
    let session = parts.extensions.get::<SessionPerson>().copied();

    match state.check(&meta, &facts, session).await {
        Ok((GateDecision::Allow, tenant, identity)) => {
            if let Some(tenant) = tenant {
                parts.extensions.insert(tenant);
            }
            if let Some(identity) = identity {
                parts.extensions.insert(identity);
            }
            next.run(Request::from_parts(parts, body)).await
        }
        Ok((decision, _, _)) => decision.into_response(),
        Err(err) => {
            tracing::error!(
                path = %facts.full_path,
                error = %err,
                "authorization gate failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

impl IntoResponse for GateDecision {
    fn into_response(self) -> Response {
        match self {
            // Only reached when a handler renders the decision itself
            Self::Allow => StatusCode::OK.into_response(),
            Self::Redirect {
                location,
                permanent,
                ..
            } => {
                let status = if permanent {
                    StatusCode::MOVED_PERMANENTLY
                } else {
                    StatusCode::FOUND
                };
                (status, [(header::LOCATION, location)]).into_response()
            }
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}
