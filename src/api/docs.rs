//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use super::handlers::{events, session, subscription, system};

/// Aggregated OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "lendflow-gateway",
        description = "Role-based session routing and realtime event gateway"
    ),
    paths(
        system::health_handler,
        system::events_handler,
        system::realtime_policy_handler,
        system::theme_handler,
        session::open_session,
        session::route_session,
        session::close_session,
        events::publish_event,
        subscription::create_subscription,
    ),
    tags(
        (name = "System", description = "Health and client configuration"),
        (name = "Sessions", description = "Role-based landing routing"),
        (name = "Realtime", description = "Realtime event publishing"),
        (name = "Subscriptions", description = "Subscription proxy"),
    )
)]
pub struct ApiDoc;
