//! Service wiring and router assembly.

use std::sync::Arc;

use axum::Router;
use pb_config::AppConfig;
use utoipa::openapi::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::directory::{graph_users_router, GraphClient, GraphUsersState};
use crate::legacy::{auth0_users_router, Auth0Client, Auth0UsersState};
use crate::migration::{migration_alias_router, migration_router, MigrationFlow, MigrationState};
use crate::policy::error_messages_router;
use crate::profile::{external_user_data_router, ProfileService, ProfileState};
use crate::shared::health_api::{health_router, HealthState};
use crate::shared::http::build_client;
use crate::testing::{oauth_credentials_router, CredentialLoginService, TestingState};

/// Everything the HTTP layer needs
#[derive(Clone)]
pub struct AppServices {
    pub auth0: Arc<Auth0Client>,
    pub graph: Arc<GraphClient>,
    pub migration: Arc<MigrationFlow>,
    pub profiles: Arc<ProfileService>,
    /// Present only when `testing.enabled`
    pub test_login: Option<Arc<CredentialLoginService>>,
    pub health: HealthState,
}

impl AppServices {
    /// Build clients from configuration, one HTTP client per collaborator.
    pub fn from_config(config: &AppConfig) -> std::result::Result<Self, reqwest::Error> {
        let auth0 = Arc::new(Auth0Client::new(
            build_client(&config.http_client)?,
            config.auth0.clone(),
        ));
        let graph = Arc::new(GraphClient::new(
            build_client(&config.http_client)?,
            config.graph.clone(),
        ));
        let migration = Arc::new(MigrationFlow::new(auth0.clone(), graph.clone()));
        let profiles = Arc::new(ProfileService::from_endpoints(
            build_client(&config.http_client)?,
            &config.providers,
        ));

        let test_login = if config.testing.enabled {
            Some(Arc::new(CredentialLoginService::new(
                build_client(&config.http_client)?,
                config.auth0.clone(),
                config.oauth.clone(),
                config.testing.clone(),
            )))
        } else {
            None
        };

        let health = HealthState::new(Some(env!("CARGO_PKG_VERSION").to_string()))
            .with_backend("auth0", auth0.is_configured())
            .with_backend("graph", graph.is_configured());

        Ok(Self {
            auth0,
            graph,
            migration,
            profiles,
            test_login,
            health,
        })
    }
}

/// Assemble all routes and the collected OpenAPI document.
pub fn build_router(services: AppServices) -> (Router, OpenApi) {
    let migration_state = MigrationState {
        flow: services.migration.clone(),
    };

    let mut api = OpenApiRouter::new()
        .merge(migration_router(migration_state.clone()))
        .nest("/api/auth0-users", auth0_users_router(Auth0UsersState { client: services.auth0 }))
        .nest("/api/graph-users", graph_users_router(GraphUsersState { client: services.graph }))
        .nest(
            "/api/external-user-data",
            external_user_data_router(ProfileState {
                service: services.profiles,
            }),
        )
        .nest("/api/error-messages", error_messages_router());

    if let Some(service) = services.test_login {
        api = api.nest("/api/oauth-credentials", oauth_credentials_router(TestingState { service }));
    }

    let (router, mut openapi) = api.split_for_parts();

    openapi.info.title = "Policy Bridge API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description =
        Some("Identity migration, user management, and policy support endpoints".to_string());

    let app = Router::new()
        .merge(router)
        .merge(migration_alias_router(migration_state))
        .nest("/health", health_router(services.health));

    (app, openapi)
}
