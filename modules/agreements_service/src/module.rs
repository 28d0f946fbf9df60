//! Module wiring: repositories, service, user administration and routes

use crate::api::rest::register_routes;
use crate::config::{AgreementsConfig, AuthConfig, IdentityConfig};
use crate::domain::{
    EventPublisher, IdentityProvider, NoOpEventPublisher, Service, TokenVerifier,
    TracingEventPublisher, UserAdministration,
};
use crate::infra::auth::JwtVerifier;
use crate::infra::identity::HttpIdentityProvider;
use crate::infra::storage::{
    Migrator, SeaOrmAgreementRepository, SeaOrmCatalogRepository, SeaOrmComplianceRepository,
};
use anyhow::Result;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Agreements service module
pub struct AgreementsServiceModule {
    db: Arc<DatabaseConnection>,
    service: Arc<Service>,
    admin: Arc<UserAdministration>,
}

impl AgreementsServiceModule {
    /// Wire the module with explicit auth collaborators
    pub fn new(
        db: DatabaseConnection,
        config: AgreementsConfig,
        verifier: Arc<dyn TokenVerifier>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let db = Arc::new(db);

        let agreements = Arc::new(SeaOrmAgreementRepository::new(db.clone()));
        let catalog = Arc::new(SeaOrmCatalogRepository::new(db.clone()));
        let compliance = Arc::new(SeaOrmComplianceRepository::new(db.clone()));

        let event_publisher: Arc<dyn EventPublisher> = if config.audit_events {
            Arc::new(TracingEventPublisher)
        } else {
            Arc::new(NoOpEventPublisher)
        };

        let service = Arc::new(Service::new(
            agreements,
            catalog,
            compliance,
            event_publisher,
            config,
        ));
        let admin = Arc::new(UserAdministration::new(service.clone(), verifier, identity));

        tracing::info!("agreements service initialized");
        Self { db, service, admin }
    }

    /// Wire the module with the JWT verifier and the HTTP auth provider client
    pub fn from_config(
        db: DatabaseConnection,
        config: AgreementsConfig,
        auth: &AuthConfig,
        identity: &IdentityConfig,
    ) -> Result<Self> {
        let verifier = Arc::new(JwtVerifier::new(auth));
        let identity = Arc::new(HttpIdentityProvider::new(identity)?);
        Ok(Self::new(db, config, verifier, identity))
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        Migrator::up(&*self.db, None).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn admin(&self) -> Arc<UserAdministration> {
        self.admin.clone()
    }

    /// REST routes of the module
    pub fn router(&self) -> Router {
        register_routes(Router::new(), self.service.clone(), self.admin.clone())
    }
}
