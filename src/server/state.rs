use crate::auth::{AuthService, TokenIssuer};
use crate::error::PortalResult;
use crate::model::{Attendance, Marks, Teacher};
use crate::providers::{ProviderError, RecordRepository, StudentRepository};
use crate::server::ApiError;
use crate::storage::Datastore;

/// Application state shared across handlers.
///
/// Every repository wraps a clone of the same [`Datastore`], which is itself a
/// cheap handle (an `Arc`'d map or a connection pool).
#[derive(Clone)]
pub struct AppState {
    pub students: StudentRepository<Datastore>,
    pub teachers: RecordRepository<Datastore, Teacher>,
    pub attendance: RecordRepository<Datastore, Attendance>,
    pub marks: RecordRepository<Datastore, Marks>,
    pub auth: AuthService<Datastore>,
    datastore: String,
    expose_errors: bool,
}

impl AppState {
    /// Build every repository over `datastore`, declaring its unique indexes.
    pub async fn new(
        datastore: Datastore,
        tokens: TokenIssuer,
        expose_errors: bool,
    ) -> PortalResult<Self> {
        Ok(Self {
            students: StudentRepository::new(datastore.clone()).await?,
            teachers: RecordRepository::new(datastore.clone()),
            attendance: RecordRepository::new(datastore.clone()),
            marks: RecordRepository::new(datastore.clone()),
            auth: AuthService::new(datastore.clone(), tokens).await?,
            datastore: datastore.describe(),
            expose_errors,
        })
    }

    /// Description of the active datastore for the health endpoint.
    pub fn datastore(&self) -> &str {
        &self.datastore
    }

    pub fn expose_errors(&self) -> bool {
        self.expose_errors
    }

    /// Error mapper for `map_err`, naming the action reported on a 500.
    pub fn fail(&self, action: &'static str) -> impl Fn(ProviderError) -> ApiError {
        let expose = self.expose_errors;
        move |error| ApiError::from_provider(error, action, expose)
    }
}
