use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with id={id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Date conflict: the requested period is already taken")]
    DateConflict,

    #[error("Reservation {0} is not confirmed")]
    NotConfirmed(String),

    #[error("Reservation {0} has no guest email")]
    MissingGuestEmail(String),

    #[error("Upstream {service} failure: {detail}")]
    Upstream {
        service: &'static str,
        detail: String,
    },
}

impl DomainError {
    pub fn upstream(service: &'static str, detail: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            detail: detail.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
