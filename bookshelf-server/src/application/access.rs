use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Read,
    Write,
}

/// Per-endpoint permission policy, checked before the payload is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Policy {
    AllowAny,
    AuthenticatedOrReadOnly,
    Authenticated,
}

impl Policy {
    pub(crate) fn authorize(self, action: Action, authenticated: bool) -> Result<(), DomainError> {
        let allowed = match self {
            Policy::AllowAny => true,
            Policy::AuthenticatedOrReadOnly => action == Action::Read || authenticated,
            Policy::Authenticated => authenticated,
        };

        if allowed {
            Ok(())
        } else {
            Err(DomainError::Unauthenticated)
        }
    }
}
