use crate::api::Error as ApiError;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Session expired, please login again.")]
    SessionExpired,

    /// Transport failure, with a message fit for display
    #[error("{0}")]
    Network(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    /// Stable name of the signal surfaced to the page
    pub fn signal(&self) -> &'static str {
        match self {
            Error::Unauthenticated | Error::SessionExpired | Error::Api(ApiError::Unauthorized) => {
                "unauthenticated"
            }
            Error::Network(_) | Error::Api(_) => "network-failure",
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Error {
        tracing::debug!(?err, "request failed");
        if err.is_timeout() {
            Error::Network(String::from("The server took too long to answer"))
        } else if err.is_decode() {
            Error::Network(String::from("The server sent an unexpected answer"))
        } else {
            Error::Network(String::from("Could not reach the server"))
        }
    }
}
