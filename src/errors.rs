use std::fmt;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Http(reqwest::Error),
    Exchange(StatusCode, String),
    Key(String),
    JwtSign(String),
    Config(String),
}

impl Error {
    /// Coarse failure class surfaced in audit details and log fields, so
    /// operators can tell local signing problems from remote exchange ones.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Key(_) | Error::JwtSign(_) => "signing",
            Error::Http(_) | Error::Exchange(_, _) => "exchange",
            Error::Io(_) | Error::Json(_) | Error::Config(_) => "config",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::Json(err) => write!(f, "JSON error: {err}"),
            Error::Http(err) => write!(f, "HTTP transport error: {err}"),
            Error::Exchange(status, body) => {
                write!(f, "token endpoint returned {status}: {body}")
            }
            Error::Key(msg) => write!(f, "{msg}"),
            Error::JwtSign(msg) => write!(f, "{msg}"),
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}
