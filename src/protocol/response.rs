//! Response definitions
//!
//! Decoded server replies.

use bytes::Bytes;

use super::Status;

/// A decoded response
///
/// `Ok(None)` is a bare OK status byte; `Ok(Some(..))` had a length-prefixed
/// payload, which may itself be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok(Option<Bytes>),
    Einval,
    Enotfound,
    Ebinary,
    Ebig,
    Eunk,
}

impl Response {
    /// Response for a status that carries no payload
    pub fn from_status(status: Status) -> Self {
        match status {
            Status::Ok => Response::Ok(None),
            Status::Einval => Response::Einval,
            Status::Enotfound => Response::Enotfound,
            Status::Ebinary => Response::Ebinary,
            Status::Ebig => Response::Ebig,
            Status::Eunk => Response::Eunk,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Response::Ok(_) => Status::Ok,
            Response::Einval => Status::Einval,
            Response::Enotfound => Status::Enotfound,
            Response::Ebinary => Status::Ebinary,
            Response::Ebig => Status::Ebig,
            Response::Eunk => Status::Eunk,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok(_))
    }

    /// Payload of an OK response, if any
    pub fn content(&self) -> Option<&Bytes> {
        match self {
            Response::Ok(content) => content.as_ref(),
            _ => None,
        }
    }
}
