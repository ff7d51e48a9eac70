//! Result codes and the outcome of a probe run.

use std::fmt;

use strum_macros::IntoStaticStr;

use crate::config::{
    GENERIC_FAILURE_CODE, RESULT_NOT_FOUND, RESULT_OK, RESULT_PROXY_SERVER_NOT_AVAILABLE,
    RESULT_SERVER_CERTIFICATE_FAILED, RESULT_SERVER_NOT_AVAILABLE,
    RESULT_TEXT_NOT_FOUND_AFTER_SUBMIT, RESULT_TIMEOUT, RESULT_WRONG_CREDENTIALS,
    RESULT_WRONG_PROXY_CREDENTIALS,
};

/// Classification of a probe run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Ok,
    Timeout,
    ServerNotAvailable,
    WrongCredentials,
    ProxyServerNotAvailable,
    WrongProxyCredentials,
    ServerCertificateFailed,
    /// Expected text, title or element not found.
    NotFound,
    /// Expected text not found in the response to a submitted form.
    TextNotFoundAfterSubmit,
    /// Any status other than 2xx, 401 and 407, passed through verbatim.
    HttpStatus(u16),
    /// Configuration errors and failures outside the taxonomy.
    Exception,
}

impl ResultCode {
    /// The integer reported to the caller.
    pub fn code(&self) -> i32 {
        match self {
            ResultCode::Ok => RESULT_OK,
            ResultCode::Timeout => RESULT_TIMEOUT,
            ResultCode::ServerNotAvailable => RESULT_SERVER_NOT_AVAILABLE,
            ResultCode::WrongCredentials => RESULT_WRONG_CREDENTIALS,
            ResultCode::ProxyServerNotAvailable => RESULT_PROXY_SERVER_NOT_AVAILABLE,
            ResultCode::WrongProxyCredentials => RESULT_WRONG_PROXY_CREDENTIALS,
            ResultCode::ServerCertificateFailed => RESULT_SERVER_CERTIFICATE_FAILED,
            ResultCode::NotFound => RESULT_NOT_FOUND,
            ResultCode::TextNotFoundAfterSubmit => RESULT_TEXT_NOT_FOUND_AFTER_SUBMIT,
            ResultCode::HttpStatus(status) => i32::from(*status),
            ResultCode::Exception => GENERIC_FAILURE_CODE,
        }
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// What a probe run produced: one result code and an optional diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub result: ResultCode,
    pub message: Option<String>,
}

impl ProbeOutcome {
    pub fn new(result: ResultCode) -> Self {
        ProbeOutcome {
            result,
            message: None,
        }
    }

    pub fn with_message(result: ResultCode, message: impl Into<String>) -> Self {
        ProbeOutcome {
            result,
            message: Some(message.into()),
        }
    }

    /// Full result code. Note that process exit statuses keep only the low
    /// 8 bits, so a passed-through 404 reaches a shell as 148.
    pub fn exit_code(&self) -> i32 {
        self.result.code()
    }

    pub fn is_ok(&self) -> bool {
        self.result == ResultCode::Ok
    }
}
