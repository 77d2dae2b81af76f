//! Conversions from external infrastructure errors into domain errors.

use hound::Error as WavError;
use keyring::Error as KeyringError;
use smartcal_domain::SmartCalError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SmartCalError);

impl From<InfraError> for SmartCalError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SmartCalError> for InfraError {
    fn from(value: SmartCalError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSmartCalError {
    fn into_smartcal(self) -> SmartCalError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → SmartCalError */
/* -------------------------------------------------------------------------- */

impl IntoSmartCalError for KeyringError {
    fn into_smartcal(self) -> SmartCalError {
        use KeyringError::{
            Ambiguous, BadEncoding, Invalid, NoEntry, NoStorageAccess, PlatformFailure, TooLong,
        };

        let description = self.to_string();

        match self {
            NoEntry => SmartCalError::NotFound("keychain entry not found".into()),
            BadEncoding(_) => {
                SmartCalError::Security("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => SmartCalError::Security(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                SmartCalError::Security(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            Ambiguous(entries) => SmartCalError::Security(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => {
                SmartCalError::Security(format!("keychain platform error: {err}"))
            }
            NoStorageAccess(err) => {
                SmartCalError::Security(format!("unable to access secure storage: {err}"))
            }
            _ => SmartCalError::Security(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_smartcal())
    }
}

/* -------------------------------------------------------------------------- */
/* hound::Error → SmartCalError */
/* -------------------------------------------------------------------------- */

impl IntoSmartCalError for WavError {
    fn into_smartcal(self) -> SmartCalError {
        match self {
            WavError::IoError(err) => SmartCalError::Audio(format!("WAV I/O failure: {err}")),
            WavError::FormatError(reason) => {
                SmartCalError::InvalidInput(format!("malformed WAV data: {reason}"))
            }
            WavError::Unsupported => {
                SmartCalError::Unsupported("WAV encoding not supported".into())
            }
            other => SmartCalError::Audio(other.to_string()),
        }
    }
}

impl From<WavError> for InfraError {
    fn from(value: WavError) -> Self {
        InfraError(value.into_smartcal())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → SmartCalError */
/* -------------------------------------------------------------------------- */

impl IntoSmartCalError for std::io::Error {
    fn into_smartcal(self) -> SmartCalError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => SmartCalError::NotFound(self.to_string()),
            ErrorKind::PermissionDenied => SmartCalError::Security(self.to_string()),
            _ => SmartCalError::Internal(format!("I/O failure: {self}")),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_smartcal())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
