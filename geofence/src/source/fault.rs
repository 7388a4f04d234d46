//! Position source faults and authorization status.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Classification of a position source failure.
///
/// The numeric codes returned by [`FaultKind::legacy_code`] match the error
/// constants exposed by older location-monitor integrations, so hosts that
/// still speak that protocol can map faults without a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Location services are off or the required authorization is missing.
    Unavailable,
    /// The user denied (or revoked) position access.
    AuthorizationDenied,
    /// The source failed to read a position fix.
    ReadError,
    /// Anything else.
    GeneralFailure,
}

impl FaultKind {
    pub fn legacy_code(&self) -> u32 {
        match self {
            FaultKind::GeneralFailure => 0x1000,
            FaultKind::Unavailable => 0x1001,
            FaultKind::AuthorizationDenied => 0x1002,
            FaultKind::ReadError => 0x1003,
        }
    }

    pub fn from_legacy_code(code: u32) -> Option<Self> {
        match code {
            0x1000 => Some(FaultKind::GeneralFailure),
            0x1001 => Some(FaultKind::Unavailable),
            0x1002 => Some(FaultKind::AuthorizationDenied),
            0x1003 => Some(FaultKind::ReadError),
            _ => None,
        }
    }

    /// Whether the core should consider the source unusable until the host
    /// intervenes. The core still never stops or retries on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FaultKind::Unavailable | FaultKind::AuthorizationDenied
        )
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Unavailable => write!(f, "unavailable"),
            FaultKind::AuthorizationDenied => write!(f, "authorization denied"),
            FaultKind::ReadError => write!(f, "read error"),
            FaultKind::GeneralFailure => write!(f, "general failure"),
        }
    }
}

/// A fault reported by a position source.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {description}")]
pub struct SourceFault {
    pub kind: FaultKind,
    pub description: String,
}

impl SourceFault {
    pub fn new(kind: FaultKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    pub fn unavailable(description: impl Into<String>) -> Self {
        Self::new(FaultKind::Unavailable, description)
    }

    pub fn authorization_denied(description: impl Into<String>) -> Self {
        Self::new(FaultKind::AuthorizationDenied, description)
    }

    pub fn read_error(description: impl Into<String>) -> Self {
        Self::new(FaultKind::ReadError, description)
    }

    pub fn general(description: impl Into<String>) -> Self {
        Self::new(FaultKind::GeneralFailure, description)
    }
}

/// Position access authorization as reported by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Granted,
    Denied,
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationStatus::NotDetermined => write!(f, "not determined"),
            AuthorizationStatus::Granted => write!(f, "granted"),
            AuthorizationStatus::Denied => write!(f, "denied"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_codes_roundtrip() {
        for kind in [
            FaultKind::Unavailable,
            FaultKind::AuthorizationDenied,
            FaultKind::ReadError,
            FaultKind::GeneralFailure,
        ] {
            assert_eq!(FaultKind::from_legacy_code(kind.legacy_code()), Some(kind));
        }
        assert_eq!(FaultKind::from_legacy_code(0x2000), None);
    }

    #[test]
    fn test_general_failure_is_base_code() {
        assert_eq!(FaultKind::GeneralFailure.legacy_code(), 0x1000);
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(FaultKind::Unavailable.is_terminal());
        assert!(FaultKind::AuthorizationDenied.is_terminal());
        assert!(!FaultKind::ReadError.is_terminal());
        assert!(!FaultKind::GeneralFailure.is_terminal());
    }

    #[test]
    fn test_fault_display() {
        let fault = SourceFault::authorization_denied("user revoked access");
        assert_eq!(fault.kind, FaultKind::AuthorizationDenied);
        assert_eq!(fault.to_string(), "authorization denied: user revoked access");
    }
}
