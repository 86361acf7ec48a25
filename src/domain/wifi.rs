use serde::Serialize;
use utoipa::ToSchema;

/// Outcome of the office-network presence check for an attendance action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NetworkVerification {
    /// The user is not subject to WiFi verification.
    NotRequired,
    /// Location permission was not granted on the device; the check could
    /// not be evaluated and a required verification fails.
    PermissionDenied,
    /// Connected to one of the organization's active office networks.
    OfficeNetwork,
    /// Connected, but not to a registered office network.
    UnknownNetwork,
    /// No WiFi connection reported.
    NotConnected,
}

impl NetworkVerification {
    pub fn verified(self) -> bool {
        matches!(
            self,
            NetworkVerification::NotRequired | NetworkVerification::OfficeNetwork
        )
    }
}

/// Short-circuiting decision table, evaluated in order:
/// not required -> permission -> SSID membership. Intentionally asymmetric:
/// an unevaluable check passes when verification is not required and fails
/// when it is. No retry on any branch.
pub fn verify_presence(
    required: bool,
    permission_granted: bool,
    current_ssid: Option<&str>,
    office_ssids: &[String],
) -> NetworkVerification {
    if !required {
        return NetworkVerification::NotRequired;
    }
    if !permission_granted {
        return NetworkVerification::PermissionDenied;
    }
    match current_ssid {
        None => NetworkVerification::NotConnected,
        Some(ssid) => {
            if office_ssids.iter().any(|s| s == ssid) {
                NetworkVerification::OfficeNetwork
            } else {
                NetworkVerification::UnknownNetwork
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office() -> Vec<String> {
        vec!["HQ-Floor1".to_string(), "HQ-Floor2".to_string()]
    }

    #[test]
    fn not_required_passes_without_further_checks() {
        let outcome = verify_presence(false, false, None, &[]);
        assert_eq!(outcome, NetworkVerification::NotRequired);
        assert!(outcome.verified());
    }

    #[test]
    fn missing_permission_fails_when_required() {
        let outcome = verify_presence(true, false, Some("HQ-Floor1"), &office());
        assert_eq!(outcome, NetworkVerification::PermissionDenied);
        assert!(!outcome.verified());
    }

    #[test]
    fn office_network_verifies() {
        let outcome = verify_presence(true, true, Some("HQ-Floor2"), &office());
        assert_eq!(outcome, NetworkVerification::OfficeNetwork);
        assert!(outcome.verified());
    }

    #[test]
    fn unknown_network_fails() {
        let outcome = verify_presence(true, true, Some("CoffeeShop"), &office());
        assert_eq!(outcome, NetworkVerification::UnknownNetwork);
        assert!(!outcome.verified());
    }

    #[test]
    fn not_connected_fails() {
        let outcome = verify_presence(true, true, None, &office());
        assert_eq!(outcome, NetworkVerification::NotConnected);
        assert!(!outcome.verified());
    }

    #[test]
    fn empty_office_list_never_verifies_when_required() {
        let outcome = verify_presence(true, true, Some("HQ-Floor1"), &[]);
        assert_eq!(outcome, NetworkVerification::UnknownNetwork);
    }
}
