use serde::{Deserialize, Serialize};

/// Success body for signup/unregister: a human-readable confirmation from
/// the service, surfaced verbatim in the status banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfirmation {
    pub message: String,
}

/// Failure body sent with a non-success status when the service declines a
/// mutation. `detail` is absent on some server errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationRejection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_detail_defaults_to_none() {
        let rejection: MutationRejection = serde_json::from_str("{}").expect("body");
        assert!(rejection.detail.is_none());
    }

    #[test]
    fn rejection_detail_round_trips() {
        let rejection: MutationRejection =
            serde_json::from_str(r#"{"detail": "Activity is full"}"#).expect("body");
        assert_eq!(rejection.detail.as_deref(), Some("Activity is full"));
    }
}
