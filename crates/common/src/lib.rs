//! Shared building blocks for the HMS crates: response envelope types and
//! logging initialisation.

pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn success_envelope_omits_error() {
        let body = serde_json::to_value(types::ApiResponse::success(types::Health { status: "ok" })).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
        assert!(body.get("error").is_none());
    }

    #[test]
    fn failure_envelope_omits_data() {
        let body = serde_json::to_value(types::ApiResponse::<()>::failure(404, "patient not found")).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], 404);
        assert_eq!(body["error"]["message"], "patient not found");
        assert!(body.get("data").is_none());
    }
}
