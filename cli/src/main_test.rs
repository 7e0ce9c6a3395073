use super::*;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

fn identity(roles: &[&str]) -> Identity {
    let claims = json!({ "sub": "a@b.com", "id_persona": 5, "roles": roles, "exp": 1_700_000_000, "iat": 1_699_996_400 });
    token::decode(&format!("h.{}.s", URL_SAFE_NO_PAD.encode(claims.to_string()))).unwrap()
}

#[test]
fn identity_report_lists_claims() {
    let report = identity_report(&identity(&["PROF", "ALUM"]), true);
    assert_eq!(report["email"], "a@b.com");
    assert_eq!(report["person_id"], 5);
    assert_eq!(report["roles"], json!(["ALUM", "PROF"]));
    assert_eq!(report["issued_at"], 1_699_996_400);
    assert_eq!(report["expires_at"], 1_700_000_000);
    assert_eq!(report["expired"], true);
}

#[test]
fn session_report_for_both_states() {
    assert_eq!(session_report(&Session::Unauthenticated), json!({ "authenticated": false }));
    let report = session_report(&Session::Authenticated(identity(&["ADMIN"])));
    assert_eq!(report["authenticated"], true);
    assert_eq!(report["identity"]["roles"], json!(["ADMIN"]));
}

#[test]
fn load_config_flag_overrides_base_url() {
    assert_eq!(load_config(Some("https://api.colegio.edu/")).unwrap().api_base_url, "https://api.colegio.edu");
    assert!(matches!(load_config(Some("ftp://x")), Err(ConfigError::InvalidBaseUrl(_))));
}
