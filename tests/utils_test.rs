use sporelay::utils::{generate_state_token, request_origin};

#[test]
fn test_generate_state_token() {
    let token = generate_state_token();

    // Should be exactly 32 characters, comfortably above the 16-char floor
    assert_eq!(token.len(), 32);

    // Should contain only alphanumeric characters
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated tokens should be different
    let token2 = generate_state_token();
    assert_ne!(token, token2);
}

#[test]
fn test_request_origin_loopback_defaults_to_http() {
    assert_eq!(
        request_origin(Some("localhost:8080"), None),
        Some("http://localhost:8080".to_string())
    );
    assert_eq!(
        request_origin(Some("127.0.0.1:8080"), None),
        Some("http://127.0.0.1:8080".to_string())
    );
}

#[test]
fn test_request_origin_public_host_defaults_to_https() {
    assert_eq!(
        request_origin(Some("relay.example.com"), None),
        Some("https://relay.example.com".to_string())
    );
}

#[test]
fn test_request_origin_forwarded_proto_wins() {
    // A proxy in front terminates TLS; its header overrides the default
    assert_eq!(
        request_origin(Some("localhost:8080"), Some("https")),
        Some("https://localhost:8080".to_string())
    );

    // Empty header values are ignored
    assert_eq!(
        request_origin(Some("relay.example.com"), Some("")),
        Some("https://relay.example.com".to_string())
    );
}

#[test]
fn test_request_origin_requires_host() {
    assert_eq!(request_origin(None, Some("https")), None);
}
