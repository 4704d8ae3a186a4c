use rand::{Rng, distr::Alphanumeric};

/// Length of generated CSRF state tokens. Well above the 16-character floor
/// required for the state parameter.
const STATE_TOKEN_LEN: usize = 32;

pub fn generate_state_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Reconstructs the origin the caller used to reach this server, so the
/// redirect URI sent to the authorization server points back at the same
/// deployment. Honors `x-forwarded-proto` when running behind a proxy;
/// otherwise loopback hosts are assumed to be plain http.
pub fn request_origin(host: Option<&str>, forwarded_proto: Option<&str>) -> Option<String> {
    let host = host?;
    let scheme = match forwarded_proto {
        Some(proto) if !proto.is_empty() => proto,
        _ => {
            if host.starts_with("localhost") || host.starts_with("127.") {
                "http"
            } else {
                "https"
            }
        }
    };
    Some(format!("{}://{}", scheme, host))
}
