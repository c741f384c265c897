//! User agent and default headers

/// User agent sent with every request, with an optional caller suffix
pub fn sdk_user_agent(suffix: Option<&str>) -> String {
    let base = format!("clarifai-search-rs/{}", crate::VERSION);
    match suffix {
        Some(s) if !s.trim().is_empty() => format!("{} {}", base, s.trim()),
        _ => base,
    }
}

/// Standard accept header for JSON requests
pub fn accept_json() -> &'static str {
    "application/json"
}

/// Authorization header value for a personal access token
pub fn authorization(pat: &str) -> String {
    format!("Key {}", pat)
}
