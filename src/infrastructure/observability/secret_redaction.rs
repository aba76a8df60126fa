const SECRET_KEYS: [&str; 5] = ["token=", "key=", "sig=", "api_key=", "password="];

/// Masks the values of credential-bearing query parameters before a URL is logged.
pub fn redact_secrets(text: &str) -> String {
    let mut result = text.to_string();
    for pattern in SECRET_KEYS {
        let mut search_from = 0;
        while let Some(found) = result[search_from..].find(pattern) {
            let start = search_from + found + pattern.len();
            let end = result[start..]
                .find(|c: char| c.is_whitespace() || c == '&' || c == '"' || c == '\'')
                .map(|i| start + i)
                .unwrap_or(result.len());
            result.replace_range(start..end, "***");
            search_from = start + 3;
        }
    }
    result
}

