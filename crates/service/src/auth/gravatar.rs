use sha2::{Digest, Sha256};

/// Gravatar URL for an email: 200px, PG-rated, identicon fallback.
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let hash = hex::encode(Sha256::digest(normalized.as_bytes()));
    format!("https://www.gravatar.com/avatar/{hash}?s=200&r=pg&d=identicon")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(gravatar_url(" User@Example.com "), gravatar_url("user@example.com"));
    }

    #[test]
    fn url_shape() {
        let url = gravatar_url("user@example.com");
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        assert!(url.ends_with("?s=200&r=pg&d=identicon"));
        let hash = url.trim_start_matches("https://www.gravatar.com/avatar/").split('?').next().unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
