use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Email + password pair carried in a `Basic` authorization header.
#[derive(Debug, Clone)]
pub struct BasicCredentials {
    pub email: String,
    pub password: String,
}

impl BasicCredentials {
    /// Parses an `Authorization: Basic <base64(email:password)>` value.
    pub fn from_header(header: &str) -> Option<Self> {
        let encoded = header.strip_prefix("Basic ")?;
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (email, password) = decoded.split_once(':')?;

        if email.is_empty() {
            return None;
        }

        Some(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn parses_email_and_password() {
        let creds =
            BasicCredentials::from_header(&encode("owner@example.com:secret"))
                .unwrap();
        assert_eq!(creds.email, "owner@example.com");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn password_may_contain_colons() {
        let creds =
            BasicCredentials::from_header(&encode("owner@example.com:a:b:c"))
                .unwrap();
        assert_eq!(creds.password, "a:b:c");
    }

    #[test]
    fn rejects_non_basic_schemes() {
        assert!(BasicCredentials::from_header("Bearer abc").is_none());
        assert!(BasicCredentials::from_header("Basic not-base64!").is_none());
        assert!(BasicCredentials::from_header(&encode(":pw")).is_none());
    }
}
