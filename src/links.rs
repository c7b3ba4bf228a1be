use std::sync::LazyLock;

use regex::Regex;

use crate::error::InputError;

static BASE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://t\.me/(?:c/\d+/(?:\d+/)?|[A-Za-z0-9_]{5,32}/)$")
        .expect("base link regex is valid")
});

// Private chat message, private topic message, or public channel message.
static MESSAGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://t\.me/(?:c/\d+/\d+(?:/\d+)?|[A-Za-z0-9_]{5,32}/\d+)$")
        .expect("message link regex is valid")
});

pub fn check_single_link(raw: &str) -> Result<String, InputError> {
    let link = raw.trim();
    if !(link.starts_with("http://") || link.starts_with("https://")) {
        return Err(InputError::NotHttp);
    }
    if !MESSAGE_LINK.is_match(link) {
        return Err(InputError::BadMessageLink(link.to_string()));
    }
    Ok(link.to_string())
}

/// Base link for a posts range. A missing trailing slash is added before
/// matching, so `https://t.me/c/123` and `https://t.me/c/123/` are the same.
pub fn normalize_base_link(raw: &str) -> Result<String, InputError> {
    let mut link = raw.trim().to_string();
    if !link.ends_with('/') {
        link.push('/');
    }
    if BASE_LINK.is_match(&link) {
        Ok(link)
    } else {
        Err(InputError::BadBaseLink(link))
    }
}

pub fn check_message_link(raw: &str) -> Result<String, InputError> {
    let link = raw.trim();
    if MESSAGE_LINK.is_match(link) {
        Ok(link.to_string())
    } else {
        Err(InputError::BadMessageLink(link.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_link_accepts_all_message_forms() {
        for link in [
            "https://t.me/durov_channel/42",
            "http://t.me/c/12345678/123",
            "https://t.me/c/2267448302/166/4771",
        ] {
            assert_eq!(check_single_link(link).as_deref(), Ok(link), "{link}");
        }
    }

    #[test]
    fn test_single_link_trims_whitespace() {
        assert_eq!(
            check_single_link("  https://t.me/c/1/2 \n").unwrap(),
            "https://t.me/c/1/2"
        );
    }

    #[test]
    fn test_single_link_requires_http_scheme() {
        assert_eq!(check_single_link("t.me/c/1/2"), Err(InputError::NotHttp));
    }

    #[test]
    fn test_single_link_rejects_bad_shapes() {
        for link in [
            "https://t.me/abcd/1",               // username too short
            "https://t.me/c/12345678/",          // no message id
            "https://t.me/c/1/2/3/4",            // too deep
            "https://telegram.me/username/1",    // other host
            "https://t.me/user-name/1",          // dash is not allowed
        ] {
            assert!(
                matches!(check_single_link(link), Err(InputError::BadMessageLink(_))),
                "{link} should be rejected"
            );
        }
    }

    #[test]
    fn test_base_link_appends_trailing_slash() {
        assert_eq!(
            normalize_base_link(" https://t.me/c/12345678 ").unwrap(),
            "https://t.me/c/12345678/"
        );
        assert_eq!(
            normalize_base_link("https://t.me/some_channel").unwrap(),
            "https://t.me/some_channel/"
        );
    }

    #[test]
    fn test_base_link_accepts_topic_base() {
        assert_eq!(
            normalize_base_link("https://t.me/c/2267448302/166/").unwrap(),
            "https://t.me/c/2267448302/166/"
        );
    }

    #[test]
    fn test_base_link_rejects_message_links_and_short_names() {
        assert!(normalize_base_link("https://t.me/c/1/2/3").is_err());
        assert!(normalize_base_link("https://t.me/some_channel/42").is_err());
        assert!(normalize_base_link("https://t.me/abc/").is_err());
        assert_eq!(
            normalize_base_link("ftp://t.me/c/1"),
            Err(InputError::BadBaseLink("ftp://t.me/c/1/".to_string()))
        );
    }

    #[test]
    fn test_message_link_rejects_trailing_slash() {
        assert!(check_message_link("https://t.me/c/12345678/123").is_ok());
        assert!(check_message_link("https://t.me/c/12345678/123/456").is_ok());
        assert!(check_message_link("https://t.me/username/123").is_ok());
        assert!(check_message_link("https://t.me/username/123/").is_err());
        assert!(check_message_link("").is_err());
    }
}
