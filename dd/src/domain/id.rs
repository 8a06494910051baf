//! Session ID generation
//!
//! All IDs use the format: `{6-char-hex}-{type}-{slug}`
//! Example: `019430-session-service-agreement`

/// Generate an ID from type and title
pub fn generate_id(domain_type: &str, title: &str) -> String {
    let uuid = uuid::Uuid::now_v7();
    let hex_prefix = &uuid.to_string()[..6];
    let slug = slugify(title);
    format!("{}-{}-{}", hex_prefix, domain_type, slug)
}

/// Slugify a title for use in IDs
fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        // Strip apostrophes entirely, replace other non-alphanumeric with hyphens
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c == '\'' || c == '\u{2019}' || c == '\u{2018}' {
                None
            } else {
                Some('-')
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_has_hex_type_slug_shape() {
        let id = generate_id("session", "Service Agreement");
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 6);
        assert_eq!(parts[1], "session");
        assert_eq!(parts[2], "service-agreement");
    }

    #[test]
    fn slugify_strips_apostrophes_and_squeezes_hyphens() {
        let id = generate_id("session", "Bob's  NDA!");
        assert!(id.ends_with("-session-bobs-nda"));
    }

    #[test]
    fn ids_are_unique() {
        let a = generate_id("session", "same");
        let b = generate_id("session", "same");
        assert_ne!(a, b);
    }
}
