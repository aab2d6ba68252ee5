//! URL slugs for recipe detail routes.

/// Turn a title into a lowercase, dash-separated slug.
///
/// Alphanumerics are kept (lowercased), every other run of characters
/// becomes a single `-`, and leading/trailing dashes are dropped.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
