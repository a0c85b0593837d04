//! Case conversion for include method names, directive keys and prop keys.

/// Convert `snake_case` or `kebab-case` text to `StudlyCase`.
///
/// ```rust
/// use smokescreen_schema::case::studly_case;
///
/// assert_eq!(studly_case("owner_profile"), "OwnerProfile");
/// ```
pub fn studly_case(input: &str) -> String {
    input
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect()
}

/// Convert text to `snake_case`.
///
/// Input that is already entirely lowercase ASCII is returned unchanged.
/// Otherwise whitespace is removed, an underscore is placed before every
/// uppercase letter, and runs of non-word characters collapse to one
/// underscore.
pub fn snake_case(input: &str) -> String {
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_lowercase()) {
        return input.to_string();
    }

    let compact: String = input
        .split_whitespace()
        .map(capitalize)
        .collect::<String>();

    let mut split = String::with_capacity(compact.len() + 4);
    for (idx, c) in compact.chars().enumerate() {
        if idx > 0 && c.is_uppercase() {
            split.push('_');
        }
        split.push(c);
    }

    let mut out = String::with_capacity(split.len());
    let mut in_separator = false;
    for c in split.chars() {
        if c.is_alphanumeric() || c == '_' {
            in_separator = false;
            out.extend(c.to_lowercase());
        } else if !in_separator {
            in_separator = true;
            out.push('_');
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
