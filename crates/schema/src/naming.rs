//! Attribute naming rules

/// Translate a Kubernetes JSON field name into an attribute name.
///
/// Runs of capitals are kept together as one word (`bootMACAddress` becomes
/// `boot_mac_address`), a trailing plural `s` stays with its acronym
/// (`podIPs` becomes `pod_ips`), a versioned acronym stays whole
/// (`IPv6Address` becomes `ipv6_address`), and any character outside
/// `[a-z0-9_]` is replaced by an underscore.
///
/// A capital run followed by lowercase letters is read as an acronym plus
/// the next word, so `DNSsec` becomes `dn_ssec`.
pub fn snake_case(json_name: &str) -> String {
    let chars: Vec<char> = json_name.chars().collect();
    let mut out = String::with_capacity(json_name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1).copied();
            let after_next = chars.get(i + 2).copied();

            let boundary = match prev {
                None => false,
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => match next {
                    Some('s') => after_next.is_some_and(|a| a.is_ascii_lowercase()),
                    Some(n) if n.is_ascii_lowercase() => !ends_in_digit(&chars[i + 1..]),
                    _ => false,
                },
                _ => false,
            };

            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }

    while out.ends_with('_') && out.len() > 1 {
        out.pop();
    }

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }

    out
}

/// Whether the lowercase run at the start of `chars` is followed by a digit
fn ends_in_digit(chars: &[char]) -> bool {
    chars
        .iter()
        .find(|c| !c.is_ascii_lowercase())
        .is_some_and(|c| c.is_ascii_digit())
}

/// Check that a name is usable as an attribute name: lowercase ASCII letters,
/// digits and underscores, not starting with a digit.
pub fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
