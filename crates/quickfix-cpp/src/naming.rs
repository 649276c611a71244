//! Identifier case conversion.

/// Returns `true` if the underscore at char index `pos` would be dropped by
/// [`to_camel_case`]: it is followed by a letter and is not the `_` of an `m_` member prefix.
pub fn is_convertible_underscore(name: &[char], pos: usize) -> bool {
    name.get(pos) == Some(&'_')
        && name.get(pos + 1).is_some_and(|c| c.is_alphabetic())
        && !(pos == 1 && name[0] == 'm')
}

/// Returns `true` if [`to_camel_case`] would change something worth offering: the name has at
/// least three characters and an inner convertible underscore.
pub fn can_convert_to_camel_case(name: &str) -> bool {
    let chars: Vec<char> = name.chars().collect();
    chars.len() >= 3 && (1..chars.len() - 1).any(|i| is_convertible_underscore(&chars, i))
}

/// `foo_bar` → `fooBar`, `get_URL` → `getUrl`, `m_foo_bar` → `m_fooBar`.
///
/// The first character is kept. After it, upper-case letters become lower case, and each
/// convertible underscore is removed with the following letter upper-cased.
pub fn to_camel_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for (i, &c) in chars.iter().enumerate() {
        if i == 0 {
            out.push(c);
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else if c.is_uppercase() {
            out.extend(c.to_lowercase());
        } else if is_convertible_underscore(&chars, i) {
            upper_next = true;
        } else {
            out.push(c);
        }
    }
    out
}
