//! Key patterns used by literal and conditional steps

/// Match a key against a shell-style pattern
///
/// `*` matches any run of characters, including none, `?` matches exactly one, and `\` makes the
/// character that follows match itself. Every other character, including `[`, matches itself.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();
    let mut p = 0;
    let mut k = 0;
    let mut star_p = None;
    let mut star_k = 0;

    while k < key.len() {
        if p < pattern.len() {
            if pattern[p] == '*' {
                star_p = Some(p);
                star_k = k;
                p += 1;
                continue;
            }
            if let Some(next) = match_one(&pattern[p..], key[k]) {
                p += next;
                k += 1;
                continue;
            }
        }
        match star_p {
            Some(sp) => {
                p = sp + 1;
                star_k += 1;
                k = star_k;
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Match one character against the head of a pattern, returning the pattern length consumed
fn match_one(pattern: &[char], ch: char) -> Option<usize> {
    match pattern[0] {
        '?' => Some(1),
        '\\' if pattern.len() > 1 => (pattern[1] == ch).then_some(2),
        c => (c == ch).then_some(1),
    }
}
