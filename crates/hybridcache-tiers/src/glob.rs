//! Shared `*`/`?` glob matching used by every tier's `keys(pattern)`.

/// Matches `*` (any run, including empty) and `?` (exactly one character)
/// wildcards against `key`. No other metacharacters are special.
pub(crate) fn glob_match(pattern: &str, key: &str) -> bool {
    fn helper(pattern: &[char], key: &[char]) -> bool {
        match pattern.split_first() {
            None => key.is_empty(),
            Some(('*', rest)) => helper(rest, key) || (!key.is_empty() && helper(pattern, &key[1..])),
            Some(('?', rest)) => !key.is_empty() && helper(rest, &key[1..]),
            Some((c, rest)) => key.first() == Some(c) && helper(rest, &key[1..]),
        }
    }
    let p: Vec<char> = pattern.chars().collect();
    let k: Vec<char> = key.chars().collect();
    helper(&p, &k)
}
