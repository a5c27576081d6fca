//! Character classification shared by both strategies. All indices are in
//! `char` units.

/// Whitespace, punctuation and symbols separate words and never take part
/// in a match.
pub fn is_delimiter(c: char) -> bool {
    !c.is_alphanumeric()
}

pub fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Case-folds one char at a time so indices line up with the input.
pub fn folded(chars: &[char]) -> Vec<char> {
    chars.iter().copied().map(fold).collect()
}

/// Whether a new word starts at `idx`: the start of the string, after a
/// delimiter, a lower to upper transition, the last capital of an
/// uppercase run that is followed by a lowercase letter, or a switch
/// between letters and digits.
pub fn is_word_boundary(chars: &[char], idx: usize) -> bool {
    let Some(&current) = chars.get(idx) else {
        return false;
    };
    if is_delimiter(current) {
        return false;
    }
    let Some(&prev) = idx.checked_sub(1).and_then(|i| chars.get(i)) else {
        return true;
    };
    if is_delimiter(prev) {
        return true;
    }
    if prev.is_lowercase() && current.is_uppercase() {
        return true;
    }
    if prev.is_uppercase()
        && current.is_uppercase()
        && chars.get(idx + 1).is_some_and(|next| next.is_lowercase())
    {
        return true;
    }
    (prev.is_numeric() && current.is_alphabetic()) || (prev.is_alphabetic() && current.is_numeric())
}

/// Char offset of `needle` inside `haystack`.
pub fn char_offset(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte_idx| haystack[..byte_idx].chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn boundaries(text: &str) -> Vec<usize> {
        let chars: Vec<char> = text.chars().collect();
        (0..chars.len())
            .filter(|&idx| is_word_boundary(&chars, idx))
            .collect()
    }

    #[test]
    fn camel_case_boundaries() {
        assert_eq!(boundaries("GetObject"), vec![0, 3]);
        assert_eq!(boundaries("getHTTPResponse"), vec![0, 3, 7]);
    }

    #[test]
    fn digit_and_delimiter_boundaries() {
        assert_eq!(boundaries("Int32"), vec![0, 3]);
        assert_eq!(boundaries("to_string"), vec![0, 3]);
        assert_eq!(boundaries("System.Text"), vec![0, 7]);
    }

    #[test]
    fn offsets_are_in_chars() {
        assert_eq!(char_offset("new Élan()", "Élan"), Some(4));
        assert_eq!(char_offset("Élan.Foo", "Foo"), Some(5));
        assert_eq!(char_offset("Foo", "Bar"), None);
    }
}
