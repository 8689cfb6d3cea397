//! Identifier normalization.
//!
//! Turns arbitrary workbook field names into lower-camel identifiers
//! matching `[a-z][A-Za-z0-9]*`, bounded in length, with MD5 suffixes to
//! keep degenerate or over-long inputs unique. The transform is
//! idempotent: normalizing an already-normalized name is a no-op.

use md5::{Digest, Md5};

use super::translit;
use crate::utils::capitalize;

/// Default upper bound for generated identifiers.
pub const DEFAULT_MAX_IDENT: usize = 50;

/// Normalize `input` to a lower-camel identifier of at most `max_length`
/// characters.
///
/// # Examples
///
/// ```
/// use msggen::parser::camel_case;
///
/// assert_eq!(camel_case("CUST_ID", 50), "custId");
/// assert_eq!(camel_case("card-type", 50), "cardType");
/// assert_eq!(camel_case("客户姓名", 50), "keHuXingMing");
/// ```
pub fn camel_case(input: &str, max_length: usize) -> String {
    // Transliterate CJK runs to camelized pinyin syllables.
    let mut text = String::with_capacity(input.len());
    let mut in_translit_run = false;
    for c in input.chars() {
        if translit::is_cjk(c) {
            if let Some(syllable) = translit::lookup(c) {
                if in_translit_run {
                    text.push_str(&capitalize(syllable));
                } else {
                    text.push_str(syllable);
                }
                in_translit_run = true;
                continue;
            }
        }
        text.push(c);
        in_translit_run = false;
    }

    // Keep only identifier-friendly characters plus separators.
    let stripped: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    // Camelize separator-delimited segments. All-uppercase segments are
    // folded to lowercase; mixed-case tails survive so transliterated
    // syllable boundaries are not flattened.
    let mut result = String::with_capacity(stripped.len());
    for (i, segment) in stripped
        .split(['_', '-'])
        .filter(|s| !s.is_empty())
        .enumerate()
    {
        let all_upper = !segment.chars().any(|c| c.is_ascii_lowercase());
        let mut chars = segment.chars();
        let first = chars.next().expect("segment is non-empty");
        let tail: String = if all_upper {
            chars.as_str().to_ascii_lowercase()
        } else {
            chars.as_str().to_string()
        };
        if i == 0 {
            result.push(first.to_ascii_lowercase());
        } else {
            result.push(first.to_ascii_uppercase());
        }
        result.push_str(&tail);
    }

    if result.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        result.insert_str(0, "field");
    }

    if result.is_empty() {
        result = format!("field{}", hash4(input));
    }

    if result.len() > max_length {
        let hash = hash4(&result);
        result.truncate(max_length.saturating_sub(4));
        result.push_str(&hash);
    }

    result
}

/// First 4 hex characters of the MD5 of `input`.
fn hash4(input: &str) -> String {
    let digest = Md5::digest(input.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect::<String>()[..4].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snake_and_kebab() {
        assert_eq!(camel_case("CUST_ID", 50), "custId");
        assert_eq!(camel_case("card_no", 50), "cardNo");
        assert_eq!(camel_case("card-type", 50), "cardType");
        assert_eq!(camel_case("APP_DATE_TIME", 50), "appDateTime");
    }

    #[test]
    fn test_mixed_case_preserved() {
        assert_eq!(camel_case("CbaCardArr", 50), "cbaCardArr");
        assert_eq!(camel_case("createApp", 50), "createApp");
    }

    #[test]
    fn test_cjk_transliteration() {
        assert_eq!(camel_case("客户姓名", 50), "keHuXingMing");
        assert_eq!(camel_case("账号", 50), "zhangHao");
        // ASCII prefix breaks the run; the next syllable starts a new one
        assert_eq!(camel_case("id客户", 50), "idkeHu");
    }

    #[test]
    fn test_unmapped_cjk_is_stripped() {
        // 龘 has no table entry; it is kept in step 1 and stripped in step 2
        assert_eq!(camel_case("龘客户", 50), "keHu");
    }

    #[test]
    fn test_digit_prefix() {
        assert_eq!(camel_case("1ST_FIELD", 50), "field1stField");
    }

    #[test]
    fn test_empty_input_hashes() {
        let name = camel_case("!!!", 50);
        assert!(name.starts_with("field"));
        assert_eq!(name.len(), "field".len() + 4);
        // Stable across calls
        assert_eq!(name, camel_case("!!!", 50));
    }

    #[test]
    fn test_length_bound() {
        let long = "VERY_LONG_FIELD_NAME_THAT_GOES_ON_AND_ON_AND_ON_AND_ON_FOREVER";
        let name = camel_case(long, 50);
        assert_eq!(name.len(), 50);
        // Distinct long names keep distinct hashes
        let other = camel_case(&format!("{}_MORE", long), 50);
        assert_ne!(name, other);
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "CUST_ID",
            "客户姓名",
            "card-type",
            "!!!",
            "1ST_FIELD",
            "VERY_LONG_FIELD_NAME_THAT_GOES_ON_AND_ON_AND_ON_AND_ON_FOREVER",
        ] {
            let once = camel_case(input, 50);
            assert_eq!(camel_case(&once, 50), once, "not idempotent for {:?}", input);
        }
    }
}
