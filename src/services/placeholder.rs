use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};

// %1..%99, optionally localized (%L1)
fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%L?([0-9]{1,2})").expect("placeholder regex is valid"))
}

/// Distinct marker numbers in `text`, ascending. `%0` is not a marker.
pub fn markers(text: &str) -> BTreeSet<u8> {
    marker_re()
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u8>().ok())
        .filter(|&n| n > 0)
        .collect()
}

pub fn count(text: &str) -> usize {
    markers(text).len()
}

/// Replaces `%N` with `args[N - 1]` in one pass. Inserted text is not
/// rescanned and markers without an argument stay as they are.
pub fn substitute(text: &str, args: &[&str]) -> String {
    if args.is_empty() {
        return text.to_string();
    }

    marker_re()
        .replace_all(text, |caps: &Captures| {
            let arg = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| args.get(i));

            match arg {
                Some(a) => a.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_distinct_markers() {
        assert_eq!(count("Capacity %1, %2 hr %3 min remaining"), 3);
        assert_eq!(count("%1 and %1 again"), 1);
        assert_eq!(count("no markers, 100% sure"), 0);
        assert_eq!(count("%0 is not one"), 0);
        assert_eq!(markers("%L2 of %1").into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn substitutes_positionally() {
        assert_eq!(substitute("Akku %1, %2 min jäljellä", &["40%", "25"]), "Akku 40%, 25 min jäljellä");
        assert_eq!(substitute("%2 before %1", &["a", "b"]), "b before a");
        assert_eq!(substitute("%L1 files", &["1,024"]), "1,024 files");
    }

    #[test]
    fn missing_args_leave_markers() {
        assert_eq!(substitute("Lataa %1, %2 min täyteen", &["50%"]), "Lataa 50%, %2 min täyteen");
        assert_eq!(substitute("%0 stays", &["x"]), "%0 stays");
    }

    #[test]
    fn replacement_is_not_rescanned() {
        assert_eq!(substitute("%1 %2", &["%2", "b"]), "%2 b");
    }

    #[test]
    fn two_digit_markers() {
        let args: Vec<String> = (1..=10).map(|n| format!("a{n}")).collect();
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        assert_eq!(substitute("%10/%1", &refs), "a10/a1");
    }
}
