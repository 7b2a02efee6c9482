/// Split a concert name around an embedded `"`-quoted subtitle.
///
/// `Show A "Subtitle B"` becomes `["Show A", "\"Subtitle B\""]`; a name with no
/// quote stays on one line.
pub fn split_concert_name(name: &str) -> Vec<String> {
    let mut parts = name.splitn(3, '"');
    let head = parts.next().unwrap_or_default().trim();
    match parts.next() {
        Some(subtitle) => {
            let mut lines = Vec::with_capacity(2);
            if !head.is_empty() {
                lines.push(head.to_string());
            }
            lines.push(format!("\"{}\"", subtitle.trim()));
            lines
        }
        None => vec![name.trim().to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_subtitle_goes_to_second_line() {
        assert_eq!(
            split_concert_name("Show A \"Subtitle B\""),
            vec!["Show A".to_string(), "\"Subtitle B\"".to_string()]
        );
    }

    #[test]
    fn test_plain_name_is_one_line() {
        assert_eq!(split_concert_name("Virtual Concert C"), vec!["Virtual Concert C".to_string()]);
    }

    #[test]
    fn test_odd_quoting() {
        assert_eq!(split_concert_name("\"Only Subtitle\""), vec!["\"Only Subtitle\"".to_string()]);
        assert_eq!(
            split_concert_name("Tour \"Unclosed"),
            vec!["Tour".to_string(), "\"Unclosed\"".to_string()]
        );
    }
}
