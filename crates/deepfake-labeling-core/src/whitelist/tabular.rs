//! Minimal CSV reading for whitelist import.
//!
//! Only the first column is needed. Quoted fields follow RFC 4180: commas and
//! line breaks inside quotes are data, `""` is an escaped quote.

/// First field of every non-empty record, in file order (header included).
pub fn first_column(text: &str) -> Vec<String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut first = String::new();
    let mut column = 0usize;
    let mut in_quotes = false;
    let mut has_content = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    if column == 0 {
                        first.push('"');
                    }
                }
                '"' => in_quotes = false,
                other => {
                    if column == 0 {
                        first.push(other);
                    }
                }
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                has_content = true;
            }
            ',' => {
                column += 1;
                has_content = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                if has_content {
                    records.push(std::mem::take(&mut first));
                }
                first.clear();
                column = 0;
                has_content = false;
            }
            other => {
                if column == 0 {
                    first.push(other);
                }
                has_content = true;
            }
        }
    }

    if has_content {
        records.push(first);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_rows() {
        let text = "doctor_id,name\nDOC1,Alice\nDOC2,Bob\n";
        assert_eq!(first_column(text), vec!["doctor_id", "DOC1", "DOC2"]);
    }

    #[test]
    fn test_quoted_first_field() {
        let text = "id,name\n\"DOC,1\",x\n\"DOC \"\"2\"\"\",y\n";
        assert_eq!(first_column(text), vec!["id", "DOC,1", "DOC \"2\""]);
    }

    #[test]
    fn test_crlf_blank_lines_and_no_trailing_newline() {
        let text = "id\r\n\r\nDOC1\r\n\nDOC2";
        assert_eq!(first_column(text), vec!["id", "DOC1", "DOC2"]);
    }

    #[test]
    fn test_newline_inside_later_quoted_field() {
        let text = "id,note\nDOC1,\"line one\nline two\"\nDOC2,ok\n";
        assert_eq!(first_column(text), vec!["id", "DOC1", "DOC2"]);
    }

    #[test]
    fn test_empty_first_column_and_bom() {
        let text = "\u{feff}id,x\n,orphan\nDOC3,z\n";
        assert_eq!(first_column(text), vec!["id", "", "DOC3"]);
    }
}
