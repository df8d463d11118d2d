//! `.properties` file parsing.
//!
//! Follows `java.util.Properties` line rules: `#`/`!` comments, keys ending at the
//! first unescaped `=`, `:` or whitespace, backslash line continuations, and
//! `\t \n \r \f \uXXXX` escapes.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PropertiesError {
    #[error("malformed \\uxxxx escape on line {line}")]
    MalformedUnicode { line: usize },
}

/// Parse properties text into key/value pairs in file order.
///
/// Duplicate keys are all returned; callers inserting into a map get last-wins.
pub fn parse(content: &str) -> Result<Vec<(String, String)>, PropertiesError> {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = normalized.split('\n').enumerate();
    let mut pairs = Vec::new();

    while let Some((idx, raw)) = lines.next() {
        let first = raw.trim_start_matches(is_blank);
        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }

        let mut logical = String::from(first);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let chars: Vec<char> = logical.chars().collect();
        let (key, value) = split_key_value(&chars);
        let line = idx + 1;
        pairs.push((unescape(key, line)?, unescape(value, line)?));
    }

    Ok(pairs)
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\x0c'
}

/// A line continues when it ends in an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(line: &[char]) -> (&[char], &[char]) {
    let mut key_end = line.len();
    let mut has_separator = false;
    let mut escaped = false;

    for (i, &c) in line.iter().enumerate() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' {
            key_end = i;
            has_separator = true;
            break;
        } else if is_blank(c) {
            key_end = i;
            break;
        }
    }

    let mut value_start = if has_separator { key_end + 1 } else { key_end };
    while value_start < line.len() && is_blank(line[value_start]) {
        value_start += 1;
    }
    if !has_separator && value_start < line.len() && matches!(line[value_start], '=' | ':') {
        value_start += 1;
        while value_start < line.len() && is_blank(line[value_start]) {
            value_start += 1;
        }
    }

    (&line[..key_end], &line[value_start.min(line.len())..])
}

fn unescape(chars: &[char], line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(&next) = chars.get(i) else {
            break;
        };
        i += 1;
        match next {
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'f' => out.push('\x0c'),
            'u' => {
                let mut units = vec![hex_unit(chars, i, line)?];
                i += 4;
                // A high surrogate followed by an escaped low surrogate is one char.
                let escape_follows = chars.get(i..i + 2) == Some(&['\\', 'u'][..]);
                if (0xD800..0xDC00).contains(&units[0]) && escape_follows {
                    if let Ok(low) = hex_unit(chars, i + 2, line) {
                        if (0xDC00..0xE000).contains(&low) {
                            units.push(low);
                            i += 6;
                        }
                    }
                }
                out.extend(
                    char::decode_utf16(units).map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER)),
                );
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Four ASCII hex digits starting at `start`, as one UTF-16 code unit.
fn hex_unit(chars: &[char], start: usize, line: usize) -> Result<u16, PropertiesError> {
    let digits = chars
        .get(start..start + 4)
        .ok_or(PropertiesError::MalformedUnicode { line })?;
    digits.iter().try_fold(0u16, |acc, c| {
        c.to_digit(16)
            .map(|d| acc * 16 + d as u16)
            .ok_or(PropertiesError::MalformedUnicode { line })
    })
}
