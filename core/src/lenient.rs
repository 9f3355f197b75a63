//! Tolerant pre-pass for hand-edited scenario files.
//!
//! Scenario files are pasted from notes and presets, so they carry comments,
//! trailing commas and stray text around the object. This pass only rewrites
//! the text; the strict typed parse happens afterwards in the codec.
//!
//! Outside string literals it:
//!   - drops `/* ... */` comments,
//!   - drops whole-line `//` and `#` comments,
//!   - keeps only the text between the first `{` and the last `}`,
//!   - drops a comma that directly precedes `}` or `]`.

/// Rewrite loose JSON text into text `serde_json` can parse.
pub fn relax(text: &str) -> String {
    let stripped = strip_comments(text);
    let sliced = match (stripped.find('{'), stripped.rfind('}')) {
        (Some(first), Some(last)) if last > first => &stripped[first..=last],
        _ => stripped.as_str(),
    };
    let relaxed = strip_trailing_commas(sliced);
    if relaxed.trim().is_empty() {
        "{}".to_string()
    } else {
        relaxed
    }
}

/// `relax` followed by a parse into any deserialisable type.
pub fn parse_lenient<T: serde::de::DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    serde_json::from_str(&relax(text))
}

fn strip_comments(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut line_start = true;
    let mut i = 0;

    while let Some(&c) = chars.get(i) {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        let next = chars.get(i + 1).copied();
        if c == '/' && next == Some('*') {
            i += 2;
            while let Some(&d) = chars.get(i) {
                if d == '*' && chars.get(i + 1) == Some(&'/') {
                    i += 2;
                    break;
                }
                i += 1;
            }
            continue;
        }
        if line_start && (c == '#' || (c == '/' && next == Some('/'))) {
            while let Some(&d) = chars.get(i) {
                if d == '\n' {
                    break;
                }
                i += 1;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                line_start = false;
            }
            '\n' => line_start = true,
            c if c.is_whitespace() => {}
            _ => line_start = false,
        }
        out.push(c);
        i += 1;
    }
    out
}

fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }
        if c == '"' {
            in_string = true;
        }
        if c == ',' {
            let closes = chars
                .iter()
                .skip(i + 1)
                .find(|d| !d.is_whitespace())
                .is_some_and(|d| *d == '}' || *d == ']');
            if closes {
                continue;
            }
        }
        out.push(c);
    }
    out
}
