//! Common utilities for C# code generation.

use std::collections::HashSet;
use std::sync::LazyLock;

/// C# keywords that need an `@` prefix to be used as identifiers.
pub static CS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
        "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
        "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
        "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
        "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
        "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
        "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
        "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
        "void", "volatile", "while",
    ]
    .into_iter()
    .collect()
});

/// Make `name` a valid C# identifier.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, a leading digit gets a `_`
/// prefix and reserved words get `@`.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() {
        return "_".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if CS_RESERVED_WORDS.contains(out.as_str()) {
        out.insert(0, '@');
    }
    out
}

/// Escape a string for a regular C# string literal (without the quotes).
pub fn escape_cs_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Escape text for an XML doc comment.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render a number as a C# `double` literal.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "double.NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 {
            "double.PositiveInfinity".to_string()
        } else {
            "double.NegativeInfinity".to_string()
        };
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    let text = n.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

/// `/// <summary>` block for a comment, one line per source line.
pub fn doc_comment(comment: &str) -> String {
    let mut out = String::from("/// <summary>\n");
    for line in comment.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.push_str("///\n");
        } else {
            out.push_str(&format!("/// {}\n", escape_xml(line)));
        }
    }
    out.push_str("/// </summary>\n");
    out
}

/// Indent every non-empty line by `levels` steps of four spaces.
pub fn indent(text: &str, levels: usize) -> String {
    let pad = "    ".repeat(levels);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("User"), "User");
        assert_eq!(sanitize_identifier("class"), "@class");
        assert_eq!(sanitize_identifier("2fa"), "_2fa");
        assert_eq!(sanitize_identifier("content-type"), "content_type");
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn test_escape_cs_string() {
        assert_eq!(escape_cs_string(r#"say "hi"\n"#), r#"say \"hi\"\\n"#);
        assert_eq!(escape_cs_string("a\nb"), "a\\nb");
        assert_eq!(escape_cs_string("\u{1}"), "\\u0001");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(1e21), "1000000000000000000000.0");
        assert_eq!(format_number(f64::NAN), "double.NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "double.NegativeInfinity");
    }

    #[test]
    fn test_doc_comment() {
        assert_eq!(
            doc_comment("A <b> & c\n\nsecond"),
            "/// <summary>\n/// A &lt;b&gt; &amp; c\n///\n/// second\n/// </summary>\n"
        );
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\n\n  b", 1), "    a\n\n      b");
    }
}
