//! Identifier casing transformer.
//!
//! Names go through three stages:
//! 1. `normalize`: lower-case with `_` word boundaries
//! 2. `parse`: split into word tokens, keeping generic argument lists and
//!    array rank suffixes attached to their word
//! 3. `render`: join the tokens back in the requested convention
//!
//! `format_for_enum` is a separate pass over an already-rendered identifier
//! that strips characters which are not valid in an enum member name.

use serde::{Deserialize, Serialize};

/// Characters after which an uppercase letter does not start a new word.
const BOUNDARY_IGNORE: [char; 8] = ['<', ' ', ',', '-', '_', '.', ':', '/'];

/// Type names rendered verbatim when they stand alone in declaration position.
const PRIMITIVE_NAMES: [&str; 22] = [
    "string",
    "number",
    "boolean",
    "object",
    "any",
    "unknown",
    "null",
    "undefined",
    "void",
    "never",
    "bigint",
    "symbol",
    "int",
    "long",
    "short",
    "byte",
    "double",
    "float",
    "decimal",
    "bool",
    "char",
    "dynamic",
];

/// Target casing convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    /// `SomeName`
    #[default]
    Pascal,
    /// `someName`
    Camel,
    /// `some_name`
    Snake,
    /// `some-name`
    Kebab,
}

/// Where a rendered identifier will appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePosition {
    /// Type position: a lone primitive keyword is left untouched.
    Declaration,
    /// Member position: properties, enum members, constants.
    Member,
}

/// One word of a parsed identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordToken {
    /// Word text, generic arguments removed.
    pub base: String,
    /// Trailing rank suffix such as `[]` or `[,]`.
    pub array_part: Option<String>,
    /// Generic argument groups, each a parsed word list.
    pub type_arguments: Vec<Vec<WordToken>>,
}

impl WordToken {
    /// Plain word.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            ..Self::default()
        }
    }

    /// Attach a rank suffix.
    pub fn with_array_part(mut self, array_part: impl Into<String>) -> Self {
        self.array_part = Some(array_part.into());
        self
    }

    /// Attach generic argument groups.
    pub fn with_type_arguments(mut self, type_arguments: Vec<Vec<WordToken>>) -> Self {
        self.type_arguments = type_arguments;
        self
    }
}

// =============================================================================
// Normalize
// =============================================================================

/// Lower-case `raw`, marking word boundaries with `_`.
///
/// An uppercase letter starts a new word unless it is the first character or
/// follows one of `< , - _ . : /` or a space. Afterwards `-`, `:` and `/` are
/// folded into `_`.
pub fn normalize(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len() + 4);
    let mut previous: Option<char> = None;

    for c in raw.chars() {
        if c.is_uppercase() {
            if let Some(prev) = previous {
                if !BOUNDARY_IGNORE.contains(&prev) {
                    result.push('_');
                }
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
        previous = Some(c);
    }

    result.replace(['-', ':', '/'], "_")
}

// =============================================================================
// Parse
// =============================================================================

/// Split a normalized identifier into word tokens.
///
/// Splitting happens on `_` outside of angle brackets only, so
/// `map<key_type,value>` stays a single word with two argument groups.
pub fn parse(normalized: &str) -> Vec<WordToken> {
    split_top_level(normalized, '_')
        .into_iter()
        .filter(|word| !word.is_empty())
        .map(parse_word)
        .collect()
}

/// Split on `separator` while tracking `<`/`>` nesting.
fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_word(word: &str) -> WordToken {
    let (head, array_part) = split_array_part(word);

    let Some(open) = head.find('<') else {
        return WordToken {
            base: head.to_string(),
            array_part,
            type_arguments: Vec::new(),
        };
    };

    let Some(close) = matching_close(head, open) else {
        // Unbalanced brackets: keep the text as an opaque base.
        return WordToken {
            base: head.to_string(),
            array_part,
            type_arguments: Vec::new(),
        };
    };

    let inner = &head[open + 1..close];
    let type_arguments = split_top_level(inner, ',')
        .into_iter()
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .map(parse)
        .collect();

    // Anything after the closing bracket that is not an array suffix stays on
    // the base so no text is lost.
    let mut base = head[..open].to_string();
    base.push_str(&head[close + 1..]);

    WordToken {
        base,
        array_part,
        type_arguments,
    }
}

/// Peel trailing bracket groups (`[]`, `[,]`, `[][]`) off a word.
fn split_array_part(word: &str) -> (&str, Option<String>) {
    let bytes = word.as_bytes();
    let mut cut = word.len();

    loop {
        if cut == 0 || bytes[cut - 1] != b']' {
            break;
        }
        let Some(open) = word[..cut].rfind('[') else {
            break;
        };
        let group = &word[open + 1..cut - 1];
        if !group.chars().all(|c| c == ',' || c.is_whitespace()) {
            break;
        }
        cut = open;
    }

    if cut == word.len() || cut == 0 {
        (word, None)
    } else {
        (&word[..cut], Some(word[cut..].to_string()))
    }
}

fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

// =============================================================================
// Render
// =============================================================================

/// Join word tokens in the given convention.
pub fn render(tokens: &[WordToken], casing: Casing, position: NamePosition) -> String {
    let sole = tokens.len() == 1;

    let words: Vec<String> = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            let keep = sole
                && position == NamePosition::Declaration
                && is_primitive_name(&token.base);
            let capitalize = !keep
                && match casing {
                    Casing::Pascal => true,
                    Casing::Camel => i > 0,
                    Casing::Snake | Casing::Kebab => false,
                };
            render_word(token, casing, capitalize)
        })
        .collect();

    let separator = match casing {
        Casing::Pascal | Casing::Camel => "",
        Casing::Snake => "_",
        Casing::Kebab => "-",
    };
    words.join(separator)
}

fn render_word(token: &WordToken, casing: Casing, capitalize: bool) -> String {
    let mut out = if capitalize {
        capitalize_segments(&token.base)
    } else {
        token.base.clone()
    };

    if !token.type_arguments.is_empty() {
        let args: Vec<String> = token
            .type_arguments
            .iter()
            .map(|arg| render(arg, casing, NamePosition::Declaration))
            .collect();
        out.push('<');
        out.push_str(&args.join(", "));
        out.push('>');
    }

    if let Some(array_part) = &token.array_part {
        out.push_str(array_part);
    }
    out
}

/// Capitalize the first letter of every `.`-separated segment.
fn capitalize_segments(base: &str) -> String {
    base.split('.')
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(".")
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

fn is_primitive_name(base: &str) -> bool {
    PRIMITIVE_NAMES.contains(&base)
}

/// Full pipeline: normalize, parse, render.
pub fn convert(raw: &str, casing: Casing, position: NamePosition) -> String {
    render(&parse(&normalize(raw)), casing, position)
}

/// Shorthand for a Pascal-cased member-position name.
pub fn to_pascal_case(raw: &str) -> String {
    convert(raw, Casing::Pascal, NamePosition::Member)
}

// =============================================================================
// Enum member formatting
// =============================================================================

/// Reduce an already-rendered identifier to alphanumeric runs.
///
/// Each alphanumeric run that follows a dropped non-alphanumeric run is joined
/// with the convention's separator (snake, kebab) or gets its first letter
/// capitalized (Pascal, camel). Nothing is inserted before the first run.
pub fn format_for_enum(rendered: &str, casing: Casing) -> String {
    let mut out = String::with_capacity(rendered.len());
    let mut run = String::new();

    for c in rendered.chars() {
        if c.is_alphanumeric() {
            run.push(c);
        } else {
            push_enum_run(&mut out, &run, casing);
            run.clear();
        }
    }
    push_enum_run(&mut out, &run, casing);
    out
}

/// Append one alphanumeric run. Every run except the first was preceded by a
/// dropped character, so it gets a boundary marker once `out` is non-empty.
fn push_enum_run(out: &mut String, run: &str, casing: Casing) {
    if run.is_empty() {
        return;
    }
    if out.is_empty() {
        out.push_str(run);
        return;
    }
    match casing {
        Casing::Snake => {
            out.push('_');
            out.push_str(run);
        }
        Casing::Kebab => {
            out.push('-');
            out.push_str(run);
        }
        Casing::Pascal | Casing::Camel => out.push_str(&capitalize_first(run)),
    }
}
