//! Container directive syntax.
//!
//! Parses whole-line container markers:
//!
//! ```text
//! :::name Title text
//! :::name[Title]{#id .class key="value"}
//! :::
//! ```

use std::collections::BTreeMap;

use crate::TransformError;

/// Parsed container marker from a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ContainerLine {
    /// Container opening: `:::name[title]{attrs}` or `:::name title`.
    Open {
        name: String,
        title: Option<String>,
        args: DirectiveArgs,
    },
    /// Container closing: `:::`.
    Close,
}

/// Parsed attributes from directive syntax.
///
/// Represents the attributes extracted from a `{#id .class key="value"}`
/// block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct DirectiveArgs {
    /// ID from attributes: `{#id}`.
    pub(crate) id: Option<String>,
    /// Classes from attributes: `{.class1 .class2}`.
    pub(crate) classes: Vec<String>,
    /// Key-value attributes: `{key="value"}`.
    pub(crate) attrs: BTreeMap<String, String>,
}

impl DirectiveArgs {
    /// Parse an attributes string (without braces).
    pub(crate) fn parse(attrs_str: &str) -> Self {
        let mut args = Self::default();
        let mut remaining = attrs_str.trim();

        while !remaining.is_empty() {
            if let Some(rest) = remaining.strip_prefix('#') {
                let end = token_end(rest);
                args.id = Some(rest[..end].to_owned());
                remaining = &rest[end..];
            } else if let Some(rest) = remaining.strip_prefix('.') {
                let end = token_end(rest);
                args.classes.push(rest[..end].to_owned());
                remaining = &rest[end..];
            } else if let Some((key, value, rest)) = parse_key_value(remaining) {
                args.attrs.insert(key.to_owned(), value.to_owned());
                remaining = rest;
            } else {
                // Skip unrecognized character
                let skip = remaining.chars().next().map_or(1, char::len_utf8);
                remaining = &remaining[skip..];
            }
            remaining = remaining.trim_start();
        }

        args
    }

    /// Flatten into component attributes: `id`, `class`, then key-values.
    pub(crate) fn into_attributes(self) -> BTreeMap<String, serde_json::Value> {
        let mut out: BTreeMap<String, serde_json::Value> = self
            .attrs
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        if let Some(id) = self.id {
            out.insert("id".to_owned(), id.into());
        }
        if !self.classes.is_empty() {
            out.insert("class".to_owned(), self.classes.join(" ").into());
        }
        out
    }
}

/// End of an `#id` or `.class` token.
fn token_end(s: &str) -> usize {
    s.find(|c: char| c.is_whitespace() || c == '.' || c == '#')
        .unwrap_or(s.len())
}

/// Parse a key-value pair from the attributes string.
///
/// Supports: `key="value"`, `key='value'`, `key=value`
fn parse_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let eq_pos = s.find('=')?;
    let key = s[..eq_pos].trim();

    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }

    let after_eq = &s[eq_pos + 1..];

    for quote in ['"', '\''] {
        if let Some(stripped) = after_eq.strip_prefix(quote) {
            let end_quote = stripped.find(quote)?;
            return Some((key, &stripped[..end_quote], &stripped[end_quote + 1..]));
        }
    }

    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
    Some((key, &after_eq[..end], &after_eq[end..]))
}

/// Check if a name is a valid directive name.
///
/// Valid names contain only alphanumeric characters, hyphens, and underscores.
fn is_valid_directive_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Extract a balanced `open`...`close` group at the start of `s`.
///
/// Returns the inner text and bytes consumed; `Ok(None)` if `s` does not
/// start with `open`, an error if the group never closes.
fn take_group(
    s: &str,
    open: char,
    close: char,
    line: usize,
) -> Result<Option<(&str, usize)>, TransformError> {
    if !s.starts_with(open) {
        return Ok(None);
    }

    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Ok(Some((&s[1..i], i + 1)));
            }
        }
    }

    Err(TransformError::Unbalanced {
        line,
        delimiter: open,
    })
}

/// Parse a whole line for a container marker.
///
/// Returns `Ok(None)` if the line is not a container marker, and an error if
/// the marker's title or attribute group is unbalanced. `line` is the
/// 1-based line number used in diagnostics.
pub(crate) fn parse_container_line(
    text: &str,
    line: usize,
) -> Result<Option<ContainerLine>, TransformError> {
    let trimmed = text.trim();

    if !trimmed.starts_with(":::") {
        return Ok(None);
    }

    let colon_count = trimmed.chars().take_while(|&c| c == ':').count();
    let after_colons = trimmed[colon_count..].trim_start();

    if after_colons.is_empty() {
        return Ok(Some(ContainerLine::Close));
    }

    let name_end = after_colons
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(after_colons.len());

    let name = &after_colons[..name_end];
    if !is_valid_directive_name(name) {
        return Ok(None);
    }

    let mut rest = &after_colons[name_end..];

    let bracket_title = match take_group(rest, '[', ']', line)? {
        Some((content, consumed)) => {
            rest = &rest[consumed..];
            Some(content.trim().to_owned())
        }
        None => None,
    };

    let args = match take_group(rest, '{', '}', line)? {
        Some((attrs, consumed)) => {
            rest = &rest[consumed..];
            DirectiveArgs::parse(attrs)
        }
        None => DirectiveArgs::default(),
    };

    let trailing = rest.trim();
    let title = bracket_title
        .filter(|t| !t.is_empty())
        .or_else(|| (!trailing.is_empty()).then(|| trailing.to_owned()));

    Ok(Some(ContainerLine::Open {
        name: name.to_owned(),
        title,
        args,
    }))
}
