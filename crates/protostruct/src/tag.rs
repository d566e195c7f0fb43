// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct tag lookup.
//!
//! Tags are opaque to the schema; this module reads the conventional
//! `key:"value" key2:"value2"` layout for consumers such as the JSON
//! populator. Malformed tags simply yield no value.

/// Borrowed view of a raw tag string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructTag<'a>(&'a str);

impl<'a> StructTag<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// Value associated with `key`, unquoted.
    ///
    /// Returns `None` if the key is absent or the tag is malformed before
    /// the key is reached. An explicitly empty value yields `Some("")`.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let mut rest = self.0;

        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                return None;
            }

            // Key: run of non-control, non-space, non-quote, non-colon chars.
            let name_len = rest
                .find(|c: char| c <= ' ' || c == ':' || c == '"' || c == '\x7f')
                .unwrap_or(rest.len());
            if name_len == 0 || !rest[name_len..].starts_with(":\"") {
                return None;
            }
            let name = &rest[..name_len];
            rest = &rest[name_len + 1..];

            let (quoted, tail) = split_quoted(rest)?;
            rest = tail;

            if name == key {
                return unquote(quoted);
            }
        }
    }
}

/// Split a leading `"..."` (escapes honored) from `s`.
fn split_quoted(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some((&s[..=i], &s[i + 1..])),
            _ => i += 1,
        }
    }
    None
}

/// Unquote a double-quoted string with the common backslash escapes.
fn unquote(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '\'' => out.push('\''),
            _ => return None,
        }
    }
    Some(out)
}

/// Parsed `json` tag options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonOptions {
    /// Object key override; `None` falls back to the field name.
    pub name: Option<String>,
    pub omit_empty: bool,
    /// `json:"-"`: the field never appears in JSON.
    pub skip: bool,
}

impl JsonOptions {
    pub fn from_tag(tag: &str) -> Self {
        let Some(value) = StructTag::new(tag).lookup("json") else {
            return Self::default();
        };
        if value == "-" {
            return Self {
                skip: true,
                ..Self::default()
            };
        }

        let mut parts = value.split(',');
        let name = parts
            .next()
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let omit_empty = parts.any(|opt| opt == "omitempty");
        Self {
            name,
            omit_empty,
            skip: false,
        }
    }

    /// Object key for a field called `field_name`.
    pub fn key<'a>(&'a self, field_name: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(field_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let tag = StructTag::new(r#"json:"v,omitempty" xml:"value" empty:"""#);
        assert_eq!(tag.lookup("json").as_deref(), Some("v,omitempty"));
        assert_eq!(tag.lookup("xml").as_deref(), Some("value"));
        assert_eq!(tag.lookup("empty").as_deref(), Some(""));
        assert_eq!(tag.lookup("yaml"), None);
    }

    #[test]
    fn test_lookup_escapes() {
        let tag = StructTag::new(r#"doc:"say \"hi\"" json:"x""#);
        assert_eq!(tag.lookup("doc").as_deref(), Some(r#"say "hi""#));
        assert_eq!(tag.lookup("json").as_deref(), Some("x"));
    }

    #[test]
    fn test_malformed_tags() {
        assert_eq!(StructTag::new("").lookup("json"), None);
        assert_eq!(StructTag::new("json").lookup("json"), None);
        assert_eq!(StructTag::new(r#"json:"unterminated"#).lookup("json"), None);
        assert_eq!(StructTag::new(r#"json: "spaced""#).lookup("json"), None);
    }

    #[test]
    fn test_json_options() {
        assert_eq!(JsonOptions::from_tag(""), JsonOptions::default());
        assert!(JsonOptions::from_tag(r#"json:"-""#).skip);

        let opts = JsonOptions::from_tag(r#"json:"nested_ptr,omitempty""#);
        assert_eq!(opts.key("NestedPtr"), "nested_ptr");
        assert!(opts.omit_empty);

        let opts = JsonOptions::from_tag(r#"json:",omitempty""#);
        assert_eq!(opts.key("Count"), "Count");
        assert!(opts.omit_empty);
    }
}
