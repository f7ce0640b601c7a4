//! Markup tokenizer for host-supplied HTML/SVG snippets.
//!
//! Deliberately small: names are restricted to ASCII `[A-Za-z0-9:_-]`, there is
//! no parse-error recovery beyond skipping unexpected bytes, and only
//! `script`/`style` switch to raw text. Doctypes are dropped since fragments
//! never carry one.
use crate::entities::decode_entities;
use memchr::memchr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkupToken {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Find `</name` followed by optional ASCII whitespace and `>`, case-insensitively.
/// Returns `(start_of_close_tag, end_after_gt)`.
fn find_rawtext_close_tag(haystack: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let needle = name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        i += memchr(b'<', &bytes[i..])?;
        let name_start = i + 2;
        let name_end = name_start + needle.len();
        if bytes.get(i + 1) == Some(&b'/')
            && name_end <= bytes.len()
            && bytes[name_start..name_end].eq_ignore_ascii_case(needle)
        {
            let mut k = name_end;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if bytes.get(k) == Some(&b'>') {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

/// Tokenize a markup snippet. Tag and attribute names are ASCII-lowercased
/// unless `preserve_case` is set (SVG names such as `foreignObject` and
/// `viewBox` are case-sensitive).
pub fn tokenize_markup(input: &str, preserve_case: bool) -> Vec<MarkupToken> {
    let fold = |s: &str| {
        if preserve_case {
            s.to_string()
        } else {
            s.to_ascii_lowercase()
        }
    };
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut i = 0;
    // Slices are only cut at ASCII structural bytes, so every endpoint is a
    // UTF-8 char boundary.
    while i < len {
        if bytes[i] != b'<' {
            let start = i;
            i = memchr(b'<', &bytes[i..]).map_or(len, |rel| i + rel);
            let decoded = decode_entities(&input[start..i]);
            if !decoded.is_empty() {
                out.push(MarkupToken::Text(decoded));
            }
            continue;
        }

        if input[i..].starts_with(COMMENT_START) {
            let body_start = i + COMMENT_START.len();
            match input[body_start..].find(COMMENT_END) {
                Some(rel) => {
                    out.push(MarkupToken::Comment(
                        input[body_start..body_start + rel].to_string(),
                    ));
                    i = body_start + rel + COMMENT_END.len();
                }
                None => {
                    out.push(MarkupToken::Comment(input[body_start..].to_string()));
                    i = len;
                }
            }
            continue;
        }

        if bytes.get(i + 1) == Some(&b'!') {
            // Doctype or bogus declaration: skip to '>'.
            i = memchr(b'>', &bytes[i..]).map_or(len, |rel| i + rel + 1);
            continue;
        }

        if bytes.get(i + 1) == Some(&b'/') {
            let start = i + 2;
            let mut j = start;
            while j < len && is_name_char(bytes[j]) {
                j += 1;
            }
            let name = fold(&input[start..j]);
            j = memchr(b'>', &bytes[j..]).map_or(len, |rel| j + rel + 1);
            if !name.is_empty() {
                out.push(MarkupToken::EndTag(name));
            }
            i = j;
            continue;
        }

        let start = i + 1;
        let mut k = start;
        while k < len && is_name_char(bytes[k]) {
            k += 1;
        }
        if k == start {
            // A lone '<' is text.
            out.push(MarkupToken::Text("<".to_string()));
            i += 1;
            continue;
        }
        let name = fold(&input[start..k]);
        let mut attributes: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;

        let skip_whitespace = |k: &mut usize| {
            while *k < len && bytes[*k].is_ascii_whitespace() {
                *k += 1;
            }
        };

        loop {
            skip_whitespace(&mut k);
            if k >= len {
                break;
            }
            if bytes[k] == b'>' {
                k += 1;
                break;
            }
            if bytes[k] == b'/' {
                if bytes.get(k + 1) == Some(&b'>') {
                    self_closing = true;
                    k += 2;
                    break;
                }
                k += 1;
                continue;
            }
            let name_start = k;
            while k < len && is_name_char(bytes[k]) {
                k += 1;
            }
            if name_start == k {
                k += 1;
                continue;
            }
            let attribute_name = fold(&input[name_start..k]);

            skip_whitespace(&mut k);
            let mut value = String::new();
            if k < len && bytes[k] == b'=' {
                k += 1;
                skip_whitespace(&mut k);
                if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                    let quote = bytes[k];
                    k += 1;
                    let vstart = k;
                    k = memchr(quote, &bytes[k..]).map_or(len, |rel| k + rel);
                    value = decode_entities(&input[vstart..k]);
                    if k < len {
                        k += 1;
                    }
                } else {
                    let vstart = k;
                    while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                        if bytes[k] == b'/' && bytes.get(k + 1) == Some(&b'>') {
                            break;
                        }
                        k += 1;
                    }
                    value = decode_entities(&input[vstart..k]);
                }
            }
            // First occurrence wins, as in the HTML tokenizer.
            if !attributes.iter().any(|(n, _)| *n == attribute_name) {
                attributes.push((attribute_name, value));
            }
        }

        let rawtext = !self_closing && (name == "script" || name == "style");
        out.push(MarkupToken::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if rawtext {
            match find_rawtext_close_tag(&input[k..], &name) {
                Some((rel_start, rel_end)) => {
                    let raw = &input[k..k + rel_start];
                    if !raw.is_empty() {
                        out.push(MarkupToken::Text(raw.to_string()));
                    }
                    out.push(MarkupToken::EndTag(name));
                    i = k + rel_end;
                }
                None => {
                    // Missing close tag: the remainder is raw text.
                    if k < len {
                        out.push(MarkupToken::Text(input[k..].to_string()));
                    }
                    out.push(MarkupToken::EndTag(name));
                    i = len;
                }
            }
            continue;
        }
        i = k;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, attributes: &[(&str, &str)], self_closing: bool) -> MarkupToken {
        MarkupToken::StartTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            self_closing,
        }
    }

    #[test]
    fn tokenizes_elements_text_and_comments() {
        let tokens = tokenize_markup("<P Class=a>hi &amp; bye</p><!-- c --><br/>", false);
        assert_eq!(
            tokens,
            vec![
                start("p", &[("class", "a")], false),
                MarkupToken::Text("hi & bye".to_string()),
                MarkupToken::EndTag("p".to_string()),
                MarkupToken::Comment(" c ".to_string()),
                start("br", &[], true),
            ]
        );
    }

    #[test]
    fn preserves_case_for_foreign_content() {
        let tokens = tokenize_markup("<foreignObject viewBox='0 0 1 1'/>", true);
        assert_eq!(
            tokens,
            vec![start("foreignObject", &[("viewBox", "0 0 1 1")], true)]
        );
    }

    #[test]
    fn script_body_is_raw_text() {
        let tokens = tokenize_markup("<script>if (a < b) {}</SCRIPT >after", false);
        assert_eq!(
            tokens,
            vec![
                start("script", &[], false),
                MarkupToken::Text("if (a < b) {}".to_string()),
                MarkupToken::EndTag("script".to_string()),
                MarkupToken::Text("after".to_string()),
            ]
        );
    }

    #[test]
    fn handles_non_ascii_text_and_values() {
        let tokens = tokenize_markup("¡Hola <b title=\"café\">😊</b>", false);
        assert_eq!(tokens[0], MarkupToken::Text("¡Hola ".to_string()));
        assert_eq!(tokens[1], start("b", &[("title", "café")], false));
        assert_eq!(tokens[2], MarkupToken::Text("😊".to_string()));
    }

    #[test]
    fn skips_doctype_and_keeps_lone_angle_bracket() {
        let tokens = tokenize_markup("<!DOCTYPE html>1 < 2", false);
        assert_eq!(
            tokens,
            vec![
                MarkupToken::Text("1 ".to_string()),
                MarkupToken::Text("<".to_string()),
                MarkupToken::Text(" 2".to_string()),
            ]
        );
    }

    #[test]
    fn duplicate_attributes_keep_first() {
        let tokens = tokenize_markup("<a href=x href=y>", false);
        assert_eq!(tokens, vec![start("a", &[("href", "x")], false)]);
    }
}
