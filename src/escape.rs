//! Escaping of text that is spliced into generated markup.

use std::fmt::Display;

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c)
        }
    }
}

/// Escape the five HTML special characters. `&` is handled in the
/// same pass as the others, hence entities are never escaped twice.
pub fn escape_html(v: impl Display) -> String {
    let s = v.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    push_escaped(&mut out, &s);
    out
}

/// Like `escape_html`, for attribute values; also escapes backticks.
pub fn escape_attr(v: impl Display) -> String {
    escape_html(v).replace('`', "&#96;")
}


#[cfg(test)]
mod tests {
    use super::*;
    use html5gum::Token;

    // Decode the way a browser reads element text.
    fn decode_text(escaped: &str) -> String {
        let mut out = String::new();
        for token in html5gum::Tokenizer::new(&*format!("<p>{escaped}</p>")).infallible() {
            if let Token::String(s) = token {
                out.push_str(std::str::from_utf8(&s.0).unwrap());
            }
        }
        out
    }

    fn decode_attr(escaped: &str) -> String {
        for token in html5gum::Tokenizer::new(&*format!("<img src=\"{escaped}\">")).infallible() {
            if let Token::StartTag(tag) = token {
                for (k, v) in tag.attributes {
                    if &*k.0 == b"src" {
                        return String::from_utf8(v.0).unwrap();
                    }
                }
            }
        }
        panic!("no src attribute")
    }

    #[test]
    fn t_escape_html() {
        assert_eq!(escape_html("Pasta"), "Pasta");
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_html("\"it's\""), "&quot;it&#39;s&quot;");
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
        assert_eq!(escape_html(12), "12");
        assert_eq!(escape_html(""), "");
        assert_eq!(escape_html("Käse `x`"), "Käse `x`");
    }

    #[test]
    fn t_escape_html_decodes_back() {
        for s in ["<script>&\"'", "a&b<c>d\"e'f", "&lt; already", "€ & ü"] {
            let e = escape_html(s);
            for c in ['&', '<', '>', '"', '\''] {
                if c != '&' {
                    assert!(!e.contains(c), "{e:?} contains {c:?}");
                }
            }
            // the only ampersands left start entities
            assert!(e.match_indices('&').all(
                |(i, _)| e[i..].starts_with("&amp;") || e[i..].starts_with("&lt;")
                    || e[i..].starts_with("&gt;") || e[i..].starts_with("&quot;")
                    || e[i..].starts_with("&#39;")));
            assert_eq!(decode_text(&e), s);
            assert_eq!(decode_attr(&e), s);
        }
    }

    #[test]
    fn t_escape_attr() {
        for s in ["plain", "`x` <y>", "``", "a'b\"c`d&e"] {
            assert_eq!(escape_attr(s), escape_html(s).replace('`', "&#96;"));
        }
        assert_eq!(escape_attr("img/`a`.jpg"), "img/&#96;a&#96;.jpg");
        assert_eq!(decode_attr(&escape_attr("x`y\"z")), "x`y\"z");
    }
}
