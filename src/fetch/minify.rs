// src/fetch/minify.rs
// =============================================================================
// A deliberately small HTML minifier.
//
// It only collapses runs of whitespace in text between tags down to a single
// space. Everything that could change meaning is copied verbatim:
// - tags themselves, including attribute values (so hrefs never change)
// - comments
// - the contents of <pre>, <textarea>, <script> and <style>
//
// The output renders the same as the input; it's just smaller on disk.
// =============================================================================

// Elements whose text content must be kept byte-for-byte
const RAW_TEXT_ELEMENTS: [&str; 4] = ["pre", "textarea", "script", "style"];

pub fn minify_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(tag_start) = rest.find('<') {
        push_collapsed(&mut out, &rest[..tag_start]);
        rest = &rest[tag_start..];

        let tag_len = markup_len(rest);
        let tag = &rest[..tag_len];
        out.push_str(tag);
        rest = &rest[tag_len..];

        if let Some(name) = raw_text_element(tag) {
            let close = find_closing_tag(rest, name).unwrap_or(rest.len());
            out.push_str(&rest[..close]);
            rest = &rest[close..];
        }
    }

    push_collapsed(&mut out, rest);
    out
}

// Copies text, replacing every whitespace run with one space
fn push_collapsed(out: &mut String, text: &str) {
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
                in_whitespace = true;
            }
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
}

// Length of the tag or comment at the start of `markup` (which begins with '<'),
// honouring quoted attribute values. Unterminated markup runs to the end.
fn markup_len(markup: &str) -> usize {
    if markup.starts_with("<!--") {
        return markup
            .find("-->")
            .map(|end| end + "-->".len())
            .unwrap_or(markup.len());
    }

    let mut quote: Option<char> = None;
    for (index, c) in markup.char_indices().skip(1) {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return index + 1,
            None => {}
        }
    }
    markup.len()
}

// Returns the element name when `tag` opens one of the raw-text elements
fn raw_text_element(tag: &str) -> Option<&'static str> {
    let name: String = tag
        .strip_prefix('<')?
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    RAW_TEXT_ELEMENTS.iter().copied().find(|raw| *raw == name)
}

// Byte offset of "</name" (case-insensitive) in `text`
fn find_closing_tag(text: &str, name: &str) -> Option<usize> {
    let needle = format!("</{}", name);
    text.to_ascii_lowercase().find(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_between_tags() {
        let html = "<ul>\n    <li>One</li>\n    <li>Two   words</li>\n</ul>\n";
        assert_eq!(minify_html(html), "<ul> <li>One</li> <li>Two words</li> </ul> ");
    }

    #[test]
    fn test_keeps_attribute_values_intact() {
        let html = r#"<a href="/a  b" title="x > y">link   text</a>"#;
        assert_eq!(minify_html(html), r#"<a href="/a  b" title="x > y">link text</a>"#);
    }

    #[test]
    fn test_preserves_raw_text_elements() {
        let html = "<PRE>  keep\n   this </PRE>\n\n<script>\n  if (a < b) {}\n</script>";
        assert_eq!(
            minify_html(html),
            "<PRE>  keep\n   this </PRE> <script>\n  if (a < b) {}\n</script>"
        );
    }

    #[test]
    fn test_preserves_comments() {
        let html = "<!--  a <b> comment  -->  <p>x</p>";
        assert_eq!(minify_html(html), "<!--  a <b> comment  --> <p>x</p>");
    }

    #[test]
    fn test_links_survive_minification() {
        let html = r#"
            <a href="http://site.test/about">About</a>
            <a href="http://site.test/contact?x=1">Contact</a>
        "#;
        let minified = minify_html(html);
        assert_eq!(
            crate::fetch::extract_links(&minified),
            crate::fetch::extract_links(html)
        );
    }
}
