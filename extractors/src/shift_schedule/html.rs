use scraper::{ElementRef, Html};

/// Elements that start a new line in the flattened text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "tr", "table", "tbody", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6",
    "blockquote", "section", "article", "header", "footer", "pre",
];
const SKIPPED_TAGS: &[&str] = &["script", "style", "head", "title"];

/// Flatten an HTML body to one logical line per block element.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    flatten(document.root_element(), &mut out);

    out.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rough check for bodies that arrive as markup in a text part
pub fn looks_like_html(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    ["<html", "<body", "<br", "<p>", "<p ", "<div", "<table", "<td"]
        .iter()
        .any(|tag| lower.contains(tag))
}

fn flatten(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_TAGS.contains(&name) {
                continue;
            }
            match name {
                "br" => out.push('\n'),
                "td" | "th" => {
                    out.push(' ');
                    flatten(child_element, out);
                    out.push(' ');
                }
                _ if BLOCK_TAGS.contains(&name) => {
                    out.push('\n');
                    flatten(child_element, out);
                    out.push('\n');
                }
                _ => flatten(child_element, out),
            }
        } else if let Some(text) = child.value().as_text() {
            // Source formatting newlines are not line breaks in rendered HTML
            out.push_str(&text.replace(['\n', '\r'], " "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breaks_and_paragraphs_become_lines() {
        let html = r#"<html><head><style>p { color: red; }</style></head><body>
<p>Schedule for <b>September 1st - 14th</b></p>
<div>9
Tuesday</div>
8 AM - 6 PM Mesa<br>12 - 6 PM Tempe Jeshad
</body></html>"#;

        let text = html_to_text(html);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Schedule for September 1st - 14th",
                "9 Tuesday",
                "8 AM - 6 PM Mesa",
                "12 - 6 PM Tempe Jeshad",
            ]
        );
    }

    #[test]
    fn test_table_rows_become_lines() {
        let html = "<table><tr><td>8 AM - 6 PM</td><td>Chandler</td><td>Jeshad</td></tr>\
                    <tr><td>10 Wednesday</td></tr></table>";

        let text = html_to_text(html);
        assert_eq!(text, "8 AM - 6 PM Chandler Jeshad\n10 Wednesday");
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("<div>9 Tuesday</div>"));
        assert!(looks_like_html("line one<BR>line two"));
        assert!(!looks_like_html("9 Tuesday\n8 AM - 6 PM Mesa <- note"));
    }
}
