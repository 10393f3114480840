//! Markdown-to-HTML rendering for study guides.
//!
//! The generative model answers in lightweight markdown. This renderer
//! covers the subset the prompt asks for (headings, bold, bullet lists,
//! paragraphs) and escapes everything else, so model output can be embedded
//! in a page or PDF without further processing.

/// Render a markdown study guide as HTML.
pub fn render_markdown(markdown: &str) -> String {
    let mut html = String::new();
    let mut list_open = false;
    let mut paragraph: Vec<String> = Vec::new();

    let flush_paragraph = |html: &mut String, paragraph: &mut Vec<String>| {
        if !paragraph.is_empty() {
            html.push_str("<p>");
            html.push_str(&paragraph.join(" "));
            html.push_str("</p>\n");
            paragraph.clear();
        }
    };

    for line in markdown.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if list_open {
                html.push_str("</ul>\n");
                list_open = false;
            }
            flush_paragraph(&mut html, &mut paragraph);
            continue;
        }

        if let Some(heading) = parse_heading(trimmed) {
            if list_open {
                html.push_str("</ul>\n");
                list_open = false;
            }
            flush_paragraph(&mut html, &mut paragraph);
            let (level, text) = heading;
            html.push_str(&format!(
                "<h{level}>{}</h{level}>\n",
                render_inline(text)
            ));
            continue;
        }

        if let Some(item) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
            flush_paragraph(&mut html, &mut paragraph);
            if !list_open {
                html.push_str("<ul>\n");
                list_open = true;
            }
            html.push_str(&format!("<li>{}</li>\n", render_inline(item)));
            continue;
        }

        if list_open {
            html.push_str("</ul>\n");
            list_open = false;
        }
        paragraph.push(render_inline(trimmed));
    }

    if list_open {
        html.push_str("</ul>\n");
    }
    flush_paragraph(&mut html, &mut paragraph);

    html.trim_end().to_string()
}

/// Parse `#`/`##`/`###` headings. Deeper levels render as h3.
fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    let text = rest.strip_prefix(' ')?;
    Some((hashes.min(3) as u8, text))
}

/// Render inline markup: escape HTML, then `**bold**` and `*italic*`.
fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);
    let bold = replace_delimited(&escaped, "**", "<strong>", "</strong>");
    replace_delimited(&bold, "*", "<em>", "</em>")
}

/// Replace paired occurrences of a delimiter with open/close tags.
/// Unpaired delimiters are left as-is.
fn replace_delimited(text: &str, delim: &str, open: &str, close: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(delim) {
        let after_start = &rest[start + delim.len()..];
        match after_start.find(delim) {
            Some(end) if !after_start[..end].is_empty() => {
                result.push_str(&rest[..start]);
                result.push_str(open);
                result.push_str(&after_start[..end]);
                result.push_str(close);
                rest = &after_start[end + delim.len()..];
            }
            _ => {
                result.push_str(&rest[..start + delim.len()]);
                rest = after_start;
            }
        }
    }

    result.push_str(rest);
    result
}

/// Escape characters with meaning in HTML.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings() {
        assert_eq!(render_markdown("## Key Concepts"), "<h2>Key Concepts</h2>");
        assert_eq!(render_markdown("# Subject"), "<h1>Subject</h1>");
        // Deep headings clamp to h3
        assert_eq!(render_markdown("#### Detail"), "<h3>Detail</h3>");
    }

    #[test]
    fn test_heading_requires_space() {
        assert_eq!(render_markdown("##NoSpace"), "<p>##NoSpace</p>");
    }

    #[test]
    fn test_bullet_list() {
        let md = "- first point\n- second point";
        assert_eq!(
            render_markdown(md),
            "<ul>\n<li>first point</li>\n<li>second point</li>\n</ul>"
        );
    }

    #[test]
    fn test_star_bullets() {
        let md = "* one\n* two";
        assert!(render_markdown(md).contains("<li>one</li>"));
        assert!(render_markdown(md).contains("<li>two</li>"));
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            render_markdown("This is **important** and *subtle*."),
            "<p>This is <strong>important</strong> and <em>subtle</em>.</p>"
        );
    }

    #[test]
    fn test_unpaired_delimiters_left_alone() {
        assert_eq!(
            render_markdown("2 * 3 equals 6"),
            "<p>2 * 3 equals 6</p>"
        );
    }

    #[test]
    fn test_paragraph_joining() {
        let md = "First line\nsecond line\n\nNew paragraph";
        assert_eq!(
            render_markdown(md),
            "<p>First line second line</p>\n<p>New paragraph</p>"
        );
    }

    #[test]
    fn test_html_escaped() {
        assert_eq!(
            render_markdown("x < y & y > z"),
            "<p>x &lt; y &amp; y &gt; z</p>"
        );
    }

    #[test]
    fn test_full_study_guide_shape() {
        let md = "## Subject\nA lecture on sorting.\n\n## Key Concepts\n- Quicksort\n- **Merge** sort\n\n## Summary\nSorting matters.";
        let html = render_markdown(md);
        assert!(html.contains("<h2>Subject</h2>"));
        assert!(html.contains("<li>Quicksort</li>"));
        assert!(html.contains("<li><strong>Merge</strong> sort</li>"));
        assert!(html.ends_with("<p>Sorting matters.</p>"));
    }
}
