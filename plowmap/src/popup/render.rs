//! Rendu des popups en HTML (échappé) ou en texte

use std::fmt::Write;

use super::{Item, PopupContent};

/// Rendu HTML; tout texte issu des features est échappé
pub fn render_html(content: &PopupContent) -> String {
    let mut out = String::new();
    let level = content.heading.level.clamp(1, 6);
    let _ = writeln!(
        out,
        "<h{level}>{}</h{level}>",
        escape_html(&content.heading.text)
    );

    if let Some(subtitle) = &content.subtitle {
        let _ = writeln!(out, "<p>{}</p>", escape_html(subtitle));
    }

    for section in &content.sections {
        if let Some(title) = &section.title {
            let _ = writeln!(out, "<h2>{}</h2>", escape_html(title));
        }
        html_list(&mut out, &section.items);
    }

    out
}

fn html_list(out: &mut String, items: &[Item]) {
    out.push_str("<ul>\n");
    for item in items {
        let text = escape_html(&item.text);
        if item.strong {
            let _ = writeln!(out, "<li><b>{}</b></li>", text);
        } else {
            let _ = writeln!(out, "<li>{}</li>", text);
        }
        if !item.children.is_empty() {
            html_list(out, &item.children);
        }
    }
    out.push_str("</ul>\n");
}

/// Rendu texte pour le terminal
pub fn render_text(content: &PopupContent) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", content.heading.text);

    if let Some(subtitle) = &content.subtitle {
        let _ = writeln!(out, "{}", subtitle);
    }

    for section in &content.sections {
        if let Some(title) = &section.title {
            let _ = writeln!(out, "\n{}", title);
        }
        text_list(&mut out, &section.items, 1);
    }

    out
}

fn text_list(out: &mut String, items: &[Item], depth: usize) {
    for item in items {
        let _ = writeln!(out, "{}- {}", "  ".repeat(depth), item.text);
        text_list(out, &item.children, depth + 1);
    }
}

/// Échappe une chaîne pour HTML
fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::popup::{Heading, Section};

    fn sample() -> PopupContent {
        PopupContent {
            heading: Heading {
                level: 2,
                text: "N STATE ST".to_string(),
            },
            subtitle: None,
            sections: vec![Section::untitled(vec![
                Item::new("Plowed at Not Logged").with_child(Item::new("8+ hours ago")),
                Item::new("Priority: Main Route"),
            ])],
        }
    }

    #[test]
    fn test_render_html_nested() {
        let html = render_html(&sample());

        assert_eq!(
            html,
            "<h2>N STATE ST</h2>\n<ul>\n<li>Plowed at Not Logged</li>\n<ul>\n<li>8+ hours ago</li>\n</ul>\n<li>Priority: Main Route</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_render_html_escapes_feature_text() {
        let mut content = sample();
        content.heading.text = "<script>alert('x')</script>".to_string();
        content.subtitle = Some("Tom & \"Jerry\"".to_string());

        let html = render_html(&content);

        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("<p>Tom &amp; &quot;Jerry&quot;</p>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&sample());

        assert_eq!(
            text,
            "N STATE ST\n  - Plowed at Not Logged\n    - 8+ hours ago\n  - Priority: Main Route\n"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("hello"), "hello");
        assert_eq!(escape_html("a<b"), "a&lt;b");
    }
}
