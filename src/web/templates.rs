const INDEX_HTML: &str = include_str!("templates/index.html");
const PAGE_HTML: &str = include_str!("templates/page.html");
const EMPTY_HTML: &str = include_str!("templates/empty.html");
const APP_CSS: &str = include_str!("templates/app.css");

pub(crate) fn render_index(resume_page: Option<i64>, total: usize) -> String {
    let (href, label) = match resume_page {
        Some(page) if page > 0 => (format!("/page/{page}"), format!("Continue at page {page}")),
        _ => ("/page/1".to_string(), "Start reading".to_string()),
    };
    let total = total.to_string();
    fill(
        INDEX_HTML,
        &[
            ("RESUME_HREF", href.as_str()),
            ("RESUME_LABEL", label.as_str()),
            ("TOTAL", total.as_str()),
        ],
    )
}

pub(crate) fn render_page(
    image_src: &str,
    page: i64,
    previous_page: i64,
    next_page: i64,
    total: usize,
) -> String {
    let page = page.to_string();
    let previous_page = previous_page.to_string();
    let next_page = next_page.to_string();
    let total = total.to_string();
    fill(
        PAGE_HTML,
        &[
            ("IMAGE_SRC", image_src),
            ("PAGE", page.as_str()),
            ("PREV_PAGE", previous_page.as_str()),
            ("NEXT_PAGE", next_page.as_str()),
            ("TOTAL", total.as_str()),
        ],
    )
}

pub(crate) fn render_empty() -> String {
    fill(EMPTY_HTML, &[])
}

/// 单遍替换 `{{KEY}}` 占位符，值一律做 HTML 转义；`{{STYLE}}` 插入内置样式。
/// 代入的值不会再被扫描，未知的占位符原样保留。
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + APP_CSS.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail[2..].find("}}") else {
            rest = tail;
            break;
        };
        let placeholder = &tail[..end + 4];
        let key = &tail[2..end + 2];
        if key == "STYLE" {
            out.push_str(APP_CSS);
        } else if let Some((_, value)) = vars.iter().find(|(k, _)| *k == key) {
            out.push_str(&escape_html(value));
        } else {
            out.push_str(placeholder);
        }
        rest = &tail[placeholder.len()..];
    }
    out.push_str(rest);
    out
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_template_escapes_reference() {
        let html = render_page("/assets/a&b/\"x\".png", 2, 1, 3, 9);
        assert!(html.contains(r#"src="/assets/a&amp;b/&quot;x&quot;.png""#));
        assert!(html.contains(r#"href="/page/1" rel="prev""#));
        assert!(html.contains(r#"href="/page/3" rel="next""#));
        assert!(html.contains("2 / 9"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        let html = render_page("/assets/c_01/{{PAGE}}{{TOTAL}}.png", 2, 1, 3, 9);
        assert!(html.contains(r#"src="/assets/c_01/{{PAGE}}{{TOTAL}}.png""#));
        assert!(html.contains("2 / 9"));
    }

    #[test]
    fn unknown_and_unclosed_placeholders_stay_literal() {
        assert_eq!(fill("a {{NOPE}} b", &[]), "a {{NOPE}} b");
        assert_eq!(fill("{{X}} {{X", &[("X", "<1>")]), "&lt;1&gt; {{X");
    }

    #[test]
    fn index_offers_resume_only_for_positive_pages() {
        let html = render_index(Some(7), 20);
        assert!(html.contains(r#"href="/page/7""#));
        assert!(html.contains("Continue at page 7"));

        let html = render_index(Some(-1), 20);
        assert!(html.contains("Start reading"));
        let html = render_index(None, 0);
        assert!(html.contains("0 pages"));
    }
}
