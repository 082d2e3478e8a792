use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::internal::models::{ArticleEntry, Link, Page};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static NAV_LINKS: LazyLock<Selector> = LazyLock::new(|| selector("nav a[href]"));
static SIDEBAR_LINKS: LazyLock<Selector> = LazyLock::new(|| selector("#mySidebar a[href]"));
static LOADING_WRAPPER: LazyLock<Selector> = LazyLock::new(|| selector("#loading-wrapper"));
static TRIGGERS: LazyLock<Selector> =
    LazyLock::new(|| selector(".summary[data-url], .discussion[data-article-id]"));
static HEADINGS_AND_LINKS: LazyLock<Selector> =
    LazyLock::new(|| selector("h1, h2, h3, h4, h5, h6, a[href]"));
static LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// Build the document model of a site page.
pub fn parse_page(html: &str, url: &str) -> Page {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| url.to_string());

    Page {
        url: url.to_string(),
        title,
        nav_links: collect_links(&document, &NAV_LINKS),
        sidebar_links: collect_links(&document, &SIDEBAR_LINKS),
        articles: collect_articles(&document),
        has_loading_indicator: document.select(&LOADING_WRAPPER).next().is_some(),
    }
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_links(document: &Html, selector: &Selector) -> Vec<Link> {
    document
        .select(selector)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
                return None;
            }
            let label = element_text(a);
            Some(Link {
                label: if label.is_empty() { href.to_string() } else { label },
                href: href.to_string(),
            })
        })
        .collect()
}

fn is_trigger(element: ElementRef) -> bool {
    element
        .value()
        .classes()
        .any(|c| c == "summary" || c == "discussion")
}

/// Triggers that share a parent element describe the same article.
fn collect_articles(document: &Html) -> Vec<ArticleEntry> {
    let mut entries: Vec<(ElementRef, ArticleEntry)> = Vec::new();

    for trigger in document.select(&TRIGGERS) {
        let container = trigger
            .parent()
            .and_then(ElementRef::wrap)
            .unwrap_or(trigger);

        let index = match entries.iter().position(|(c, _)| *c == container) {
            Some(index) => index,
            None => {
                entries.push((container, ArticleEntry::default()));
                entries.len() - 1
            }
        };
        let entry = &mut entries[index].1;

        let attrs = trigger.value();
        if let Some(url) = attrs.attr("data-url").filter(|u| !u.trim().is_empty())
            && entry.summary_url.is_none()
        {
            entry.summary_url = Some(url.trim().to_string());
        }
        if let Some(id) = attrs.attr("data-article-id").filter(|i| !i.trim().is_empty())
            && entry.article_id.is_none()
        {
            entry.article_id = Some(id.trim().to_string());
        }
    }

    entries
        .into_iter()
        .map(|(container, mut entry)| {
            entry.title = container
                .select(&HEADINGS_AND_LINKS)
                .filter(|e| !is_trigger(*e))
                .map(element_text)
                .find(|t| !t.is_empty())
                .or_else(|| entry.summary_url.clone())
                .or_else(|| entry.article_id.as_ref().map(|id| format!("Article {}", id)))
                .unwrap_or_default();
            entry.link = container
                .select(&LINKS)
                .filter(|e| !is_trigger(*e))
                .find_map(|a| a.value().attr("href").map(|h| h.trim().to_string()))
                .or_else(|| entry.summary_url.clone());
            entry
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<!DOCTYPE html>
<html>
<head><title> World News </title></head>
<body>
  <div id="loading-wrapper" style="display:none">Loading</div>
  <nav>
    <a href="/">Home</a>
    <a href="/BBC">BBC</a>
    <a href="#top">Top</a>
  </nav>
  <div id="mySidebar" class="sidebar">
    <a href="/Politics">Politics</a>
    <a href="/Economy">Economy</a>
  </div>
  <button id="click_me">Menu</button>
  <ul>
    <li>
      <a href="https://www.bbc.com/news/a">Storm hits coast</a>
      <button class="summary" data-url="https://www.bbc.com/news/a">Summary</button>
      <button class="discussion" data-article-id="42">Discussion</button>
    </li>
    <li>
      <h3>Markets rally</h3>
      <button class="summary" data-url="https://www.bbc.com/news/b">Summary</button>
    </li>
    <li>
      <button class="discussion" data-article-id="7">Discussion</button>
    </li>
  </ul>
</body>
</html>"##;

    #[test]
    fn test_parse_title_and_links() {
        let page = parse_page(PAGE, "http://localhost:5000/BBC");

        assert_eq!(page.title, "World News");
        assert_eq!(page.url, "http://localhost:5000/BBC");
        let nav: Vec<_> = page.nav_links.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(nav, vec!["/", "/BBC"]);
        let sidebar: Vec<_> = page.sidebar_links.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(sidebar, vec!["Politics", "Economy"]);
        assert!(page.has_loading_indicator);
    }

    #[test]
    fn test_triggers_grouped_by_parent() {
        let page = parse_page(PAGE, "http://localhost:5000/BBC");

        assert_eq!(page.articles.len(), 3);

        let first = &page.articles[0];
        assert_eq!(first.title, "Storm hits coast");
        assert_eq!(first.summary_url.as_deref(), Some("https://www.bbc.com/news/a"));
        assert_eq!(first.article_id.as_deref(), Some("42"));
        assert_eq!(first.link.as_deref(), Some("https://www.bbc.com/news/a"));

        let second = &page.articles[1];
        assert_eq!(second.title, "Markets rally");
        assert_eq!(second.article_id, None);

        let third = &page.articles[2];
        assert_eq!(third.title, "Article 7");
        assert_eq!(third.summary_url, None);
    }

    #[test]
    fn test_page_without_indicator_or_title() {
        let page = parse_page("<html><body><p>Empty</p></body></html>", "http://x/");
        assert_eq!(page.title, "http://x/");
        assert!(!page.has_loading_indicator);
        assert!(page.articles.is_empty());
        assert!(page.nav_links.is_empty());
    }
}
