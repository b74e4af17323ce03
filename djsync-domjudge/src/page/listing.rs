use djsync_util::model::{JudgeUrl, RemoteId, ResourceKind, ResourceName};
use djsync_util::select;
use djsync_util::service::scrape::{GetHtml, Scrape};
use djsync_util::service::Session;
use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::page::GetHtmlJury;
use crate::{Console, Result};

/// Trailing segments of links that act on a resource instead of showing it.
static ACTION_SEGMENTS: &[&str] = &["delete", "edit"];

/// Jury page listing every problem or every executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPageBuilder<'a> {
    judge: &'a JudgeUrl,
    kind: ResourceKind,
}

impl<'a> ListingPageBuilder<'a> {
    pub fn new(judge: &'a JudgeUrl, kind: ResourceKind) -> Self {
        Self { judge, kind }
    }

    pub fn build(self, session: &mut Session, cnsl: &mut Console) -> Result<ListingPage> {
        let html = self.get_html_jury(session, cnsl)?;
        Ok(ListingPage::new(html))
    }
}

impl GetHtml for ListingPageBuilder<'_> {
    fn url(&self) -> Result<Url> {
        self.judge.endpoint(self.kind.listing_path())
    }
}

impl GetHtmlJury for ListingPageBuilder<'_> {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    content: Html,
}

impl ListingPage {
    pub fn new(content: Html) -> Self {
        Self { content }
    }

    /// Ids of table anchors whose text contains `name`, in document order.
    ///
    /// Matching is by substring, so `probA` also finds `probAB`. Delete and edit links
    /// are skipped.
    pub fn find_ids(&self, name: &ResourceName) -> Vec<RemoteId> {
        self.content
            .select(select!("table a[href]"))
            .filter(|anchor| anchor.inner_text().contains(name.as_str()))
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter_map(last_segment)
            .filter(|segment| !ACTION_SEGMENTS.contains(segment))
            .map(RemoteId::from)
            .collect()
    }
}

impl Scrape for ListingPage {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

fn last_segment(href: &str) -> Option<&str> {
    let path = href.split(|c| c == '?' || c == '#').next()?;
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    static PROBLEMS_HTML: &str = r#"
<html><body>
<nav><a href="/jury/problems">Problems</a></nav>
<table class="data-table">
  <thead><tr><th>ID</th><th>name</th><th></th></tr></thead>
  <tbody>
    <tr>
      <td><a href="/jury/problems/3">3</a></td>
      <td><a href="/jury/problems/3">probAB</a></td>
      <td><a href="/jury/problems/3/delete" title="delete"><i class="fas fa-trash-alt"></i></a></td>
    </tr>
    <tr>
      <td><a href="/jury/problems/7">7</a></td>
      <td><a href="/jury/problems/7">probA</a></td>
      <td><a href="/jury/problems/7/edit">edit probA</a></td>
      <td><a href="/jury/problems/7/delete/">delete probA</a></td>
    </tr>
    <tr>
      <td><a href="/domjudge/jury/problems/12/?sort=name">Sum of two</a></td>
    </tr>
  </tbody>
</table>
</body></html>
"#;

    #[test]
    fn test_find_ids() {
        let page = ListingPage::new(Html::parse_document(PROBLEMS_HTML));
        let tests: &[(&str, &[&str])] = &[
            ("probAB", &["3"]),
            ("probA", &["3", "7"]),
            ("Sum of two", &["12"]),
            ("probC", &[]),
            ("delete probA", &[]),
            ("Problems", &[]),
        ];
        for (name, expected) in tests {
            let actual = page.find_ids(&ResourceName::from(*name));
            let actual = actual.iter().map(RemoteId::as_str).collect::<Vec<_>>();
            assert_eq!(&actual, expected);
        }
    }

    #[test]
    fn test_last_segment() {
        let tests = &[
            ("/jury/executables/compare_float", Some("compare_float")),
            ("https://judge/jury/problems/4/", Some("4")),
            ("/jury/problems/4?edit=1", Some("4")),
            ("", None),
        ];
        for (href, expected) in tests {
            assert_eq!(last_segment(href), *expected);
        }
    }
}
