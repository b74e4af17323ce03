use anyhow::Context as _;
use djsync_util::model::{JudgeUrl, TeamCategory};
use djsync_util::select;
use djsync_util::service::scrape::{GetHtml, Scrape};
use djsync_util::service::Session;
use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::page::GetHtmlJury;
use crate::{Console, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoriesPageBuilder<'a> {
    judge: &'a JudgeUrl,
}

impl<'a> CategoriesPageBuilder<'a> {
    pub const PATH: &'static str = "/jury/categories";

    pub fn new(judge: &'a JudgeUrl) -> Self {
        Self { judge }
    }

    pub fn build(self, session: &mut Session, cnsl: &mut Console) -> Result<CategoriesPage> {
        let html = self.get_html_jury(session, cnsl)?;
        Ok(CategoriesPage::new(html))
    }
}

impl GetHtml for CategoriesPageBuilder<'_> {
    fn url(&self) -> Result<Url> {
        self.judge.endpoint(Self::PATH)
    }
}

impl GetHtmlJury for CategoriesPageBuilder<'_> {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoriesPage {
    content: Html,
}

impl CategoriesPage {
    pub fn new(content: Html) -> Self {
        Self { content }
    }

    fn name_column(&self) -> Result<usize> {
        self.content
            .select(select!("table thead th"))
            .position(|th| th.inner_text().trim().eq_ignore_ascii_case("name"))
            .context("Could not find name column of categories table")
    }

    pub fn extract_categories(&self) -> Result<Vec<TeamCategory>> {
        let name_col = self.name_column()?;
        let categories = self
            .content
            .select(select!("table tbody tr"))
            .filter_map(|row| {
                let id = row
                    .select(select!("a[href]"))
                    .filter_map(|anchor| anchor.value().attr("href"))
                    .find_map(|href| {
                        let id = href.trim_end_matches('/').rsplit('/').next()?;
                        if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
                            Some(id.to_owned())
                        } else {
                            None
                        }
                    })?;
                let name = row
                    .select(select!("td"))
                    .nth(name_col)?
                    .inner_text()
                    .trim()
                    .to_owned();
                Some(TeamCategory::new(id, name))
            })
            .collect();
        Ok(categories)
    }
}

impl Scrape for CategoriesPage {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static CATEGORIES_HTML: &str = r#"
<html><body>
<table class="data-table">
  <thead><tr><th>ID</th><th>sort</th><th>name</th><th># teams</th></tr></thead>
  <tbody>
    <tr>
      <td><a href="/jury/categories/2">2</a></td>
      <td><a href="/jury/categories/2">0</a></td>
      <td><a href="/jury/categories/2">Participants</a></td>
      <td><a href="/jury/categories/2">14</a></td>
    </tr>
    <tr>
      <td><a href="/jury/categories/4">4</a></td>
      <td><a href="/jury/categories/4">1</a></td>
      <td><a href="/jury/categories/4"> Staff </a></td>
      <td><a href="/jury/categories/4">3</a></td>
    </tr>
  </tbody>
</table>
</body></html>
"#;

    #[test]
    fn test_extract_categories() -> anyhow::Result<()> {
        let page = CategoriesPage::new(Html::parse_document(CATEGORIES_HTML));
        let categories = page.extract_categories()?;
        assert_eq!(
            categories,
            vec![
                TeamCategory::new("2", "Participants"),
                TeamCategory::new("4", "Staff"),
            ]
        );
        assert!(categories[1].is_staff());
        Ok(())
    }

    #[test]
    fn test_extract_categories_without_table() {
        let page = CategoriesPage::new(Html::parse_document("<html><p>Login</p></html>"));
        assert!(page.extract_categories().is_err());
    }
}
