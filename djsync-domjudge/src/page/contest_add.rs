use djsync_util::model::{JudgeUrl, NewContest, TeamCategory};
use djsync_util::service::scrape::{GetHtml, Scrape};
use djsync_util::service::Session;
use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::page::GetHtmlJury;
use crate::{Console, Result};

static TOKEN_FIELD: &str = "contest[_token]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestAddPageBuilder<'a> {
    judge: &'a JudgeUrl,
}

impl<'a> ContestAddPageBuilder<'a> {
    pub const PATH: &'static str = "/jury/contests/add";

    pub fn new(judge: &'a JudgeUrl) -> Self {
        Self { judge }
    }

    pub fn build(self, session: &mut Session, cnsl: &mut Console) -> Result<ContestAddPage> {
        let html = self.get_html_jury(session, cnsl)?;
        Ok(ContestAddPage::new(html))
    }
}

impl GetHtml for ContestAddPageBuilder<'_> {
    fn url(&self) -> Result<Url> {
        self.judge.endpoint(Self::PATH)
    }
}

impl GetHtmlJury for ContestAddPageBuilder<'_> {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestAddPage {
    content: Html,
}

impl ContestAddPage {
    pub fn new(content: Html) -> Self {
        Self { content }
    }

    /// Form token, which older judges do not render.
    pub fn extract_token(&self) -> Option<&str> {
        self.extract_input_value(TOKEN_FIELD)
            .filter(|token| !token.is_empty())
    }

    /// Fields of the add form for `contest`, with times in `timezone`.
    pub fn form(
        &self,
        contest: &NewContest,
        category: &TeamCategory,
        timezone: &str,
    ) -> Vec<(&'static str, String)> {
        let start = contest.start_string(timezone);
        let end = contest.end_string(timezone);
        let mut form = vec![
            ("contest[shortname]", contest.shortname().to_owned()),
            ("contest[name]", contest.name().to_owned()),
            ("contest[activatetimeString]", start.clone()),
            ("contest[starttimeString]", start),
            ("contest[endtimeString]", end),
            ("contest[freezetimeString]", String::new()),
            ("contest[unfreezetimeString]", String::new()),
            ("contest[deactivatetimeString]", String::new()),
            ("contest[starttimeEnabled]", "1".to_owned()),
            ("contest[processBalloons]", "0".to_owned()),
            ("contest[medalsEnabled]", "0".to_owned()),
            ("contest[public]", "0".to_owned()),
            ("contest[openToAllTeams]", "0".to_owned()),
            ("contest[enabled]", "1".to_owned()),
            ("contest[teamCategories][]", category.id().to_owned()),
        ];
        if let Some(token) = self.extract_token() {
            form.push((TOKEN_FIELD, token.to_owned()));
        }
        form
    }
}

impl Scrape for ContestAddPage {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_contest() -> anyhow::Result<NewContest> {
        NewContest::parse(
            "bapc2020testing",
            "BAPC 2020 testing",
            "2020-10-03 10:00",
            "2020-10-03 15:00",
        )
    }

    fn field<'a>(form: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        form.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn test_form_with_token() -> anyhow::Result<()> {
        let html = r#"<form name="contest">
            <input type="text" name="contest[shortname]">
            <input type="hidden" id="contest__token" name="contest[_token]" value="tok3n">
        </form>"#;
        let page = ContestAddPage::new(Html::parse_document(html));
        let form = page.form(
            &new_contest()?,
            &TeamCategory::new("4", "Staff"),
            "Europe/Amsterdam",
        );
        assert_eq!(field(&form, "contest[_token]"), Some("tok3n"));
        assert_eq!(field(&form, "contest[shortname]"), Some("bapc2020testing"));
        assert_eq!(
            field(&form, "contest[starttimeString]"),
            Some("2020-10-03 10:00:00 Europe/Amsterdam")
        );
        assert_eq!(
            field(&form, "contest[endtimeString]"),
            Some("2020-10-03 15:00:00 Europe/Amsterdam")
        );
        assert_eq!(field(&form, "contest[teamCategories][]"), Some("4"));
        assert_eq!(field(&form, "contest[public]"), Some("0"));
        assert_eq!(field(&form, "contest[processBalloons]"), Some("0"));
        assert_eq!(field(&form, "contest[starttimeEnabled]"), Some("1"));
        Ok(())
    }

    #[test]
    fn test_form_without_token() -> anyhow::Result<()> {
        let page = ContestAddPage::new(Html::parse_document("<form></form>"));
        let form = page.form(&new_contest()?, &TeamCategory::new("2", "Participants"), "UTC");
        assert_eq!(field(&form, "contest[_token]"), None);
        Ok(())
    }
}
