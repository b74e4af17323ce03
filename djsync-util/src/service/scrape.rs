use anyhow::Context as _;
use reqwest::{StatusCode, Url};
use scraper::{ElementRef, Html, Selector};

use crate::select;
use crate::service::session::{classify_network_error, Session, WithSession as _};
use crate::{Console, Error, Result};

pub trait GetHtml {
    fn url(&self) -> Result<Url>;

    fn get_html(&self, session: &mut Session, cnsl: &mut Console) -> Result<(StatusCode, Html)> {
        let req = session.client().get(self.url()?);
        let res = req.with_session(session, cnsl).send_pretty()?;
        let status = res.status();
        let url = res.url().to_string();
        let text = res
            .text()
            .map_err(|err| classify_network_error(&url, err))?;
        Ok((status, Html::parse_document(&text)))
    }
}

pub trait Scrape {
    fn elem(&self) -> ElementRef;

    fn find_first(&self, selector: &Selector) -> Option<ElementRef> {
        self.elem().select(selector).next()
    }

    fn inner_text(&self) -> String {
        self.elem().text().fold(String::new(), |mut ret, s| {
            ret.push_str(s);
            ret
        })
    }

    /// Value of the first `input` whose name contains `name_part`.
    fn extract_input_value(&self, name_part: &str) -> Option<&str> {
        self.elem()
            .select(select!("input[name]"))
            .find(|input| {
                input
                    .value()
                    .attr("name")
                    .map_or(false, |name| name.contains(name_part))
            })
            .and_then(|input| input.value().attr("value"))
    }
}

impl Scrape for ElementRef<'_> {
    fn elem(&self) -> ElementRef {
        *self
    }
}

pub trait ExtractCsrfToken: Scrape {
    fn extract_csrf_token(&self) -> Result<&str> {
        let token = self
            .extract_input_value("_csrf_token")
            .context("Could not extract csrf token")?;
        if token.is_empty() {
            Err(Error::msg("Found empty csrf token"))
        } else {
            Ok(token)
        }
    }
}
