use djsync_util::error::SyncError;
use djsync_util::model::JudgeUrl;
use djsync_util::service::scrape::{ExtractCsrfToken, GetHtml, Scrape};
use djsync_util::service::Session;
use reqwest::{StatusCode, Url};
use scraper::{ElementRef, Html};

use crate::{Console, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPageBuilder<'a> {
    judge: &'a JudgeUrl,
}

impl<'a> LoginPageBuilder<'a> {
    pub const PATH: &'static str = "/login";

    pub fn new(judge: &'a JudgeUrl) -> Self {
        Self { judge }
    }

    pub fn build(self, session: &mut Session, cnsl: &mut Console) -> Result<LoginPage<'a>> {
        let (status, html) = self.get_html(session, cnsl)?;
        match status {
            StatusCode::OK => Ok(LoginPage {
                builder: self,
                content: html,
            }),
            _ => Err(SyncError::Authentication {
                judge: self.judge.to_string(),
                message: format!("Login page answered with status {}", status),
            }
            .into()),
        }
    }
}

impl GetHtml for LoginPageBuilder<'_> {
    fn url(&self) -> Result<Url> {
        self.judge.endpoint(Self::PATH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPage<'a> {
    builder: LoginPageBuilder<'a>,
    content: Html,
}

impl LoginPage<'_> {
    pub fn url(&self) -> Result<Url> {
        self.builder.url()
    }
}

impl Scrape for LoginPage<'_> {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

impl ExtractCsrfToken for LoginPage<'_> {}
