use std::time::Duration;

use anyhow::Context as _;
use djsync_util::error::SyncError;
use djsync_util::model::{
    Archive, Contest, ContestId, Credentials, JudgeUrl, NewContest, RemoteId, RemoteOutcome,
    ResourceKind, ResourceName, TeamCategory,
};
use djsync_util::service::scrape::ExtractCsrfToken as _;
use djsync_util::service::{classify_network_error, Remote, Session, WithSession as _};
use maplit::hashmap;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::RequestBuilder;
use reqwest::StatusCode;

use crate::api;
use crate::decode;
use crate::page::{
    CategoriesPageBuilder, ContestAddPageBuilder, ListingPageBuilder, LoginPageBuilder,
};
use crate::{Console, Result};

static ZIP_MIME: &str = "application/zip";

/// Authenticated connection to one judge, used for both the jury forms and the api.
///
/// The form interface is authenticated by the session cookie obtained in
/// [`DomjudgeClient::login`]; api requests carry the same credentials as basic auth.
#[derive(Debug)]
pub struct DomjudgeClient {
    judge: JudgeUrl,
    credentials: Credentials,
    timezone: String,
    session: Session,
}

impl DomjudgeClient {
    /// Logs in through the jury form and returns a client holding the session.
    ///
    /// `timezone` names the zone in which new contests are scheduled.
    pub fn login(
        judge: JudgeUrl,
        credentials: Credentials,
        timeout: Duration,
        timezone: impl Into<String>,
        cnsl: &mut Console,
    ) -> Result<Self> {
        let mut client = Self {
            judge,
            credentials,
            timezone: timezone.into(),
            session: Session::new(timeout)?,
        };
        client.login_form(cnsl)?;
        tracing::info!(judge = %client.judge, user = %client.username(), "logged in");
        Ok(client)
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    fn login_form(&mut self, cnsl: &mut Console) -> Result<()> {
        let page = LoginPageBuilder::new(&self.judge).build(&mut self.session, cnsl)?;
        let token = page
            .extract_csrf_token()
            .map_err(|err| self.auth_error(err.to_string()))?
            .to_owned();
        let url = page.url()?;

        let payload = hashmap! {
            "_username" => self.credentials.username().as_str(),
            "_password" => self.credentials.password().as_str(),
            "_csrf_token" => token.as_str(),
        };
        let res = self
            .session
            .client()
            .post(url)
            .form(&payload)
            .with_session(&mut self.session, cnsl)
            .follow_redirects(true)
            .send_pretty()?;
        if res.url().as_str().contains("login") {
            return Err(self
                .auth_error("Invalid username or password")
                .into());
        }
        Ok(())
    }

    fn auth_error(&self, message: impl Into<String>) -> SyncError {
        SyncError::Authentication {
            judge: self.judge.to_string(),
            message: message.into(),
        }
    }

    fn with_basic_auth(&self, req: RequestBuilder) -> RequestBuilder {
        req.basic_auth(
            self.credentials.username(),
            Some(self.credentials.password()),
        )
    }

    fn send(
        &mut self,
        req: RequestBuilder,
        follow_redirects: bool,
        cnsl: &mut Console,
    ) -> Result<(StatusCode, String)> {
        let res = req
            .with_session(&mut self.session, cnsl)
            .follow_redirects(follow_redirects)
            .send_pretty()?;
        let status = res.status();
        let url = res.url().to_string();
        let body = res
            .text()
            .map_err(|err| classify_network_error(&url, err))?;
        tracing::debug!(%status, body_len = body.len(), "received response");
        Ok((status, body))
    }
}

fn zip_part(archive: &Archive) -> Result<Part> {
    Part::bytes(archive.bytes().clone())
        .file_name(archive.file_name().clone())
        .mime_str(ZIP_MIME)
        .context("Could not build multipart body")
}

impl Remote for DomjudgeClient {
    fn judge(&self) -> &JudgeUrl {
        &self.judge
    }

    fn find_resource_ids(
        &mut self,
        kind: ResourceKind,
        name: &ResourceName,
        cnsl: &mut Console,
    ) -> Result<Vec<RemoteId>> {
        let page = ListingPageBuilder::new(&self.judge, kind).build(&mut self.session, cnsl)?;
        let ids = page.find_ids(name);
        tracing::debug!(%kind, %name, ?ids, "scanned listing");
        Ok(ids)
    }

    fn upload_problem(
        &mut self,
        contest_id: &ContestId,
        archive: &Archive,
        cnsl: &mut Console,
    ) -> Result<RemoteOutcome> {
        let url = self
            .judge
            .endpoint(&api::contest_problems_path(contest_id))?;
        let form = Form::new().part("zip", zip_part(archive)?);
        let req = self.session.client().post(url).multipart(form);
        let req = self.with_basic_auth(req);
        let (status, body) = self.send(req, false, cnsl)?;
        Ok(decode::problem_upload(status, &body))
    }

    fn upload_validator(
        &mut self,
        archive: &Archive,
        cnsl: &mut Console,
    ) -> Result<RemoteOutcome> {
        let url = self.judge.endpoint("/jury/executables/add")?;
        let form = Form::new()
            .text("executable_upload[type]", "compare")
            .part("executable_upload[archives][]", zip_part(archive)?);
        let req = self.session.client().post(url).multipart(form);
        let (status, body) = self.send(req, true, cnsl)?;
        Ok(decode::validator_upload(status, &body))
    }

    fn delete_resource(
        &mut self,
        kind: ResourceKind,
        id: &RemoteId,
        cnsl: &mut Console,
    ) -> Result<()> {
        let url = self.judge.endpoint(&kind.delete_path(id))?;
        let req = self.session.client().post(url);
        let (status, _) = self.send(req, false, cnsl)?;
        tracing::debug!(%kind, %id, %status, "requested deletion");
        Ok(())
    }

    fn link_problem(
        &mut self,
        contest_id: &ContestId,
        problem_id: &RemoteId,
        label: &str,
        cnsl: &mut Console,
    ) -> Result<RemoteOutcome> {
        let url = self
            .judge
            .endpoint(&api::contest_problem_path(contest_id, problem_id))?;
        let req = self
            .session
            .client()
            .put(url)
            .form(&hashmap! { "label" => label });
        let req = self.with_basic_auth(req);
        let (status, body) = self.send(req, false, cnsl)?;
        Ok(decode::problem_link(status, &body))
    }

    fn list_contests(&mut self, cnsl: &mut Console) -> Result<Vec<Contest>> {
        let url = self.judge.endpoint(api::CONTESTS_PATH)?;
        let req = self.with_basic_auth(self.session.client().get(url));
        let (status, body) = self.send(req, false, cnsl)?;
        match status {
            StatusCode::OK => api::parse_contests(&body),
            StatusCode::UNAUTHORIZED => Err(self
                .auth_error("The api rejected the credentials")
                .into()),
            _ => Err(SyncError::Remote {
                operation: "Contest listing".into(),
                resource: self.judge.to_string(),
                outcome: RemoteOutcome::rejected(status.as_u16(), body),
            }
            .into()),
        }
    }

    fn list_team_categories(&mut self, cnsl: &mut Console) -> Result<Vec<TeamCategory>> {
        CategoriesPageBuilder::new(&self.judge)
            .build(&mut self.session, cnsl)?
            .extract_categories()
    }

    fn create_contest(
        &mut self,
        contest: &NewContest,
        category: &TeamCategory,
        cnsl: &mut Console,
    ) -> Result<RemoteOutcome> {
        let page = ContestAddPageBuilder::new(&self.judge).build(&mut self.session, cnsl)?;
        let form = page.form(contest, category, &self.timezone);
        let url = self.judge.endpoint(ContestAddPageBuilder::PATH)?;
        let req = self.session.client().post(url).form(&form);
        let (status, body) = self.send(req, true, cnsl)?;
        Ok(decode::contest_creation(status, &body))
    }
}
