use std::io::Write as _;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::blocking::{Client, ClientBuilder, Request, RequestBuilder, Response};
use reqwest::redirect::Policy;
use reqwest::Method;

use crate::console::{sty_g, sty_r};
use crate::error::SyncError;
use crate::service::{CookieStorage, ResponseExt as _};
use crate::{Console, Error, Result};

static USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "-",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CARGO_PKG_REPOSITORY"),
    ")"
);

static REDIRECT_LIMIT: usize = 10;

/// Http client plus the cookies of one run.
#[derive(Debug)]
pub struct Session {
    client: Client,
    cookies: CookieStorage,
}

impl Session {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Self::client_builder(timeout)
            .build()
            .context("Could not setup http client")?;
        Ok(Self {
            client,
            cookies: CookieStorage::new(),
        })
    }

    fn client_builder(timeout: Duration) -> ClientBuilder {
        Client::builder()
            .referer(false)
            .redirect(Policy::none()) // redirects manually to keep cookies along the way
            .user_agent(USER_AGENT)
            .timeout(timeout)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn exec_session(&mut self, mut request: Request) -> Result<Response> {
        self.cookies
            .load_into(&mut request)
            .context("Could not load cookies into request")?;
        let url = request.url().to_string();
        let response = self
            .client
            .execute(request)
            .map_err(|err| classify_network_error(&url, err))?;
        self.cookies.store_from(&response);
        Ok(response)
    }
}

/// Maps a transport failure, including a stalled body read, to `SyncError::Network`.
pub fn classify_network_error(url: &str, err: reqwest::Error) -> Error {
    let message = if err.is_timeout() {
        format!("request timed out ({})", err)
    } else if err.is_connect() {
        format!("could not connect ({})", err)
    } else {
        err.to_string()
    };
    SyncError::Network {
        url: url.to_owned(),
        message,
    }
    .into()
}

pub struct SessionRequestBuilder<'a> {
    inner: RequestBuilder,
    session: &'a mut Session,
    cnsl: &'a mut Console,
    follow_redirects: bool,
}

impl<'a> SessionRequestBuilder<'a> {
    /// Follows redirects with GET requests, as a browser does after a form post.
    pub fn follow_redirects(mut self, follow_redirects: bool) -> Self {
        self.follow_redirects = follow_redirects;
        self
    }

    pub fn send_pretty(self) -> Result<Response> {
        let Self {
            inner,
            session,
            cnsl,
            follow_redirects,
        } = self;
        let mut req = inner.build().context("Could not build request")?;
        for _ in 0..=REDIRECT_LIMIT {
            write!(cnsl, "{:7} {} ... ", req.method().as_str(), req.url()).unwrap_or(());
            tracing::debug!(method = %req.method(), url = %req.url(), "sending request");
            let result = session.exec_session(req);
            match &result {
                Ok(res) if res.status().is_client_error() || res.status().is_server_error() => {
                    writeln!(cnsl, "{}", sty_r(res.status()))
                }
                Ok(res) => writeln!(cnsl, "{}", sty_g(res.status())),
                Err(_) => writeln!(cnsl, "{}", sty_r("failed")),
            }
            .unwrap_or(());
            let res = result?;
            if !(follow_redirects && res.status().is_redirection()) {
                return Ok(res);
            }
            let location = res.location_url(res.url())?;
            tracing::debug!(%location, "following redirect");
            req = Request::new(Method::GET, location);
        }
        Err(Error::msg(format!(
            "Too many redirects (more than {})",
            REDIRECT_LIMIT
        )))
    }
}

pub trait WithSession {
    fn with_session<'a>(
        self,
        session: &'a mut Session,
        cnsl: &'a mut Console,
    ) -> SessionRequestBuilder<'a>;
}

impl WithSession for RequestBuilder {
    fn with_session<'a>(
        self,
        session: &'a mut Session,
        cnsl: &'a mut Console,
    ) -> SessionRequestBuilder<'a> {
        SessionRequestBuilder {
            inner: self,
            session,
            cnsl,
            follow_redirects: false,
        }
    }
}
