use std::convert::TryFrom as _;

use cookie::Cookie as RawCookie;
use cookie_store::CookieStore;
use reqwest::blocking::{Request, Response};
use reqwest::header::{HeaderValue, COOKIE, SET_COOKIE};

use crate::Result;

/// Cookies of one run. Kept in memory only, a new run logs in again.
#[derive(Debug, Default)]
pub struct CookieStorage {
    store: CookieStore,
}

impl CookieStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_into(&self, request: &mut Request) -> Result<()> {
        let url = request.url();
        let cookies = self
            .store
            .get_request_cookies(url)
            .map(|rc| rc.encoded().to_string())
            .collect::<Vec<_>>();
        for cookie in cookies {
            request
                .headers_mut()
                .append(COOKIE, HeaderValue::try_from(cookie)?);
        }
        Ok(())
    }

    pub fn store_from(&mut self, response: &Response) {
        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|val| {
                val.to_str()
                    .ok()
                    .and_then(|cookie_str| RawCookie::parse(cookie_str.to_owned()).ok())
            });
        let url = response.url();
        self.store.store_response_cookies(cookies, url);
    }
}
