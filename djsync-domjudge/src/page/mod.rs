use djsync_util::error::SyncError;
use djsync_util::model::RemoteOutcome;
use djsync_util::service::scrape::GetHtml;
use djsync_util::service::Session;
use reqwest::StatusCode;
use scraper::Html;

use crate::{Console, Result};

mod categories;
mod contest_add;
mod listing;
mod login;

pub use categories::{CategoriesPage, CategoriesPageBuilder};
pub use contest_add::{ContestAddPage, ContestAddPageBuilder};
pub use listing::{ListingPage, ListingPageBuilder};
pub use login::{LoginPage, LoginPageBuilder};

/// Pages under `/jury`, which redirect to the login form without a valid session.
pub trait GetHtmlJury: GetHtml {
    fn get_html_jury(&self, session: &mut Session, cnsl: &mut Console) -> Result<Html> {
        let (status, html) = self.get_html(session, cnsl)?;
        match status {
            StatusCode::OK => Ok(html),
            status if status.is_redirection() => Err(SyncError::Authentication {
                judge: self.url()?.to_string(),
                message: "User not logged in".into(),
            }
            .into()),
            _ => Err(SyncError::Remote {
                operation: "Fetch".into(),
                resource: self.url()?.to_string(),
                outcome: RemoteOutcome::rejected(status.as_u16(), ""),
            }
            .into()),
        }
    }
}
