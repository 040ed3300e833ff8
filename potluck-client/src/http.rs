use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    api::{self, NewComment, RecipeId, RefreshedToken, TokenRefresh},
    CommentService, Config, CredentialStore, Error,
};

/// Talks to the recipe API over HTTP
pub struct HttpCommentService {
    client: reqwest::Client,
    host: String,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpCommentService {
    pub fn new(config: &Config, credentials: Arc<dyn CredentialStore>) -> HttpCommentService {
        HttpCommentService {
            client: reqwest::Client::new(),
            host: config.host.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn comments_url(&self, recipe: RecipeId) -> String {
        format!("{}/api/recipes/recipe/{}/comments/", self.host, recipe)
    }

    fn refresh_url(&self) -> String {
        format!("{}/api/user/token/refresh/", self.host)
    }

    async fn send_create(
        &self,
        recipe: RecipeId,
        comment: &NewComment,
    ) -> Result<reqwest::Response, Error> {
        let token = self
            .credentials
            .access_token()
            .ok_or(Error::Unauthenticated)?;
        self.client
            .post(self.comments_url(recipe))
            .bearer_auth(token.as_str())
            .json(comment)
            .send()
            .await
            .map_err(Error::from_reqwest)
    }

    /// Trades the refresh token for a new access token
    async fn refresh(&self) -> Result<(), Error> {
        let refresh = self
            .credentials
            .refresh_token()
            .ok_or(Error::SessionExpired)?;
        let resp = self
            .client
            .post(self.refresh_url())
            .json(&TokenRefresh { refresh })
            .send()
            .await
            .map_err(Error::from_reqwest)?;
        if !resp.status().is_success() {
            tracing::info!(status = ?resp.status(), "token refresh refused");
            self.credentials.set_access_token(None);
            return Err(Error::SessionExpired);
        }
        let RefreshedToken { access } = resp.json().await.map_err(Error::from_reqwest)?;
        self.credentials.set_access_token(Some(access));
        tracing::debug!("refreshed access token");
        Ok(())
    }
}

async fn parse_response<R>(resp: reqwest::Response) -> Result<R, Error>
where
    R: for<'de> serde::Deserialize<'de>,
{
    let status = resp.status();
    if status.is_success() {
        return resp.json().await.map_err(Error::from_reqwest);
    }
    let body = resp.bytes().await.map_err(Error::from_reqwest)?;
    match api::Error::parse(status, &body) {
        Ok(err) => Err(Error::Api(err)),
        Err(err) => {
            tracing::warn!(?status, ?err, "failed parsing error answer");
            Err(Error::Network(format!("The server answered {status}")))
        }
    }
}

#[async_trait]
impl CommentService for HttpCommentService {
    async fn list(&self, recipe: RecipeId) -> Result<Vec<api::Comment>, Error> {
        let resp = self
            .client
            .get(self.comments_url(recipe))
            .send()
            .await
            .map_err(Error::from_reqwest)?;
        parse_response(resp).await
    }

    async fn create(&self, recipe: RecipeId, comment: &NewComment) -> Result<api::Comment, Error> {
        let mut resp = self.send_create(recipe, comment).await?;
        if resp.status() == StatusCode::UNAUTHORIZED && self.credentials.refresh_token().is_some() {
            self.refresh().await?;
            resp = self.send_create(recipe, comment).await?;
        }
        parse_response(resp).await
    }
}
