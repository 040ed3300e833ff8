use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use potluck_client::{
    api::{self, AuthToken, CommentId, Error, NewComment, RecipeId, Time, User, UserId},
    CommentService, CredentialStore,
};

/// In-memory stand-in for the recipe API's comment endpoints
pub struct MockServer(Mutex<State>);

#[derive(Debug, Default)]
struct State {
    sessions: HashMap<AuthToken, User>,
    recipes: BTreeMap<RecipeId, Vec<api::Comment>>,
    last_user: i64,
    last_comment: i64,
    last_date: Option<Time>,
    requests: usize,
    offline: bool,
    fail_next: usize,
}

impl State {
    // Strictly increasing, so comments created in a row never share a timestamp
    fn now(&mut self) -> Time {
        let mut now = Utc::now();
        if let Some(last) = self.last_date {
            if now <= last {
                now = last + chrono::Duration::microseconds(1);
            }
        }
        self.last_date = Some(now);
        now
    }

    fn resolve(&self, tok: Option<&AuthToken>) -> Result<&User, Error> {
        tok.and_then(|t| self.sessions.get(t))
            .ok_or(Error::Unauthorized)
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(Mutex::new(State::default()))
    }

    pub fn add_recipe(&self, recipe: RecipeId) {
        self.0.lock().recipes.entry(recipe).or_default();
    }

    /// Creates a user and returns a session token for them
    pub fn add_user(&self, username: &str) -> AuthToken {
        let mut state = self.0.lock();
        state.last_user += 1;
        let user = User {
            id: UserId(state.last_user),
            username: String::from(username),
        };
        let tok = AuthToken(format!("token-{}", state.last_user));
        state.sessions.insert(tok.clone(), user);
        tok
    }

    pub fn revoke(&self, tok: &AuthToken) {
        self.0.lock().sessions.remove(tok);
    }

    /// Stores a comment as-is, bypassing all validation
    pub fn insert_comment(&self, recipe: RecipeId, comment: api::Comment) {
        let mut state = self.0.lock();
        state.last_comment = state.last_comment.max(comment.id.0);
        state.recipes.entry(recipe).or_default().push(comment);
    }

    pub fn list_comments(&self, recipe: RecipeId) -> Result<Vec<api::Comment>, Error> {
        self.0
            .lock()
            .recipes
            .get(&recipe)
            .cloned()
            .ok_or(Error::RecipeNotFound(recipe))
    }

    pub fn create_comment(
        &self,
        tok: Option<&AuthToken>,
        recipe: RecipeId,
        c: NewComment,
    ) -> Result<api::Comment, Error> {
        let mut state = self.0.lock();
        let author = state.resolve(tok)?.clone();
        c.validate()?;
        let comments = state
            .recipes
            .get(&recipe)
            .ok_or(Error::RecipeNotFound(recipe))?;
        if let Some(parent) = c.parent_id {
            if !comments.iter().any(|other| other.id == parent) {
                return Err(Error::ParentNotFound(parent));
            }
        }
        state.last_comment += 1;
        let date = state.now();
        let comment = api::Comment {
            id: CommentId(state.last_comment),
            recipe_id: Some(recipe),
            content: c.content.trim().to_string(),
            created_at: api::format_time(&date),
            parent_id: c.parent_id,
            user_id: Some(author.id),
            username: Some(author.username),
        };
        state
            .recipes
            .get_mut(&recipe)
            .expect("recipe checked above")
            .push(comment.clone());
        Ok(comment)
    }

    /// While offline, every request fails with a network error
    pub fn set_offline(&self, offline: bool) {
        self.0.lock().offline = offline;
    }

    /// Makes the next `n` requests fail with a network error
    pub fn fail_next_requests(&self, n: usize) {
        self.0.lock().fail_next = n;
    }

    /// Return the number of requests received over the network so far
    pub fn test_num_requests(&self) -> usize {
        self.0.lock().requests
    }

    /// Return the stored comments of `recipe`, or nothing if it does not exist
    pub fn test_comments(&self, recipe: RecipeId) -> Vec<api::Comment> {
        self.list_comments(recipe).unwrap_or_default()
    }

    fn receive_request(&self) -> Result<(), potluck_client::Error> {
        let mut state = self.0.lock();
        state.requests += 1;
        if state.offline {
            return Err(network_error());
        }
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(network_error());
        }
        Ok(())
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

fn network_error() -> potluck_client::Error {
    potluck_client::Error::Network(String::from("Could not reach the server"))
}

/// `CommentService` backed by a `MockServer`, as seen through the network
pub struct MockService {
    server: Arc<MockServer>,
    credentials: Arc<dyn CredentialStore>,
}

impl MockService {
    pub fn new(server: Arc<MockServer>, credentials: Arc<dyn CredentialStore>) -> MockService {
        MockService {
            server,
            credentials,
        }
    }
}

#[async_trait]
impl CommentService for MockService {
    async fn list(&self, recipe: RecipeId) -> Result<Vec<api::Comment>, potluck_client::Error> {
        // let other tasks run, like a real request would
        tokio::task::yield_now().await;
        self.server.receive_request()?;
        Ok(self.server.list_comments(recipe)?)
    }

    async fn create(
        &self,
        recipe: RecipeId,
        comment: &NewComment,
    ) -> Result<api::Comment, potluck_client::Error> {
        let tok = self.credentials.access_token();
        tokio::task::yield_now().await;
        self.server.receive_request()?;
        tracing::trace!(%recipe, "mock server received comment");
        Ok(self
            .server
            .create_comment(tok.as_ref(), recipe, comment.clone())?)
    }
}
