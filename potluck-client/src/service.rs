use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    api::{self, NewComment, RecipeId},
    Error,
};

/// The remote store holding the comments of every recipe
#[async_trait]
pub trait CommentService {
    async fn list(&self, recipe: RecipeId) -> Result<Vec<api::Comment>, Error>;

    async fn create(&self, recipe: RecipeId, comment: &NewComment) -> Result<api::Comment, Error>;
}

#[async_trait]
impl<T: CommentService + Send + Sync + ?Sized> CommentService for Arc<T> {
    async fn list(&self, recipe: RecipeId) -> Result<Vec<api::Comment>, Error> {
        (**self).list(recipe).await
    }

    async fn create(&self, recipe: RecipeId, comment: &NewComment) -> Result<api::Comment, Error> {
        (**self).create(recipe, comment).await
    }
}
