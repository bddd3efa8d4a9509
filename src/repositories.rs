use crate::{
    domain::{BookmarkRepository, ForumRpc, SessionStore},
    errors::RepoError,
    models::{Author, BookmarkedPost, Post, Viewer},
};
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client as DynamoDbClient};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{self, info};
use uuid::Uuid;

pub const SESSIONS_TABLE: &str = "sessions";
pub const BOOKMARKS_TABLE: &str = "bookmark";
pub const POSTS_TABLE: &str = "forums";
pub const USERS_TABLE: &str = "users";

// --- Sessions ---

#[derive(Debug, Clone)]
pub struct DynamoDbSessionStore {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoDbSessionStore {
    pub fn new(client: DynamoDbClient) -> Self {
        info!(table_name = SESSIONS_TABLE, "Initializing DynamoDbSessionStore");
        Self {
            client,
            table_name: SESSIONS_TABLE.to_string(),
        }
    }
}

#[async_trait]
impl SessionStore for DynamoDbSessionStore {
    /// Looks up a session token with GetItem. An unknown token is Ok(None),
    /// not an error.
    async fn resolve(&self, token: &str) -> Result<Option<Viewer>, RepoError> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("token", AttributeValue::S(token.to_string()))
            .send()
            .await
            .context(format!(
                "DynamoDB (table: {}): Failed to get session",
                self.table_name
            ))
            .map_err(RepoError::BackendError)?;

        match resp.item {
            Some(item) => match item_to_viewer(&item) {
                Some(viewer) => Ok(Some(viewer)),
                None => {
                    tracing::error!(table_name = %self.table_name, "DynamoDB: Retrieved session item but failed to parse into Viewer");
                    Err(RepoError::DataCorruption(format!(
                        "Failed to parse session data retrieved from DynamoDB table '{}'",
                        self.table_name
                    )))
                }
            },
            None => Ok(None),
        }
    }
}

// --- Bookmarks ---

#[derive(Debug, Clone)]
pub struct DynamoDbBookmarkRepository {
    client: DynamoDbClient,
    bookmarks_table: String,
    posts_table: String,
    users_table: String,
}

impl DynamoDbBookmarkRepository {
    pub fn new(client: DynamoDbClient) -> Self {
        info!(
            bookmarks_table = BOOKMARKS_TABLE,
            posts_table = POSTS_TABLE,
            users_table = USERS_TABLE,
            "Initializing DynamoDbBookmarkRepository"
        );
        Self {
            client,
            bookmarks_table: BOOKMARKS_TABLE.to_string(),
            posts_table: POSTS_TABLE.to_string(),
            users_table: USERS_TABLE.to_string(),
        }
    }

    /// Fetches all bookmark rows for one user, following pagination.
    async fn query_bookmark_rows(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<HashMap<String, AttributeValue>>, RepoError> {
        let mut rows = Vec::new();
        let mut last_evaluated_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let mut request_builder = self
                .client
                .query()
                .table_name(&self.bookmarks_table)
                .key_condition_expression("user_id = :uid")
                .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()));

            if let Some(lek) = last_evaluated_key {
                request_builder = request_builder.set_exclusive_start_key(Some(lek));
            }

            let resp = request_builder
                .send()
                .await
                .context(format!(
                    "DynamoDB: Failed to query bookmarks in table '{}'",
                    self.bookmarks_table
                ))
                .map_err(RepoError::BackendError)?;

            if let Some(items) = resp.items {
                tracing::debug!(
                    "DynamoDB Query (table: {}): Returned {} items",
                    self.bookmarks_table,
                    items.len()
                );
                rows.extend(items);
            }

            last_evaluated_key = resp.last_evaluated_key;
            if last_evaluated_key.is_none() {
                break;
            }
        }

        Ok(rows)
    }

    async fn fetch_post(&self, post_id: Uuid) -> Result<Option<Post>, RepoError> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.posts_table)
            .key("forum_id", AttributeValue::S(post_id.to_string()))
            .send()
            .await
            .context(format!(
                "DynamoDB (table: {}): Failed to get post (id: {})",
                self.posts_table, post_id
            ))
            .map_err(RepoError::BackendError)?;

        match resp.item {
            Some(item) => match item_to_post(&item) {
                Some(post) => Ok(Some(post)),
                None => {
                    tracing::error!(post_id = %post_id, table_name = %self.posts_table, "DynamoDB: Retrieved item but failed to parse into Post");
                    Err(RepoError::DataCorruption(format!(
                        "Failed to parse post data retrieved from DynamoDB table '{}' for id {}",
                        self.posts_table, post_id
                    )))
                }
            },
            None => Ok(None),
        }
    }

    async fn fetch_author(&self, author_id: Uuid) -> Result<Option<Author>, RepoError> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.users_table)
            .key("user_id", AttributeValue::S(author_id.to_string()))
            .send()
            .await
            .context(format!(
                "DynamoDB (table: {}): Failed to get author (id: {})",
                self.users_table, author_id
            ))
            .map_err(RepoError::BackendError)?;

        // A missing or unparseable author is not fatal; the card renders a
        // fallback name instead.
        Ok(resp.item.as_ref().and_then(item_to_author))
    }
}

#[async_trait]
impl BookmarkRepository for DynamoDbBookmarkRepository {
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BookmarkedPost>, RepoError> {
        let rows = self.query_bookmark_rows(user_id).await?;

        let mut author_cache: HashMap<Uuid, Option<Author>> = HashMap::new();
        let mut bookmarks = Vec::with_capacity(rows.len());

        for row in rows {
            let Some((post_id, bookmarked_at)) = item_to_bookmark_row(&row) else {
                tracing::error!(user_id = %user_id, table_name = %self.bookmarks_table, "DynamoDB: Failed to parse bookmark row");
                return Err(RepoError::DataCorruption(format!(
                    "Failed to parse bookmark row from DynamoDB table '{}' for user {}",
                    self.bookmarks_table, user_id
                )));
            };

            // Bookmarks whose post is gone entirely just drop out of the list;
            // only posts past their delete date feed the cleanup path.
            let Some(post) = self.fetch_post(post_id).await? else {
                tracing::debug!(%post_id, "Bookmarked post no longer exists, skipping");
                continue;
            };

            let author = match author_cache.get(&post.author_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.fetch_author(post.author_id).await?;
                    author_cache.insert(post.author_id, fetched.clone());
                    fetched
                }
            };

            bookmarks.push(BookmarkedPost {
                post,
                author,
                bookmarked_at,
            });
        }

        // The page is supposed to list newest bookmarks first, but the sort
        // option upstream never actually took effect (misspelled key), so
        // readers have always seen ascending bookmark time. Kept that way on
        // purpose; flipping it silently would reshuffle every page boundary.
        bookmarks.sort_by_key(|b| b.bookmarked_at);

        tracing::info!(
            "DynamoDB (table: {}): Successfully listed {} bookmarks for user {}",
            self.bookmarks_table,
            bookmarks.len(),
            user_id
        );
        Ok(bookmarks)
    }

    /// Removes bookmark rows by (user, post). DeleteItem succeeds even when a
    /// row is already gone, which suits the best-effort cleanup caller.
    async fn remove(&self, user_id: Uuid, post_ids: &[Uuid]) -> Result<(), RepoError> {
        for post_id in post_ids {
            tracing::debug!(%user_id, %post_id, table_name = %self.bookmarks_table, "DynamoDB: Deleting bookmark row");
            self.client
                .delete_item()
                .table_name(&self.bookmarks_table)
                .key("user_id", AttributeValue::S(user_id.to_string()))
                .key("post_id", AttributeValue::S(post_id.to_string()))
                .send()
                .await
                .context(format!(
                    "DynamoDB (table: {}): Failed to delete bookmark (user: {}, post: {})",
                    self.bookmarks_table, user_id, post_id
                ))
                .map_err(RepoError::BackendError)?;
        }
        Ok(())
    }
}

// --- Post deletion procedure ---

/// Backend procedure that removes a post and its related data. Image URLs
/// live on the post item itself, so deleting the item takes them with it;
/// bookmark rows pointing at the dead post drop out of the page on the next
/// fetch.
#[derive(Debug, Clone)]
pub struct DynamoDbForumRpc {
    client: DynamoDbClient,
    posts_table: String,
}

impl DynamoDbForumRpc {
    pub fn new(client: DynamoDbClient) -> Self {
        info!(posts_table = POSTS_TABLE, "Initializing DynamoDbForumRpc");
        Self {
            client,
            posts_table: POSTS_TABLE.to_string(),
        }
    }
}

#[async_trait]
impl ForumRpc for DynamoDbForumRpc {
    async fn delete_post_with_related(&self, post_id: Uuid) -> Result<(), RepoError> {
        tracing::debug!(%post_id, table_name = %self.posts_table, "DynamoDB: Deleting post");
        self.client
            .delete_item()
            .table_name(&self.posts_table)
            .key("forum_id", AttributeValue::S(post_id.to_string()))
            .send()
            .await
            .context(format!(
                "DynamoDB (table: {}): Failed to delete post (id: {})",
                self.posts_table, post_id
            ))
            .map_err(RepoError::BackendError)?;
        tracing::debug!(%post_id, table_name = %self.posts_table, "DynamoDB: Delete request sent");
        Ok(())
    }
}

// --- Item parsing helpers ---

fn parse_timestamp(value: &AttributeValue) -> Option<DateTime<Utc>> {
    let raw = value.as_s().ok()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn item_to_viewer(item: &HashMap<String, AttributeValue>) -> Option<Viewer> {
    let user_id = item
        .get("user_id")?
        .as_s()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let premium_flag = *item.get("premium_flag")?.as_bool().ok()?;
    Some(Viewer {
        user_id,
        premium_flag,
    })
}

fn item_to_bookmark_row(item: &HashMap<String, AttributeValue>) -> Option<(Uuid, DateTime<Utc>)> {
    let post_id = item
        .get("post_id")?
        .as_s()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let created_at = parse_timestamp(item.get("created_at")?)?;
    Some((post_id, created_at))
}

fn item_to_post(item: &HashMap<String, AttributeValue>) -> Option<Post> {
    let post_id = item
        .get("forum_id")?
        .as_s()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let title = item.get("title")?.as_s().ok()?.to_string();
    let text = item.get("text")?.as_s().ok()?.to_string();
    let created_at = parse_timestamp(item.get("created_at")?)?;
    // delete_date is optional; when present it must parse.
    let delete_date = match item.get("delete_date") {
        Some(value) => Some(parse_timestamp(value)?),
        None => None,
    };
    let author_id = item
        .get("user_id_auth")?
        .as_s()
        .ok()
        .and_then(|s| Uuid::parse_str(s).ok())?;
    let image_urls = match item.get("image_urls") {
        Some(value) => value
            .as_l()
            .ok()?
            .iter()
            .map(|v| v.as_s().ok().map(|s| s.to_string()))
            .collect::<Option<Vec<_>>>()?,
        None => Vec::new(),
    };

    Some(Post {
        post_id,
        title,
        text,
        created_at,
        delete_date,
        author_id,
        image_urls,
    })
}

fn item_to_author(item: &HashMap<String, AttributeValue>) -> Option<Author> {
    let user_name = item.get("user_name")?.as_s().ok()?.to_string();
    let premium_flag = *item.get("premium_flag")?.as_bool().ok()?;
    Some(Author {
        user_name,
        premium_flag,
    })
}
