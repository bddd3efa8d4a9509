use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A forum post as fetched for the bookmarks page. Image URLs ride along so
/// the card renderer can pick a thumbnail without another round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub post_id: Uuid,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Time after which the post is treated as gone. `None` means the post
    /// never expires.
    pub delete_date: Option<DateTime<Utc>>,
    pub author_id: Uuid,
    pub image_urls: Vec<String>,
}

impl Post {
    /// A post is valid while its delete date is absent or still in the future.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        match self.delete_date {
            None => true,
            Some(deadline) => deadline > now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub user_name: String,
    pub premium_flag: bool,
}

/// One bookmark row joined with its post and author data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkedPost {
    pub post: Post,
    /// `None` when the author account no longer resolves.
    pub author: Option<Author>,
    pub bookmarked_at: DateTime<Utc>,
}

/// The session context of the requesting user, resolved up front and passed
/// explicitly to everything that needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewer {
    pub user_id: Uuid,
    pub premium_flag: bool,
}

/// Splits fetched bookmarks into posts that are still valid and the IDs of
/// posts that have passed their delete date. The expired IDs feed the
/// best-effort bookmark cleanup.
pub fn partition_by_expiry(
    items: Vec<BookmarkedPost>,
    now: DateTime<Utc>,
) -> (Vec<BookmarkedPost>, Vec<Uuid>) {
    let mut valid = Vec::with_capacity(items.len());
    let mut expired_ids = Vec::new();
    for item in items {
        if item.post.is_valid(now) {
            valid.push(item);
        } else {
            expired_ids.push(item.post.post_id);
        }
    }
    (valid, expired_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(delete_date: Option<DateTime<Utc>>) -> Post {
        Post {
            post_id: Uuid::new_v4(),
            title: "title".to_string(),
            text: "text".to_string(),
            created_at: Utc::now(),
            delete_date,
            author_id: Uuid::new_v4(),
            image_urls: vec![],
        }
    }

    fn bookmarked(delete_date: Option<DateTime<Utc>>) -> BookmarkedPost {
        BookmarkedPost {
            post: post(delete_date),
            author: None,
            bookmarked_at: Utc::now(),
        }
    }

    #[test]
    fn post_without_delete_date_is_always_valid() {
        let now = Utc::now();
        assert!(post(None).is_valid(now));
    }

    #[test]
    fn post_with_future_delete_date_is_valid() {
        let now = Utc::now();
        assert!(post(Some(now + Duration::hours(1))).is_valid(now));
    }

    #[test]
    fn post_past_its_delete_date_is_invalid() {
        let now = Utc::now();
        assert!(!post(Some(now - Duration::seconds(1))).is_valid(now));
        // A delete date of exactly now counts as expired too.
        assert!(!post(Some(now)).is_valid(now));
    }

    #[test]
    fn partition_separates_expired_ids_from_valid_posts() {
        let now = Utc::now();
        let keep = bookmarked(None);
        let keep_later = bookmarked(Some(now + Duration::days(1)));
        let gone = bookmarked(Some(now - Duration::days(1)));
        let gone_id = gone.post.post_id;

        let (valid, expired) =
            partition_by_expiry(vec![keep.clone(), gone, keep_later.clone()], now);

        assert_eq!(
            valid.iter().map(|b| b.post.post_id).collect::<Vec<_>>(),
            vec![keep.post.post_id, keep_later.post.post_id]
        );
        assert_eq!(expired, vec![gone_id]);
    }

    #[test]
    fn partition_of_empty_input_is_empty() {
        let (valid, expired) = partition_by_expiry(vec![], Utc::now());
        assert!(valid.is_empty());
        assert!(expired.is_empty());
    }
}
