//! HTML fragment rendering for the bookmarks page. Everything user-supplied
//! goes through `escape_html` before it is spliced into markup.

use chrono::{DateTime, Utc};

use crate::models::{BookmarkedPost, Viewer};
use crate::pagination::PageSlice;

/// Body text is cut down to this many characters on the card.
const BODY_PREVIEW_CHARS: usize = 50;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Converts newlines in already-escaped text to `<br>` tags.
fn nl2br(escaped: &str) -> String {
    escaped.replace("\r\n", "<br>").replace('\n', "<br>")
}

/// Truncates to a character budget, appending an ellipsis when text was cut.
/// Character-based so multi-byte text never gets split mid-glyph.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// "posted N minutes ago" style string for the card header.
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - created_at;
    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{} ago", plural(elapsed.num_minutes(), "minute"))
    } else if elapsed.num_hours() < 24 {
        format!("{} ago", plural(elapsed.num_hours(), "hour"))
    } else {
        format!("{} ago", plural(elapsed.num_days(), "day"))
    }
}

/// Remaining-lifetime string for a post's delete date.
pub fn time_left(delete_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(deadline) = delete_date else {
        return "never expires".to_string();
    };
    let left = deadline - now;
    if left.num_seconds() <= 0 {
        "expired".to_string()
    } else if left.num_days() >= 1 {
        format!("expires in {}", plural(left.num_days(), "day"))
    } else if left.num_hours() >= 1 {
        format!("expires in {}", plural(left.num_hours(), "hour"))
    } else if left.num_minutes() >= 1 {
        format!("expires in {}", plural(left.num_minutes(), "minute"))
    } else {
        "expires in less than a minute".to_string()
    }
}

/// Renders one bookmarked post as an article card. Edit/delete controls only
/// show up when the viewer owns the post; the delete form carries the confirm
/// dialog so the server side never deletes without the user's say-so.
pub fn render_post(viewer: &Viewer, item: &BookmarkedPost, now: DateTime<Utc>) -> String {
    let post = &item.post;

    let thumbnail_html = match post.image_urls.first() {
        Some(url) => format!(
            r#"<div class="post-item-thumbnail"><img src="{}" alt="thumbnail"></div>"#,
            escape_html(url)
        ),
        None => String::new(),
    };

    let premium_icon_html = match &item.author {
        Some(author) if author.premium_flag => {
            r#" <img src="/assets/premium-badge.svg" class="premium-badge" alt="premium">"#
        }
        _ => "",
    };
    let author_name = item
        .author
        .as_ref()
        .map(|a| escape_html(&a.user_name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let actions_html = if viewer.user_id == post.author_id {
        format!(
            concat!(
                r#"<div class="post-item-actions">"#,
                r#"<a href="/posts/{id}/edit" class="action-button edit-button">Edit</a>"#,
                r#"<form method="post" action="/posts/{id}/delete" "#,
                r#"onsubmit="return confirm('Really delete this post?');">"#,
                r#"<button type="submit" class="action-button delete-button" data-post-id="{id}">Delete</button>"#,
                r#"</form></div>"#,
            ),
            id = post.post_id
        )
    } else {
        String::new()
    };

    let body_preview = nl2br(&escape_html(&truncate_chars(&post.text, BODY_PREVIEW_CHARS)));
    let main_class = if thumbnail_html.is_empty() {
        "post-item-main"
    } else {
        "post-item-main has-thumbnail"
    };

    format!(
        concat!(
            r#"<article class="post-item">"#,
            r#"<a href="/posts/{id}" class="post-item-link">"#,
            r#"<div class="{main_class}">"#,
            r#"<div class="post-item-content">"#,
            r#"<h3>{title} <small style="color:gray;">{time_ago}</small></h3>"#,
            "<p>{body}</p>",
            "<small>posted by: {author}{premium_icon}</small>",
            "<br>",
            r#"<small style="color:gray;">{time_left}</small>"#,
            "</div></div></a>",
            "{thumbnail}{actions}",
            "</article>"
        ),
        id = post.post_id,
        main_class = main_class,
        title = escape_html(&post.title),
        time_ago = time_ago(post.created_at, now),
        body = body_preview,
        author = author_name,
        premium_icon = premium_icon_html,
        time_left = time_left(post.delete_date, now),
        thumbnail = thumbnail_html,
        actions = actions_html,
    )
}

/// Pagination strip: prev link, numbered links with the current page as plain
/// text, next link. Empty when everything fits on one page.
pub fn render_pagination(slice: &PageSlice) -> String {
    if slice.total_pages <= 1 {
        return String::new();
    }

    let mut html = String::new();
    if slice.page > 1 {
        html.push_str(&format!(r#"<a href="?page={}">&laquo; prev</a>"#, slice.page - 1));
    }
    for i in 1..=slice.total_pages {
        if i == slice.page {
            html.push_str(&format!(r#"<span class="current-page">{}</span>"#, i));
        } else {
            html.push_str(&format!(r#"<a href="?page={}">{}</a>"#, i, i));
        }
    }
    if slice.page < slice.total_pages {
        html.push_str(&format!(r#"<a href="?page={}">next &raquo;</a>"#, slice.page + 1));
    }
    html
}

pub fn empty_state() -> String {
    "<p>No bookmarked posts yet.</p>".to_string()
}

pub fn fetch_error_fragment() -> String {
    "<p>Something went wrong while loading your bookmarks.</p>".to_string()
}

/// Banner shown when expired bookmarks were swept out of the fetch result.
pub fn expired_notice() -> String {
    r#"<p class="notice">Some bookmarked posts had expired and were removed automatically.</p>"#
        .to_string()
}

/// Wraps the list and pagination fragments in the full page document.
pub fn page_shell(notice_html: &str, list_html: &str, pagination_html: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            r#"<html lang="en"><head><meta charset="utf-8">"#,
            "<title>Bookmarked posts</title></head><body><main>",
            "<h1>Bookmarked posts</h1>",
            "{notice}",
            r#"<div id="bookmarks-list">{list}</div>"#,
            r#"<div id="pagination-container">{pagination}</div>"#,
            "</main></body></html>"
        ),
        notice = notice_html,
        list = list_html,
        pagination = pagination_html,
    )
}

pub fn access_denied_page() -> String {
    concat!(
        "<!DOCTYPE html>\n",
        r#"<html lang="en"><head><meta charset="utf-8">"#,
        "<title>Access denied</title></head><body><main>",
        "<h1>Access denied</h1>",
        "<p>This feature is for premium members only.</p>",
        "</main></body></html>"
    )
    .to_string()
}

pub fn error_page(message: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            r#"<html lang="en"><head><meta charset="utf-8">"#,
            "<title>Error</title></head><body><main>",
            "<h1>Error</h1><p>{}</p>",
            "</main></body></html>"
        ),
        escape_html(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Post};
    use crate::pagination::{PageSlice, POSTS_PER_PAGE};
    use chrono::Duration;
    use uuid::Uuid;

    fn viewer(user_id: Uuid) -> Viewer {
        Viewer {
            user_id,
            premium_flag: true,
        }
    }

    fn item(author_id: Uuid, text: &str) -> BookmarkedPost {
        let now = Utc::now();
        BookmarkedPost {
            post: Post {
                post_id: Uuid::new_v4(),
                title: "A <title> & more".to_string(),
                text: text.to_string(),
                created_at: now - Duration::hours(2),
                delete_date: Some(now + Duration::days(3)),
                author_id,
                image_urls: vec![],
            },
            author: Some(Author {
                user_name: "alice".to_string(),
                premium_flag: false,
            }),
            bookmarked_at: now,
        }
    }

    #[test]
    fn owner_sees_edit_and_delete_controls() {
        let owner = Uuid::new_v4();
        let html = render_post(&viewer(owner), &item(owner, "hello"), Utc::now());
        assert!(html.contains("delete-button"));
        assert!(html.contains("edit-button"));
        assert!(html.contains("return confirm("));
    }

    #[test]
    fn non_owner_sees_no_controls() {
        let html = render_post(
            &viewer(Uuid::new_v4()),
            &item(Uuid::new_v4(), "hello"),
            Utc::now(),
        );
        assert!(!html.contains("delete-button"));
        assert!(!html.contains("edit-button"));
    }

    #[test]
    fn title_is_html_escaped() {
        let owner = Uuid::new_v4();
        let html = render_post(&viewer(owner), &item(owner, "hello"), Utc::now());
        assert!(html.contains("A &lt;title&gt; &amp; more"));
        assert!(!html.contains("A <title>"));
    }

    #[test]
    fn long_body_is_truncated_to_50_chars_with_ellipsis() {
        let owner = Uuid::new_v4();
        let long = "x".repeat(80);
        let html = render_post(&viewer(owner), &item(owner, &long), Utc::now());
        assert!(html.contains(&format!("{}...", "x".repeat(50))));
        assert!(!html.contains(&"x".repeat(51)));
    }

    #[test]
    fn short_body_is_left_alone() {
        assert_eq!(truncate_chars("short", 50), "short");
        // exactly at the limit: no ellipsis
        let exact = "y".repeat(50);
        assert_eq!(truncate_chars(&exact, 50), exact);
    }

    #[test]
    fn newlines_become_br_tags() {
        let owner = Uuid::new_v4();
        let html = render_post(&viewer(owner), &item(owner, "line one\nline two"), Utc::now());
        assert!(html.contains("line one<br>line two"));
    }

    #[test]
    fn premium_author_gets_a_badge_and_regular_author_does_not() {
        let owner = Uuid::new_v4();
        let mut it = item(owner, "hello");
        assert!(!render_post(&viewer(owner), &it, Utc::now()).contains("premium-badge"));
        it.author.as_mut().unwrap().premium_flag = true;
        assert!(render_post(&viewer(owner), &it, Utc::now()).contains("premium-badge"));
    }

    #[test]
    fn missing_author_falls_back_to_unknown() {
        let owner = Uuid::new_v4();
        let mut it = item(owner, "hello");
        it.author = None;
        let html = render_post(&viewer(owner), &it, Utc::now());
        assert!(html.contains("posted by: unknown"));
    }

    #[test]
    fn thumbnail_only_renders_when_an_image_exists() {
        let owner = Uuid::new_v4();
        let mut it = item(owner, "hello");
        let plain = render_post(&viewer(owner), &it, Utc::now());
        assert!(!plain.contains("post-item-thumbnail"));
        assert!(!plain.contains("has-thumbnail"));

        it.post.image_urls = vec!["https://img.example/p.png".to_string()];
        let with_thumb = render_post(&viewer(owner), &it, Utc::now());
        assert!(with_thumb.contains(r#"<img src="https://img.example/p.png""#));
        assert!(with_thumb.contains("has-thumbnail"));
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::seconds(30), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(time_ago(now - Duration::hours(1), now), "1 hour ago");
        assert_eq!(time_ago(now - Duration::days(3), now), "3 days ago");
    }

    #[test]
    fn time_left_buckets() {
        let now = Utc::now();
        assert_eq!(time_left(None, now), "never expires");
        assert_eq!(time_left(Some(now - Duration::hours(1)), now), "expired");
        assert_eq!(
            time_left(Some(now + Duration::days(2)), now),
            "expires in 2 days"
        );
        assert_eq!(
            time_left(Some(now + Duration::minutes(10)), now),
            "expires in 10 minutes"
        );
    }

    #[test]
    fn pagination_strip_for_25_items_on_page_3() {
        let slice = PageSlice::compute(25, 3, POSTS_PER_PAGE);
        let html = render_pagination(&slice);
        assert!(html.contains(r#"<a href="?page=2">&laquo; prev</a>"#));
        assert!(html.contains(r#"<a href="?page=1">1</a>"#));
        assert!(html.contains(r#"<a href="?page=2">2</a>"#));
        assert!(html.contains(r#"<span class="current-page">3</span>"#));
        assert!(!html.contains("next"));
    }

    #[test]
    fn pagination_strip_is_empty_for_a_single_page() {
        let slice = PageSlice::compute(7, 1, POSTS_PER_PAGE);
        assert_eq!(render_pagination(&slice), "");
    }

    #[test]
    fn middle_page_has_both_prev_and_next() {
        let slice = PageSlice::compute(25, 2, POSTS_PER_PAGE);
        let html = render_pagination(&slice);
        assert!(html.contains(r#"<a href="?page=1">&laquo; prev</a>"#));
        assert!(html.contains(r#"<a href="?page=3">next &raquo;</a>"#));
    }
}
