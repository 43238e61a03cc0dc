//! Conflict resolution between a freshly fetched post and its stored state.

use crate::post::{NewPost, Post};

/// What a merge did to the stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No stored row existed; the candidate becomes the stored state as-is.
    Inserted,
    /// At least one mutable field changed and the version was bumped.
    Updated,
    /// Re-ingestion of identical data; the stored state is untouched.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub post: Post,
    pub outcome: MergeOutcome,
}

/// Merge `candidate` into `stored` (if any).
///
/// Engagement metrics and display fields are last-write-wins. `id`, `name`,
/// `created_at`, the origin metadata and `category` keep their stored values.
/// `dual_category` becomes true once the post is observed under a category
/// other than the stored one and never reverts. `version` is bumped only when
/// something actually changed, so re-applying the same candidate is a no-op.
#[must_use]
pub fn merge_post(stored: Option<&Post>, candidate: NewPost) -> Merged {
    let Some(stored) = stored else {
        return Merged {
            post: Post::from_new(candidate),
            outcome: MergeOutcome::Inserted,
        };
    };

    // controversial -> top and top -> controversial both differ, so inequality
    // covers both directions.
    let dual_category = stored.dual_category || stored.category != candidate.category;

    let mut post = stored.clone();
    post.permalink = candidate.permalink;
    post.title = candidate.title;
    post.body = candidate.body;
    post.score = candidate.score;
    post.upvote_ratio = candidate.upvote_ratio;
    post.num_comments = candidate.num_comments;
    post.dual_category = dual_category;

    if mutable_fields_equal(stored, &post) {
        return Merged {
            post: stored.clone(),
            outcome: MergeOutcome::Unchanged,
        };
    }

    post.version = stored.version.saturating_add(1);
    Merged {
        post,
        outcome: MergeOutcome::Updated,
    }
}

fn mutable_fields_equal(a: &Post, b: &Post) -> bool {
    a.permalink == b.permalink
        && a.title == b.title
        && a.body == b.body
        && a.score == b.score
        && a.upvote_ratio.to_bits() == b.upvote_ratio.to_bits()
        && a.num_comments == b.num_comments
        && a.dual_category == b.dual_category
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::post::fixtures::new_post;
    use crate::post::{Category, INITIAL_VERSION};

    fn ingest(stored: Option<&Post>, candidate: NewPost) -> Post {
        merge_post(stored, candidate).post
    }

    #[test]
    fn missing_row_is_inserted_as_is() {
        let merged = merge_post(None, new_post("p1", Category::Top));
        assert_eq!(merged.outcome, MergeOutcome::Inserted);
        assert_eq!(merged.post, Post::from_new(new_post("p1", Category::Top)));
    }

    #[test]
    fn identical_reingestion_is_unchanged() {
        let first = ingest(None, new_post("p1", Category::Top));
        let merged = merge_post(Some(&first), new_post("p1", Category::Top));

        assert_eq!(merged.outcome, MergeOutcome::Unchanged);
        assert_eq!(merged.post, first);
        assert_eq!(merged.post.version, INITIAL_VERSION);
    }

    #[test]
    fn applying_same_update_twice_is_idempotent() {
        let first = ingest(None, new_post("p1", Category::Top));
        let mut bumped = new_post("p1", Category::Top);
        bumped.score = 250;
        bumped.num_comments = 40;

        let second = ingest(Some(&first), bumped.clone());
        let third = merge_post(Some(&second), bumped);

        assert_eq!(third.outcome, MergeOutcome::Unchanged);
        assert_eq!(third.post, second);
        assert_eq!(second.version, INITIAL_VERSION + 1);
    }

    #[test]
    fn engagement_and_display_fields_are_last_write_wins() {
        let first = ingest(None, new_post("p1", Category::Top));
        let mut candidate = new_post("p1", Category::Top);
        candidate.score = 512;
        candidate.upvote_ratio = 0.75;
        candidate.num_comments = 99;
        candidate.title = "Edited title".to_string();
        candidate.body = "Edited body".to_string();
        candidate.permalink = "/r/kollywood/comments/p1/edited/".to_string();

        let merged = merge_post(Some(&first), candidate);
        assert_eq!(merged.outcome, MergeOutcome::Updated);
        assert_eq!(merged.post.score, 512);
        assert!((merged.post.upvote_ratio - 0.75).abs() < f64::EPSILON);
        assert_eq!(merged.post.num_comments, 99);
        assert_eq!(merged.post.title, "Edited title");
        assert_eq!(merged.post.body, "Edited body");
        assert_eq!(merged.post.permalink, "/r/kollywood/comments/p1/edited/");
    }

    #[test]
    fn identity_and_creation_time_are_never_overwritten() {
        let first = ingest(None, new_post("p1", Category::Top));
        let mut candidate = new_post("p1", Category::Top);
        candidate.name = "t3_other".to_string();
        candidate.created_at = Utc::now() - Duration::days(3);
        candidate.score = 1;

        let merged = ingest(Some(&first), candidate);
        assert_eq!(merged.name, first.name);
        assert_eq!(merged.created_at, first.created_at);
    }

    #[test]
    fn controversial_then_top_sets_dual_category() {
        let first = ingest(None, new_post("p1", Category::Controversial));
        let second = ingest(Some(&first), new_post("p1", Category::Top));

        assert!(second.dual_category);
        assert_eq!(second.category, Category::Controversial);
        assert_eq!(second.version, INITIAL_VERSION + 1);
    }

    #[test]
    fn top_then_controversial_sets_dual_category() {
        let first = ingest(None, new_post("p1", Category::Top));
        let second = ingest(Some(&first), new_post("p1", Category::Controversial));

        assert!(second.dual_category);
        assert_eq!(second.category, Category::Top);
    }

    #[test]
    fn top_then_top_leaves_dual_category_false() {
        let first = ingest(None, new_post("p1", Category::Top));
        let second = ingest(Some(&first), new_post("p1", Category::Top));
        assert!(!second.dual_category);
    }

    #[test]
    fn dual_category_is_monotonic_across_sequences() {
        let sequence = [
            Category::Top,
            Category::Controversial,
            Category::Top,
            Category::Top,
            Category::Controversial,
        ];

        let mut stored: Option<Post> = None;
        let mut seen_dual = false;
        for category in sequence {
            let next = ingest(stored.as_ref(), new_post("p1", category));
            if seen_dual {
                assert!(next.dual_category, "dual_category reverted after {category}");
            }
            seen_dual |= next.dual_category;
            stored = Some(next);
        }
        assert!(seen_dual);
    }
}
