//! Leaderboard scoring over already-filtered candidate posts.

use bollytics_core::{Category, Post, RankCategory, RankedPost};
use bollytics_db::{CandidateFilter, CandidateOrder};

/// Maximum entries in any leaderboard.
pub const LEADERBOARD_SIZE: usize = 5;

/// Storage filter and ordering for each leaderboard.
///
/// The ordering mirrors [`category_score`], so the rows storage returns are
/// the leaders [`rank_posts`] would pick from the whole window.
///
/// Posts seen under both categories only ever appear under
/// `top_and_controversial`.
#[must_use]
pub fn candidate_filter(category: RankCategory) -> CandidateFilter {
    match category {
        RankCategory::Top => CandidateFilter {
            category: Some(Category::Top),
            dual_category: false,
            order: CandidateOrder::TopScore,
        },
        RankCategory::Controversial => CandidateFilter {
            category: Some(Category::Controversial),
            dual_category: false,
            order: CandidateOrder::ControversyScore,
        },
        RankCategory::Hated => CandidateFilter {
            category: Some(Category::Controversial),
            dual_category: false,
            order: CandidateOrder::RatioAscending,
        },
        RankCategory::TopAndControversial => CandidateFilter {
            category: None,
            dual_category: true,
            order: CandidateOrder::TopScore,
        },
    }
}

/// The leaderboard's formula applied to one post.
#[must_use]
pub fn category_score(post: &Post, category: RankCategory) -> f64 {
    match category {
        RankCategory::Top | RankCategory::TopAndControversial => post.top_score(),
        RankCategory::Controversial => post.controversy_score(),
        RankCategory::Hated => post.upvote_ratio,
    }
}

/// Orders `candidates` for `category` and keeps the best `limit`.
///
/// `hated` ranks by ascending ratio, every other leaderboard by descending
/// score. Equal scores fall back to ascending id. Candidates are assumed to
/// already match [`candidate_filter`].
#[must_use]
pub fn rank_posts(candidates: Vec<Post>, category: RankCategory, limit: usize) -> Vec<RankedPost> {
    let mut scored: Vec<(f64, Post)> = candidates
        .into_iter()
        .map(|post| (category_score(&post, category), post))
        .collect();

    scored.sort_by(|(a_score, a), (b_score, b)| {
        let by_score = match category {
            RankCategory::Hated => a_score.total_cmp(b_score),
            _ => b_score.total_cmp(a_score),
        };
        by_score.then_with(|| a.id.cmp(&b.id))
    });
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(score, post)| to_ranked(post, score))
        .collect()
}

fn to_ranked(post: Post, score: f64) -> RankedPost {
    RankedPost {
        id: post.id,
        title: post.title,
        body: post.body,
        author: post.author,
        permalink: post.permalink,
        score: post.score,
        upvote_ratio: post.upvote_ratio,
        source: post.source,
        num_comments: post.num_comments,
        category: post.category,
        category_score: round2(score),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn post(id: &str, score: i64, upvote_ratio: f64, num_comments: i64) -> Post {
        Post {
            id: id.to_string(),
            name: format!("t3_{id}"),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 18, 30, 0).unwrap(),
            permalink: format!("/r/kollywood/comments/{id}/"),
            title: format!("Post {id}"),
            body: String::new(),
            category: Category::Top,
            score,
            upvote_ratio,
            num_comments,
            source: "kollywood".to_string(),
            source_id: "t5_2s8ab".to_string(),
            source_size: 250_000,
            author: "filmbuff".to_string(),
            author_id: "t2_abc".to_string(),
            dual_category: false,
            version: 1,
        }
    }

    fn ids(ranked: &[RankedPost]) -> Vec<&str> {
        ranked.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn top_score_is_exact() {
        assert_eq!(category_score(&post("a", 100, 0.9, 0), RankCategory::Top), 90.0);
    }

    #[test]
    fn controversy_score_is_exact() {
        assert_eq!(
            category_score(&post("a", 50, 0.2, 10), RankCategory::Controversial),
            400.0
        );
    }

    #[test]
    fn top_orders_by_score_times_ratio_desc() {
        let ranked = rank_posts(
            vec![
                post("low", 100, 0.5, 0),
                post("high", 300, 0.9, 0),
                post("mid", 200, 0.6, 0),
            ],
            RankCategory::Top,
            LEADERBOARD_SIZE,
        );
        assert_eq!(ids(&ranked), vec!["high", "mid", "low"]);
        assert_eq!(ranked[0].category_score, 270.0);
    }

    #[test]
    fn controversial_weights_comment_volume() {
        let ranked = rank_posts(
            vec![post("quiet", 500, 0.5, 1), post("loud", 50, 0.2, 100)],
            RankCategory::Controversial,
            LEADERBOARD_SIZE,
        );
        assert_eq!(ids(&ranked), vec!["loud", "quiet"]);
        assert_eq!(ranked[0].category_score, 4000.0);
    }

    #[test]
    fn hated_orders_by_ratio_ascending() {
        let ranked = rank_posts(
            vec![
                post("meh", 10, 0.45, 3),
                post("despised", 10, 0.12, 3),
                post("disliked", 10, 0.3, 3),
            ],
            RankCategory::Hated,
            LEADERBOARD_SIZE,
        );
        assert_eq!(ids(&ranked), vec!["despised", "disliked", "meh"]);
        assert_eq!(ranked[0].category_score, 0.12);
    }

    #[test]
    fn leaderboard_is_capped_at_five() {
        let candidates = (0..8).map(|i| post(&format!("p{i}"), i * 10, 0.8, 1)).collect();
        let ranked = rank_posts(candidates, RankCategory::Top, LEADERBOARD_SIZE);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].id, "p7");
    }

    #[test]
    fn ties_break_by_id() {
        let ranked = rank_posts(
            vec![post("b", 100, 0.9, 0), post("a", 100, 0.9, 0)],
            RankCategory::Top,
            LEADERBOARD_SIZE,
        );
        assert_eq!(ids(&ranked), vec!["a", "b"]);
    }

    #[test]
    fn category_score_is_rounded_to_two_decimals() {
        let ranked = rank_posts(vec![post("a", 7, 0.333, 0)], RankCategory::Top, 5);
        assert_eq!(ranked[0].category_score, 2.33);
    }

    #[test]
    fn dual_posts_are_only_drawn_for_the_combined_board() {
        for category in [RankCategory::Top, RankCategory::Controversial, RankCategory::Hated] {
            assert!(!candidate_filter(category).dual_category, "{category}");
        }
        let combined = candidate_filter(RankCategory::TopAndControversial);
        assert!(combined.dual_category);
        assert_eq!(combined.category, None);
    }

    #[test]
    fn hated_draws_from_controversial() {
        assert_eq!(
            candidate_filter(RankCategory::Hated).category,
            Some(Category::Controversial)
        );
    }

    #[test]
    fn storage_order_follows_each_formula() {
        assert_eq!(candidate_filter(RankCategory::Top).order, CandidateOrder::TopScore);
        assert_eq!(
            candidate_filter(RankCategory::Controversial).order,
            CandidateOrder::ControversyScore
        );
        assert_eq!(
            candidate_filter(RankCategory::Hated).order,
            CandidateOrder::RatioAscending
        );
        assert_eq!(
            candidate_filter(RankCategory::TopAndControversial).order,
            CandidateOrder::TopScore
        );
    }
}
