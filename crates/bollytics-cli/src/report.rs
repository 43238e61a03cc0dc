//! Report printing for the `report` subcommands.

use bollytics_analytics::{FrequencyGrid, Reports};
use bollytics_core::{RankedPost, TopUser, WordCount};

use crate::ReportCommands;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Runs one report subcommand and prints the result.
///
/// # Errors
///
/// Returns an error for an unknown source or a failed query.
pub(crate) async fn run(reports: &Reports, command: ReportCommands) -> anyhow::Result<()> {
    match command {
        ReportCommands::TopPosts {
            source,
            category,
            interval,
        } => {
            let posts = reports
                .get_top_posts(&source, category, interval.days())
                .await?;
            if posts.is_empty() {
                println!("no {category} posts for {source} in the last {interval}");
            } else {
                print_posts(&posts);
            }
        }
        ReportCommands::TopUsers {
            source,
            category,
            interval,
        } => {
            let users = reports
                .get_top_users(&source, category, interval.days())
                .await?;
            if users.is_empty() {
                println!("no {category} posters for {source} in the last {interval}");
            } else {
                print_users(&users);
            }
        }
        ReportCommands::Frequency { source, interval } => {
            let grid = reports.get_post_frequency(&source, interval.days()).await?;
            print_grid(&grid);
        }
        ReportCommands::Trending {
            source,
            interval,
            limit,
        } => {
            let words = reports
                .get_trending_words(&source, interval.days(), limit)
                .await?;
            print_words(&words);
        }
    }
    Ok(())
}

fn print_posts(posts: &[RankedPost]) {
    println!(
        "{:<10}{:>10}{:>8}{:>7}{:>8}  TITLE",
        "ID", "SCORE", "RATIO", "COMM", "RANK"
    );
    for post in posts {
        println!(
            "{:<10}{:>10}{:>8.2}{:>7}{:>8.2}  {}",
            post.id,
            post.score,
            post.upvote_ratio,
            post.num_comments,
            post.category_score,
            truncate(&post.title, 60)
        );
    }
}

fn print_users(users: &[TopUser]) {
    println!("{:<24}POSTS", "USER");
    for user in users {
        println!("{:<24}{}", user.user, user.post_count);
    }
}

fn print_grid(grid: &FrequencyGrid) {
    print!("   ");
    for hour in 0..24 {
        print!("{hour:>4}");
    }
    println!();
    for (name, hours) in DAY_NAMES.iter().zip(grid.rows()) {
        print!("{name}");
        for count in hours {
            print!("{count:>4}");
        }
        println!();
    }
    println!("total: {}", grid.total());
}

fn print_words(words: &[WordCount]) {
    if words.is_empty() {
        println!("no trending words");
        return;
    }
    println!("{:<24}COUNT", "WORD");
    for word in words {
        println!("{:<24}{}", word.word, word.count);
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
