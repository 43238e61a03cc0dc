//! Trending-vocabulary extraction.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use bollytics_core::WordCount;

/// Words per report unless the caller asks otherwise.
pub const DEFAULT_TREND_LIMIT: usize = 100;

/// A token must be strictly longer than this many characters to count.
pub const MIN_WORD_LEN: usize = 4;

/// Noise words that dominate every film community and say nothing about
/// what is trending in one.
pub const EXCLUDED_WORDS: &[&str] = &[
    "movie", "movies", "watch", "film", "time", "films", "like", "watching", "seen", "good",
    "watched", "best", "better", "love", "loved", "https", "http", "webp", "png", "scene",
    "scenes", "song", "songs", "post", "posts", "guy", "guys", "people", "tamil", "telugu",
    "hindi", "malayalam", "kollywood", "bollywood", "mollywood", "tollywood", "music", "story",
    "actor", "actors",
];

/// English stopwords, matched after lowercasing.
pub const STOPWORDS: &[&str] = &[
    "a", "about", "above", "according", "across", "actually", "after", "afterwards", "again",
    "against", "ain't", "all", "almost", "alone", "along", "already", "also", "although",
    "always", "am", "among", "amongst", "an", "and", "another", "any", "anybody", "anyhow",
    "anyone", "anything", "anyway", "anyways", "anywhere", "are", "aren't", "around", "as",
    "aside", "at", "away", "be", "became", "because", "become", "becomes", "becoming", "been",
    "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "can't", "cannot", "certain", "certainly", "clearly",
    "could", "couldn't", "did", "didn't", "different", "do", "does", "doesn't", "doing",
    "don't", "done", "down", "during", "each", "either", "else", "elsewhere", "enough",
    "entirely", "especially", "even", "ever", "every", "everybody", "everyone", "everything",
    "everywhere", "except", "few", "for", "former", "formerly", "from", "further",
    "furthermore", "get", "gets", "getting", "given", "gives", "goes", "going", "gonna",
    "gotten", "had", "hadn't", "has", "hasn't", "have", "haven't", "having", "he", "he's",
    "hence", "her", "here", "here's", "hereafter", "hereby", "herein", "hers", "herself",
    "him", "himself", "his", "how", "however", "i", "i'd", "i'll", "i'm", "i've", "if", "in",
    "indeed", "instead", "into", "is", "isn't", "it", "it's", "its", "itself", "just", "known",
    "knows", "last", "lately", "later", "latter", "least", "less", "let's", "likely", "little",
    "mainly", "many", "may", "maybe", "me", "meanwhile", "might", "mine", "more", "moreover",
    "most", "mostly", "much", "must", "my", "myself", "namely", "near", "nearly", "necessary",
    "neither", "never", "nevertheless", "next", "no", "nobody", "none", "nothing", "now",
    "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other",
    "others", "otherwise", "ought", "our", "ours", "ourselves", "out", "outside", "over",
    "overall", "own", "particular", "particularly", "perhaps", "please", "possible",
    "probably", "quite", "rather", "really", "regarding", "same", "seem", "seemed", "seeming",
    "seems", "several", "shall", "she", "she's", "should", "shouldn't", "since", "some",
    "somebody", "somehow", "someone", "something", "sometime", "sometimes", "somewhat",
    "somewhere", "still", "such", "sure", "than", "thank", "thanks", "that", "that's", "the",
    "their", "theirs", "them", "themselves", "then", "thence", "there", "there's",
    "thereafter", "thereby", "therefore", "therein", "these", "they", "they'd", "they'll",
    "they're", "they've", "thing", "things", "think", "this", "those", "though", "through",
    "throughout", "thru", "thus", "to", "together", "too", "toward", "towards", "under",
    "unless", "until", "unto", "upon", "us", "used", "using", "usually", "various", "very",
    "was", "wasn't", "we", "we'd", "we'll", "we're", "we've", "were", "weren't", "what",
    "what's", "whatever", "when", "whence", "whenever", "where", "where's", "whereas",
    "whereby", "wherever", "whether", "which", "while", "whither", "who", "who's", "whoever",
    "whole", "whom", "whose", "why", "will", "with", "within", "without", "won't", "would",
    "wouldn't", "yet", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

static EXCLUDED_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| EXCLUDED_WORDS.iter().copied().collect());

/// Counts the surviving vocabulary across `texts` and returns the `limit`
/// most frequent words.
///
/// Each text is lowercased and split on whitespace. Leading and trailing
/// punctuation is trimmed from every token; stopwords, tokens of
/// [`MIN_WORD_LEN`] characters or fewer, and [`EXCLUDED_WORDS`] are dropped.
/// Output is ordered by count descending, then word ascending.
#[must_use]
pub fn trending_words<S: AsRef<str>>(texts: &[S], limit: usize) -> Vec<WordCount> {
    let mut counts: HashMap<String, u64> = HashMap::new();

    for text in texts {
        let lowered = text.as_ref().to_lowercase().replace('\u{2019}', "'");
        for raw in lowered.split_whitespace() {
            let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
            if is_trend_word(word) {
                *counts.entry(word.to_string()).or_insert(0) += 1;
            }
        }
    }

    let mut words: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words.truncate(limit);
    words
}

fn is_trend_word(word: &str) -> bool {
    word.chars().count() > MIN_WORD_LEN
        && !STOPWORD_SET.contains(word)
        && !EXCLUDED_SET.contains(word)
}
