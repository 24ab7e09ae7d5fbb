//! Tool Matching
//!
//! Lexical scoring of stored tools against a query. No embeddings: a
//! weighted combination of token overlap, description containment, partial
//! matches, and a static domain-synonym boost.
//!
//! Scoring algorithm:
//! - Keyword overlap (Jaccard):   weight 0.4
//! - Description containment:     weight 0.2
//! - Partial/substring match:     weight 0.2
//! - Domain-cluster boost:        weight 0.2
//!
//! Scores are in [0, 1]; a tool matches when its score reaches
//! [`MATCH_THRESHOLD`] (inclusive). Scoring is pure and deterministic.

use std::collections::BTreeSet;

use tracing::debug;

use crate::models::tool::{QueryContext, ScoredMatch, ToolRecord};

/// Minimum score for a stored tool to be reused (inclusive).
pub const MATCH_THRESHOLD: f64 = 0.3;

/// Static synonym clusters granting the domain boost.
///
/// Query and tool must both map into the same cluster for the boost to
/// apply. Clusters carry Chinese members so cross-language queries
/// ("北京天气" vs. an English-keyworded weather tool) still connect.
const DOMAIN_CLUSTERS: &[&[&str]] = &[
    &["stock", "price", "ticker", "shares", "market", "股票", "股价", "行情"],
    &["weather", "temperature", "forecast", "climate", "天气", "温度", "气温", "天气预报"],
    &["currency", "exchange", "rate", "forex", "汇率", "货币"],
    &["news", "headline", "article", "新闻", "头条"],
    &["translate", "translation", "language", "翻译"],
    &["email", "mail", "smtp", "邮件", "邮箱"],
];

/// Tokenize text into lowercase tokens.
///
/// Latin-script words split on non-alphanumeric boundaries; CJK ideographs
/// become one token per character, since whitespace segmentation does not
/// exist for them.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    let mut current = String::new();

    for ch in text.chars() {
        if is_cjk(ch) {
            if !current.is_empty() {
                push_word(&mut tokens, &current);
                current.clear();
            }
            tokens.insert(ch.to_string());
        } else if ch.is_alphanumeric() {
            current.push(ch);
        } else if !current.is_empty() {
            push_word(&mut tokens, &current);
            current.clear();
        }
    }
    if !current.is_empty() {
        push_word(&mut tokens, &current);
    }

    tokens
}

fn push_word(tokens: &mut BTreeSet<String>, word: &str) {
    if word.len() >= 2 {
        tokens.insert(word.to_lowercase());
    }
}

fn is_cjk(ch: char) -> bool {
    matches!(ch,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}')
}

/// Jaccard similarity over two token sets.
fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Fraction of query tokens appearing as substrings of the description.
fn description_containment(query_tokens: &BTreeSet<String>, description: &str) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let description = description.to_lowercase();
    let hits = query_tokens
        .iter()
        .filter(|t| description.contains(t.as_str()))
        .count();
    hits as f64 / query_tokens.len() as f64
}

/// Fraction of query tokens with a substring relation (either direction) to
/// any tool keyword.
fn partial_match(query_tokens: &BTreeSet<String>, keywords: &BTreeSet<String>) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let hits = query_tokens
        .iter()
        .filter(|q| keywords.iter().any(|k| k.contains(q.as_str()) || q.contains(k.as_str())))
        .count();
    hits as f64 / query_tokens.len() as f64
}

/// Whether query and tool both mention a member of the same domain cluster.
///
/// Substring containment on the raw lowercased text rather than token
/// equality, because CJK cluster members span several characters while
/// tokenization yields one token per ideograph.
fn shared_domain_cluster(query_text: &str, tool_text: &str) -> bool {
    DOMAIN_CLUSTERS.iter().any(|cluster| {
        let query_in = cluster.iter().any(|m| query_text.contains(m));
        let tool_in = cluster.iter().any(|m| tool_text.contains(m));
        query_in && tool_in
    })
}

/// Score a single tool against a query. Pure; result is in [0, 1].
///
/// Integer weights over a denominator of 10 keep threshold comparisons
/// exact for boundary cases.
pub fn score_tool(record: &ToolRecord, query: &QueryContext) -> f64 {
    let query_text = query.query_text().to_lowercase();
    let query_tokens = tokenize(&query_text);
    if query_tokens.is_empty() {
        return 0.0;
    }

    let tool_text = format!(
        "{} {}",
        record.keywords.iter().cloned().collect::<Vec<_>>().join(" "),
        record.description.to_lowercase()
    );

    let overlap = jaccard(&query_tokens, &record.keywords);
    let containment = description_containment(&query_tokens, &record.description);
    let partial = partial_match(&query_tokens, &record.keywords);
    let domain = if shared_domain_cluster(&query_text, &tool_text) {
        1.0
    } else {
        0.0
    };

    (4.0 * overlap + 2.0 * containment + 2.0 * partial + 2.0 * domain) / 10.0
}

/// Find the best-scoring tool at or above `threshold` (inclusive).
///
/// [`MATCH_THRESHOLD`] is the default; callers pass the configured value
/// so an operator-tuned threshold applies in both directions. Ties break
/// toward the lexicographically largest id, i.e. the most recently created
/// tool.
pub fn best_match<'a, I>(records: I, query: &QueryContext, threshold: f64) -> Option<ScoredMatch>
where
    I: IntoIterator<Item = &'a ToolRecord>,
{
    let mut best: Option<ScoredMatch> = None;
    for record in records {
        let score = score_tool(record, query);
        debug!(id = %record.id, score, "scored tool");
        if score < threshold {
            continue;
        }
        let better = match &best {
            None => true,
            Some(current) => {
                score > current.score
                    || (score == current.score && record.id > current.tool_id)
            }
        };
        if better {
            best = Some(ScoredMatch {
                tool_id: record.id.clone(),
                score,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn make_record(id: &str, description: &str, keywords: &[&str]) -> ToolRecord {
        ToolRecord {
            id: id.to_string(),
            description: description.to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            install_dependencies: vec![],
            code: String::new(),
        }
    }

    #[test]
    fn test_tokenize_latin() {
        let tokens = tokenize("Fetch the current Weather, please!");
        assert!(tokens.contains("fetch"));
        assert!(tokens.contains("weather"));
        assert!(tokens.contains("current"));
        // single-char latin tokens dropped
        assert!(!tokens.contains("a"));
    }

    #[test]
    fn test_tokenize_cjk_per_character() {
        let tokens = tokenize("北京天气");
        assert!(tokens.contains("北"));
        assert!(tokens.contains("京"));
        assert!(tokens.contains("天"));
        assert!(tokens.contains("气"));
    }

    #[test]
    fn test_tokenize_mixed() {
        let tokens = tokenize("查询weather信息");
        assert!(tokens.contains("weather"));
        assert!(tokens.contains("查"));
        assert!(tokens.contains("息"));
    }

    #[test]
    fn test_score_in_unit_interval() {
        let record = make_record(
            "weather_20260101120000",
            "Fetches current weather data for any location",
            &["weather", "forecast", "temperature"],
        );
        let query = QueryContext::new("get the weather forecast for tokyo");
        let score = score_tool(&record, &query);
        assert!((0.0..=1.0).contains(&score));
        assert!(score > 0.0);
    }

    #[test]
    fn test_perfect_match_scores_one() {
        let record = make_record(
            "weather_20260101120000",
            "weather forecast",
            &["weather", "forecast"],
        );
        let query = QueryContext::new("weather forecast");
        assert_eq!(score_tool(&record, &query), 1.0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // jaccard 0.5 and partial 0.5 with no containment or domain hit:
        // (4*0.5 + 2*0 + 2*0.5 + 2*0) / 10 = exactly 0.3.
        let record = make_record("r_20260101120000", "", &["alpha"]);
        let query = QueryContext::new("alpha zzzz");
        let score = score_tool(&record, &query);
        assert_eq!(score, MATCH_THRESHOLD);

        let best = best_match(std::iter::once(&record), &query, MATCH_THRESHOLD);
        assert!(best.is_some());
    }

    #[test]
    fn test_below_threshold_no_match() {
        let record = make_record(
            "csv_20260101120000",
            "Parses CSV files into tables",
            &["csv", "parser"],
        );
        let query = QueryContext::new("send an email to my boss");
        assert!(best_match(std::iter::once(&record), &query, MATCH_THRESHOLD).is_none());
    }

    #[test]
    fn test_lowered_threshold_takes_effect() {
        // Partial match only: "alpha" is a substring of the keyword, so the
        // score is exactly 0.2 and fails the default threshold.
        let record = make_record("lookup_20260101120000", "Looks up entries", &["alphabet"]);
        let query = QueryContext::new("alpha");
        assert_eq!(score_tool(&record, &query), 0.2);

        assert!(best_match(std::iter::once(&record), &query, MATCH_THRESHOLD).is_none());
        let best = best_match(std::iter::once(&record), &query, 0.1).unwrap();
        assert_eq!(best.tool_id, "lookup_20260101120000");
    }

    #[test]
    fn test_empty_store_no_match() {
        let query = QueryContext::new("anything at all");
        assert!(best_match(std::iter::empty(), &query, MATCH_THRESHOLD).is_none());
    }

    #[test]
    fn test_cross_language_weather_scenario() {
        // Chinese query against an English-keyworded weather tool connects
        // through the domain cluster plus the shared cluster membership.
        let record = make_record(
            "weather_fetcher_20260101120000",
            "Fetches current weather data for any city 天气查询",
            &["weather", "forecast", "temperature", "天气"],
        );
        let query = QueryContext::new("查询北京天气");
        let score = score_tool(&record, &query);
        assert!(score >= MATCH_THRESHOLD, "score {} below threshold", score);
    }

    #[test]
    fn test_tie_breaks_to_largest_id() {
        let older = make_record("alpha_20250101120000", "weather forecast", &["weather", "forecast"]);
        let newer = make_record("alpha_20260101120000", "weather forecast", &["weather", "forecast"]);
        let query = QueryContext::new("weather forecast");

        let best =
            best_match([&older, &newer].map(|r| r.clone()).iter(), &query, MATCH_THRESHOLD)
                .unwrap();
        assert_eq!(best.tool_id, "alpha_20260101120000");

        // Order independence
        let best =
            best_match([&newer, &older].map(|r| r.clone()).iter(), &query, MATCH_THRESHOLD)
                .unwrap();
        assert_eq!(best.tool_id, "alpha_20260101120000");
    }

    #[test]
    fn test_hint_contributes_to_query() {
        let record = make_record(
            "stock_20260101120000",
            "Fetches real-time stock prices",
            &["stock", "price", "ticker"],
        );
        let with_hint = QueryContext::with_hint("how is NVDA doing", "stock price api");
        let without = QueryContext::new("how is NVDA doing");
        assert!(score_tool(&record, &with_hint) > score_tool(&record, &without));
    }
}
