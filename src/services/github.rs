//! GitHub Tool Search
//!
//! `SnippetSearcher` backed by the GitHub repository search API: stars-sorted
//! top results, README retrieval, installation/usage section extraction, and
//! a 0-100 candidate score. Disabled entirely without a `GITHUB_API_TOKEN`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use toolforge_core::{CoreError, CoreResult, SnippetSearcher, ToolCandidate};

const GITHUB_API_BASE_URL: &str = "https://api.github.com";
const INSTALLATION_NOT_FOUND: &str = "Installation instructions not found";
const USAGE_NOT_FOUND: &str = "Usage instructions not found";

/// Section headers that count as installation instructions.
const INSTALL_HEADERS: &[&str] = &[
    "install",
    "setup",
    "getting started",
    "requirement",
    "dependency",
    "prerequisites",
    "docker",
];

/// Section headers excluded from the usage guide.
const EXCLUDE_HEADERS: &[&str] = &[
    "donate",
    "sponsor",
    "license",
    "author",
    "contributor",
    "contributing",
];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RepoItem>,
}

#[derive(Debug, Deserialize)]
struct RepoItem {
    name: String,
    #[serde(default)]
    description: Option<String>,
    stargazers_count: u64,
    html_url: String,
    /// API URL, used for the README endpoint.
    url: String,
    #[serde(default)]
    language: Option<String>,
}

/// Extracted README documentation.
#[derive(Debug, Clone)]
struct RepoDocs {
    installation: String,
    usage: String,
}

/// Searches GitHub for candidate tools to build on.
pub struct GithubSearcher {
    client: reqwest::Client,
    token: String,
}

impl GithubSearcher {
    pub fn new(client: reqwest::Client, token: String) -> Self {
        Self { client, token }
    }

    /// Build a searcher from `GITHUB_API_TOKEN`, or `None` when unset.
    pub fn from_env(client: reqwest::Client) -> Option<Self> {
        match std::env::var("GITHUB_API_TOKEN") {
            Ok(token) if !token.is_empty() => Some(Self::new(client, token)),
            _ => {
                debug!("GITHUB_API_TOKEN not set, open-source search disabled");
                None
            }
        }
    }

    async fn search_repositories(&self, query: &str) -> CoreResult<Vec<RepoItem>> {
        let url = format!("{}/search/repositories", GITHUB_API_BASE_URL);
        let full_query = format!("{} language:python", query);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", full_query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", "3"),
            ])
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", "toolforge")
            .send()
            .await
            .map_err(|e| CoreError::collaborator(format!("GitHub search failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CoreError::collaborator(format!(
                "GitHub search returned {}",
                response.status()
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| CoreError::parse(format!("invalid GitHub search response: {}", e)))?;
        Ok(parsed.items)
    }

    async fn fetch_readme(&self, repo_api_url: &str) -> RepoDocs {
        let url = format!("{}/readme", repo_api_url);
        let result = self
            .client
            .get(&url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3.raw")
            .header("User-Agent", "toolforge")
            .send()
            .await;

        let content = match result {
            Ok(resp) if resp.status().is_success() => resp.text().await.unwrap_or_default(),
            Ok(resp) => {
                warn!(status = %resp.status(), "README fetch failed");
                String::new()
            }
            Err(e) => {
                warn!(error = %e, "README fetch failed");
                String::new()
            }
        };

        extract_docs(&content)
    }
}

/// Split markdown into `(header, body)` sections.
fn split_sections(content: &str) -> Vec<(String, String)> {
    let mut sections = Vec::new();
    let mut current_header = String::new();
    let mut current_body: Vec<&str> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            let header = trimmed.trim_start_matches('#').trim();
            if !header.is_empty() {
                if !current_body.is_empty() {
                    sections.push((current_header.clone(), current_body.join("\n")));
                }
                current_header = header.to_lowercase();
                current_body = vec![line];
                continue;
            }
        }
        current_body.push(line);
    }
    if !current_body.is_empty() {
        sections.push((current_header, current_body.join("\n")));
    }
    sections
}

/// Pull installation and usage text out of a README.
fn extract_docs(content: &str) -> RepoDocs {
    let sections = split_sections(content);

    let installation: Vec<&str> = sections
        .iter()
        .filter(|(header, _)| INSTALL_HEADERS.iter().any(|w| header.contains(w)))
        .map(|(_, body)| body.as_str())
        .collect();

    let usage: Vec<&str> = sections
        .iter()
        .filter(|(header, _)| !EXCLUDE_HEADERS.iter().any(|w| header.contains(w)))
        .map(|(_, body)| body.as_str())
        .collect();

    let installation = installation.join("\n\n").trim().to_string();
    let usage = usage.join("\n\n").trim().to_string();

    RepoDocs {
        installation: if installation.is_empty() {
            INSTALLATION_NOT_FOUND.to_string()
        } else {
            installation
        },
        usage: if usage.is_empty() {
            USAGE_NOT_FOUND.to_string()
        } else {
            usage
        },
    }
}

/// Score a repository candidate from 0 to 100.
///
/// Stars 25 / docs 25 / relevance 30 / language 30, capped per component;
/// non-Python repositories score 0 outright.
fn score_candidate(repo: &RepoItem, docs: &RepoDocs, tool_type: &str, description: &str) -> f64 {
    let language = repo
        .language
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    if language != "python" {
        return 0.0;
    }
    let language_score = 30.0;

    const MAX_STARS: f64 = 10_000.0;
    let star_score = (repo.stargazers_count as f64 / MAX_STARS * 25.0).min(25.0);

    let mut doc_score = 0.0;
    if docs.installation != INSTALLATION_NOT_FOUND {
        doc_score += 12.5;
    }
    if docs.usage != USAGE_NOT_FOUND {
        doc_score += 12.5;
    }

    let mut relevance_score: f64 = 0.0;
    let name_desc = format!(
        "{} {}",
        repo.name,
        repo.description.as_deref().unwrap_or("")
    )
    .to_lowercase();
    for term in tool_type.to_lowercase().split_whitespace() {
        if name_desc.contains(term) {
            relevance_score += 7.5;
        }
    }
    // Does the documentation cover the capability description?
    let docs_text = format!("{} {}", docs.installation, docs.usage).to_lowercase();
    let desc_lower = description.to_lowercase();
    let terms: Vec<&str> = desc_lower.split_whitespace().collect();
    if !terms.is_empty() {
        let matches = terms.iter().filter(|t| docs_text.contains(**t)).count();
        if matches as f64 / terms.len() as f64 > 0.5 {
            relevance_score += 7.5;
        }
    }
    let relevance_score = relevance_score.min(30.0);

    star_score + doc_score + relevance_score + language_score
}

#[async_trait]
impl SnippetSearcher for GithubSearcher {
    async fn find_candidate(
        &self,
        tool_type: &str,
        description: &str,
    ) -> CoreResult<Option<ToolCandidate>> {
        let repos = self.search_repositories(tool_type).await?;
        if repos.is_empty() {
            debug!(%tool_type, "no repositories found");
            return Ok(None);
        }

        let mut best: Option<ToolCandidate> = None;
        for repo in &repos {
            let docs = self.fetch_readme(&repo.url).await;
            let score = score_candidate(repo, &docs, tool_type, description);
            debug!(name = %repo.name, score, "scored candidate");

            if best.as_ref().map(|b| score > b.score).unwrap_or(true) {
                best = Some(ToolCandidate {
                    name: repo.name.clone(),
                    description: repo
                        .description
                        .clone()
                        .unwrap_or_else(|| "No description available".to_string()),
                    stars: repo.stargazers_count,
                    url: repo.html_url.clone(),
                    score,
                    installation: docs.installation,
                    usage: docs.usage,
                });
            }
        }

        // A zero-score best candidate is no candidate at all.
        Ok(best.filter(|b| b.score > 0.0))
    }
}
