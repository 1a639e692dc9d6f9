use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use skipper_engine::{Commit, Run, RunSource, SourceError, WorkflowRuns};
use skipper_protocol::{
    parse_commit, parse_run, RawCommit, RawWorkflowRun, RawWorkflowRunList,
};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Runs listed per workflow; only the most recent page is considered.
const RUNS_PER_PAGE: u32 = 100;

/// GitHub lists at most 3000 changed files per commit, 300 per page.
const MAX_COMMIT_FILE_PAGES: usize = 10;

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub run_id: u64,
    pub timeout: Duration,
}

/// [`RunSource`] backed by the GitHub REST API.
pub struct GithubClient {
    http: Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig, token: &str) -> Result<Self, SourceError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| SourceError::Transport("token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http = Client::builder()
            .user_agent(concat!("skipper/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|err| SourceError::Transport(format!("failed to build HTTP client: {err}")))?;

        Ok(Self { http, config })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            path
        )
    }

    async fn send(&self, method: Method, url: &str) -> Result<reqwest::Response, SourceError> {
        log::debug!("{method} {url}");
        let response = self
            .http
            .request(method.clone(), url)
            .send()
            .await
            .map_err(|err| SourceError::Transport(format!("{method} {url}: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        Ok(self.get_page(url).await?.0)
    }

    /// Decoded body plus the `rel="next"` URL of the `Link` header, if any.
    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<(T, Option<String>), SourceError> {
        let response = self.send(Method::GET, url).await?;
        let next = next_page_url(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|err| SourceError::Transport(format!("GET {url}: {err}")))?;
        let value = serde_json::from_slice(&body).map_err(|err| SourceError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        Ok((value, next))
    }

    async fn fetch_commit(&self, sha: &str) -> Result<Commit, SourceError> {
        let url = self.repo_url(&format!("commits/{sha}"));
        let (mut raw, mut next): (RawCommit, _) = self.get_page(&url).await?;
        let mut pages = 1;
        while let Some(url) = next {
            if pages == MAX_COMMIT_FILE_PAGES {
                return Err(SourceError::Decode {
                    url,
                    message: format!(
                        "changed files of commit {sha} span more than {MAX_COMMIT_FILE_PAGES} pages"
                    ),
                });
            }
            let (page, following): (RawCommit, _) = self.get_page(&url).await?;
            log::debug!("commit {sha}: {} more files on page {}", page.files.len(), pages + 1);
            raw.files.extend(page.files);
            next = following;
            pages += 1;
        }
        Ok(parse_commit(raw)?)
    }
}

fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| param.trim() == "rel=\"next\"");
        is_next.then(|| {
            target
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}

#[async_trait]
impl RunSource for GithubClient {
    async fn get_current_run(&self) -> Result<Run, SourceError> {
        let url = self.repo_url(&format!("actions/runs/{}", self.config.run_id));
        let raw: RawWorkflowRun = self.get_json(&url).await?;
        Ok(parse_run(raw, "current_run")?)
    }

    async fn list_runs_for_workflow(&self, current: &Run) -> Result<WorkflowRuns, SourceError> {
        let url = self.repo_url(&format!(
            "actions/workflows/{}/runs?per_page={RUNS_PER_PAGE}",
            current.workflow_id
        ));
        let list: RawWorkflowRunList = self.get_json(&url).await?;
        log::debug!(
            "listed {} of {} runs for workflow {}",
            list.workflow_runs.len(),
            list.total_count,
            current.workflow_id
        );
        let runs = list
            .workflow_runs
            .into_iter()
            .map(|raw| parse_run(raw, "others"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WorkflowRuns::split(current, runs))
    }

    async fn get_commit(&self, sha: &str) -> Option<Commit> {
        match self.fetch_commit(sha).await {
            Ok(commit) => Some(commit),
            Err(err) => {
                log::warn!("failed to fetch commit {sha}: {err}");
                None
            }
        }
    }

    async fn cancel_run(&self, run_id: u64) -> Result<u16, SourceError> {
        let url = self.repo_url(&format!("actions/runs/{run_id}/cancel"));
        let response = self.send(Method::POST, &url).await?;
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(api_url: &str) -> GithubClient {
        GithubClient::new(
            GithubConfig {
                api_url: api_url.to_string(),
                owner: "acme".to_string(),
                repo: "app".to_string(),
                run_id: 100,
                timeout: Duration::from_secs(5),
            },
            "token",
        )
        .expect("client")
    }

    #[test]
    fn repo_urls_tolerate_trailing_slash() {
        assert_eq!(
            client("https://ghe.example.com/api/v3/").repo_url("actions/runs/1"),
            "https://ghe.example.com/api/v3/repos/acme/app/actions/runs/1"
        );
        assert_eq!(
            client(DEFAULT_API_URL).repo_url("commits/abc"),
            "https://api.github.com/repos/acme/app/commits/abc"
        );
    }

    #[test]
    fn rejects_tokens_that_cannot_be_sent() {
        let config = GithubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            owner: "acme".to_string(),
            repo: "app".to_string(),
            run_id: 1,
            timeout: Duration::from_secs(5),
        };
        assert!(GithubClient::new(config, "bad\ntoken").is_err());
    }

    fn link_headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(LINK, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn next_page_is_read_from_link_header() {
        let headers = link_headers(
            "<https://api.github.com/repositories/1/commits/abc?page=2>; rel=\"next\", \
             <https://api.github.com/repositories/1/commits/abc?page=4>; rel=\"last\"",
        );
        assert_eq!(
            next_page_url(&headers).as_deref(),
            Some("https://api.github.com/repositories/1/commits/abc?page=2")
        );
    }

    #[test]
    fn last_page_has_no_next_link() {
        let headers = link_headers(
            "<https://api.github.com/repositories/1/commits/abc?page=1>; rel=\"first\", \
             <https://api.github.com/repositories/1/commits/abc?page=3>; rel=\"prev\"",
        );
        assert_eq!(next_page_url(&headers), None);
        assert_eq!(next_page_url(&HeaderMap::new()), None);
    }
}
