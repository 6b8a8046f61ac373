use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    RequestBuilder, StatusCode, Url,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::github::{
    models::{
        AuthenticatedUser, Branch, CommitInfo, CommitLink, ContentEntry, ContentsWrite, FileBlob,
        FileChange, NewPullRequest, PullRequest, PutFileRequest, RepoRef, Repository,
    },
    GitHubProvider,
};

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const REPOSITORY_PAGE_SIZE: &str = "100";
const REGULAR_FILE_MODE: &str = "100644";

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
    web_url: String,
}

impl GitHubClient {
    pub fn new(
        token: &str,
        api_url: &str,
        web_url: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let mut authorization = HeaderValue::from_str(&format!("token {token}"))
            .map_err(|_| AppError::internal("GITHUB_TOKEN contains invalid header characters"))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::internal(format!("failed to build github http client: {err}")))?;

        let api_url = Url::parse(api_url)
            .map_err(|err| AppError::internal(format!("invalid github api url: {err}")))?;
        if api_url.cannot_be_a_base() {
            return Err(AppError::internal("github api url cannot be used as a base"));
        }

        Ok(Self {
            http,
            api_url,
            web_url: web_url.trim_end_matches('/').to_string(),
        })
    }

    /// Appends path segments to the API base. Embedded `/` separate segments,
    /// everything else is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for part in segments
                .iter()
                .flat_map(|segment| segment.split('/'))
                .filter(|part| !part.is_empty())
            {
                path.push(part);
            }
        }
        url
    }

    fn repo_endpoint(&self, repo: &RepoRef, rest: &[&str]) -> Url {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.name.as_str()];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    fn contents_endpoint(&self, repo: &RepoRef, path: &str) -> Url {
        let mut url = self.repo_endpoint(repo, &["contents", path]);
        if path.trim_matches('/').is_empty() {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.push("");
            }
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let response = request
            .send()
            .await
            .map_err(|err| AppError::upstream(None, format!("request to GitHub failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                Some(status.as_u16()),
                error_message(status, &body),
            ));
        }

        response.json::<T>().await.map_err(|err| {
            AppError::upstream(
                Some(status.as_u16()),
                format!("unexpected GitHub response: {err}"),
            )
        })
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}

fn required(value: Option<String>, what: &str) -> Result<String, AppError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::upstream(None, format!("GitHub response is missing {what}")))
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: Option<String>,
    name: Option<String>,
    id: Option<u64>,
    html_url: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhRepository {
    id: Option<u64>,
    name: Option<String>,
    full_name: Option<String>,
    html_url: Option<String>,
    description: Option<String>,
    private: Option<bool>,
    default_branch: Option<String>,
    language: Option<String>,
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhSha {
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhBranch {
    name: Option<String>,
    commit: Option<GhSha>,
}

#[derive(Debug, Deserialize)]
struct GhContent {
    name: Option<String>,
    path: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    size: Option<u64>,
    sha: Option<String>,
    html_url: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GhContents {
    Many(Vec<GhContent>),
    One(Box<GhContent>),
}

#[derive(Debug, Deserialize)]
struct GhLink {
    sha: Option<String>,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhContentsWrite {
    commit: Option<GhLink>,
    content: Option<GhLink>,
}

#[derive(Debug, Deserialize)]
struct GhRef {
    object: Option<GhSha>,
}

#[derive(Debug, Deserialize)]
struct GhCommit {
    sha: Option<String>,
    tree: Option<GhSha>,
}

#[derive(Debug, Deserialize)]
struct GhPullRequest {
    id: Option<u64>,
    number: Option<u64>,
    title: Option<String>,
    html_url: Option<String>,
    state: Option<String>,
}

impl From<GhUser> for AuthenticatedUser {
    fn from(user: GhUser) -> Self {
        Self {
            login: user.login,
            name: user.name,
            id: user.id,
            url: user.html_url,
            kind: user.kind,
        }
    }
}

impl From<GhRepository> for Repository {
    fn from(repo: GhRepository) -> Self {
        Self {
            id: repo.id,
            name: repo.name,
            full_name: repo.full_name,
            url: repo.html_url,
            description: repo.description,
            private: repo.private,
            default_branch: repo.default_branch,
            language: repo.language,
            updated_at: repo.updated_at,
        }
    }
}

impl From<GhContent> for ContentEntry {
    fn from(item: GhContent) -> Self {
        let is_file = item.kind.as_deref() == Some("file");
        Self {
            name: item.name,
            path: item.path,
            size: if is_file { item.size } else { None },
            kind: item.kind,
            url: item.html_url,
            sha: item.sha,
        }
    }
}

impl From<GhContent> for FileBlob {
    fn from(item: GhContent) -> Self {
        Self {
            name: item.name,
            path: item.path,
            kind: item.kind,
            size: item.size,
            sha: item.sha,
            url: item.html_url,
            encoded_content: item.content,
        }
    }
}

impl From<GhContentsWrite> for ContentsWrite {
    fn from(write: GhContentsWrite) -> Self {
        let (commit_sha, commit_url) = write
            .commit
            .map(|link| (link.sha, link.html_url))
            .unwrap_or_default();
        let (content_sha, content_url) = write
            .content
            .map(|link| (link.sha, link.html_url))
            .unwrap_or_default();

        Self {
            commit: CommitLink {
                sha: commit_sha,
                url: commit_url,
            },
            content_sha,
            content_url,
        }
    }
}

#[async_trait]
impl GitHubProvider for GitHubClient {
    fn web_url(&self) -> &str {
        &self.web_url
    }

    async fn authenticated_user(&self) -> Result<AuthenticatedUser, AppError> {
        let user: GhUser = self.send(self.http.get(self.endpoint(&["user"]))).await?;
        Ok(user.into())
    }

    async fn list_repositories(
        &self,
        username: Option<&str>,
    ) -> Result<Vec<Repository>, AppError> {
        let url = match username {
            Some(username) => self.endpoint(&["users", username, "repos"]),
            None => self.endpoint(&["user", "repos"]),
        };
        let request = self.http.get(url).query(&[
            ("sort", "updated"),
            ("direction", "desc"),
            ("per_page", REPOSITORY_PAGE_SIZE),
        ]);

        let repos: Vec<GhRepository> = self.send(request).await?;
        Ok(repos.into_iter().map(Repository::from).collect())
    }

    async fn default_branch(&self, repo: &RepoRef) -> Result<String, AppError> {
        let info: GhRepository = self.send(self.http.get(self.repo_endpoint(repo, &[]))).await?;
        Ok(info
            .default_branch
            .filter(|branch| !branch.is_empty())
            .unwrap_or_else(|| "main".to_string()))
    }

    async fn list_branches(&self, repo: &RepoRef) -> Result<Vec<Branch>, AppError> {
        let branches: Vec<GhBranch> = self
            .send(self.http.get(self.repo_endpoint(repo, &["branches"])))
            .await?;

        Ok(branches
            .into_iter()
            .map(|branch| Branch {
                name: branch.name,
                commit_sha: branch.commit.and_then(|commit| commit.sha),
            })
            .collect())
    }

    async fn list_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
    ) -> Result<Vec<ContentEntry>, AppError> {
        let request = self
            .http
            .get(self.contents_endpoint(repo, path))
            .query(&[("ref", branch)]);

        let entries = match self.send::<GhContents>(request).await? {
            GhContents::Many(items) => items,
            GhContents::One(item) => vec![*item],
        };
        Ok(entries.into_iter().map(ContentEntry::from).collect())
    }

    async fn get_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
    ) -> Result<FileBlob, AppError> {
        let request = self
            .http
            .get(self.contents_endpoint(repo, path))
            .query(&[("ref", branch)]);

        match self.send::<GhContents>(request).await? {
            GhContents::One(item) => Ok((*item).into()),
            GhContents::Many(_) => Ok(FileBlob {
                name: path.rsplit('/').next().map(str::to_string),
                path: Some(path.to_string()),
                kind: Some("dir".to_string()),
                size: None,
                sha: None,
                url: None,
                encoded_content: None,
            }),
        }
    }

    async fn put_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        request: &PutFileRequest,
    ) -> Result<ContentsWrite, AppError> {
        let write: GhContentsWrite = self
            .send(self.http.put(self.contents_endpoint(repo, path)).json(request))
            .await?;
        Ok(write.into())
    }

    async fn delete_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        message: &str,
        sha: &str,
        branch: &str,
    ) -> Result<ContentsWrite, AppError> {
        let body = json!({
            "message": message,
            "sha": sha,
            "branch": branch,
        });
        let write: GhContentsWrite = self
            .send(self.http.delete(self.contents_endpoint(repo, path)).json(&body))
            .await?;
        Ok(write.into())
    }

    async fn branch_head(&self, repo: &RepoRef, branch: &str) -> Result<String, AppError> {
        let reference: GhRef = self
            .send(
                self.http
                    .get(self.repo_endpoint(repo, &["git", "refs", "heads", branch])),
            )
            .await?;
        required(
            reference.object.and_then(|object| object.sha),
            "the branch head sha",
        )
    }

    async fn get_commit(&self, repo: &RepoRef, sha: &str) -> Result<CommitInfo, AppError> {
        let commit: GhCommit = self
            .send(self.http.get(self.repo_endpoint(repo, &["git", "commits", sha])))
            .await?;

        Ok(CommitInfo {
            sha: required(commit.sha, "the commit sha")?,
            tree_sha: required(commit.tree.and_then(|tree| tree.sha), "the commit tree sha")?,
        })
    }

    async fn create_tree(
        &self,
        repo: &RepoRef,
        base_tree: &str,
        changes: &[FileChange],
    ) -> Result<String, AppError> {
        let tree = changes
            .iter()
            .map(|change| {
                json!({
                    "path": change.path,
                    "mode": REGULAR_FILE_MODE,
                    "type": "blob",
                    "content": change.content,
                })
            })
            .collect::<Vec<_>>();
        let body = json!({
            "base_tree": base_tree,
            "tree": tree,
        });

        let created: GhSha = self
            .send(
                self.http
                    .post(self.repo_endpoint(repo, &["git", "trees"]))
                    .json(&body),
            )
            .await?;
        required(created.sha, "the new tree sha")
    }

    async fn create_commit(
        &self,
        repo: &RepoRef,
        message: &str,
        tree_sha: &str,
        parents: &[String],
    ) -> Result<String, AppError> {
        let body = json!({
            "message": message,
            "parents": parents,
            "tree": tree_sha,
        });

        let created: GhSha = self
            .send(
                self.http
                    .post(self.repo_endpoint(repo, &["git", "commits"]))
                    .json(&body),
            )
            .await?;
        required(created.sha, "the new commit sha")
    }

    async fn update_branch(
        &self,
        repo: &RepoRef,
        branch: &str,
        sha: &str,
    ) -> Result<(), AppError> {
        let body = json!({
            "sha": sha,
            "force": false,
        });

        let _: Value = self
            .send(
                self.http
                    .patch(self.repo_endpoint(repo, &["git", "refs", "heads", branch]))
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn create_branch(
        &self,
        repo: &RepoRef,
        branch: &str,
        sha: &str,
    ) -> Result<(), AppError> {
        let body = json!({
            "ref": format!("refs/heads/{branch}"),
            "sha": sha,
        });

        let _: Value = self
            .send(
                self.http
                    .post(self.repo_endpoint(repo, &["git", "refs"]))
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn create_pull_request(
        &self,
        repo: &RepoRef,
        request: &NewPullRequest,
    ) -> Result<PullRequest, AppError> {
        let pr: GhPullRequest = self
            .send(
                self.http
                    .post(self.repo_endpoint(repo, &["pulls"]))
                    .json(request),
            )
            .await?;

        Ok(PullRequest {
            id: pr.id,
            number: pr.number,
            title: pr.title,
            url: pr.html_url,
            state: pr.state,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::{prelude::*, Method::PATCH};
    use serde_json::json;

    use super::GitHubClient;
    use crate::errors::AppError;
    use crate::github::{
        models::{FileChange, NewPullRequest, RepoRef},
        GitHubProvider,
    };

    fn client(server: &MockServer) -> GitHubClient {
        GitHubClient::new(
            "ghp_test",
            &server.base_url(),
            "https://github.com",
            Duration::from_secs(5),
        )
        .expect("client should build")
    }

    fn repo() -> RepoRef {
        RepoRef::new("octo", "hello-world")
    }

    #[tokio::test]
    async fn list_repositories_sends_auth_and_sorting() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/user/repos")
                    .query_param("sort", "updated")
                    .query_param("direction", "desc")
                    .query_param("per_page", "100")
                    .header("authorization", "token ghp_test")
                    .header("accept", "application/vnd.github.v3+json");
                then.status(200).json_body(json!([
                    {
                        "id": 7,
                        "name": "hello-world",
                        "full_name": "octo/hello-world",
                        "html_url": "https://github.com/octo/hello-world",
                        "description": null,
                        "private": false,
                        "default_branch": "main",
                        "language": "Rust",
                        "updated_at": "2026-01-02T03:04:05Z"
                    }
                ]));
            })
            .await;

        let repos = client(&server)
            .list_repositories(None)
            .await
            .expect("repositories");

        mock.assert_async().await;
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].full_name.as_deref(), Some("octo/hello-world"));
        assert_eq!(repos[0].language.as_deref(), Some("Rust"));
        assert_eq!(repos[0].description, None);
    }

    #[tokio::test]
    async fn list_repositories_for_named_user() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/users/someone/repos");
                then.status(200).json_body(json!([]));
            })
            .await;

        let repos = client(&server)
            .list_repositories(Some("someone"))
            .await
            .expect("repositories");

        mock.assert_async().await;
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn list_contents_wraps_single_file_and_hides_dir_sizes() {
        let server = MockServer::start_async().await;
        let root = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/hello-world/contents/")
                    .query_param("ref", "main");
                then.status(200).json_body(json!([
                    {"name": "src", "path": "src", "type": "dir", "size": 0, "sha": "d1", "html_url": "u1"},
                    {"name": "README.md", "path": "README.md", "type": "file", "size": 12, "sha": "f1", "html_url": "u2"}
                ]));
            })
            .await;
        let single = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/hello-world/contents/src/main.rs")
                    .query_param("ref", "dev");
                then.status(200).json_body(json!(
                    {"name": "main.rs", "path": "src/main.rs", "type": "file", "size": 40, "sha": "f2", "html_url": "u3"}
                ));
            })
            .await;

        let client = client(&server);
        let entries = client
            .list_contents(&repo(), "", "main")
            .await
            .expect("root listing");
        let file = client
            .list_contents(&repo(), "src/main.rs", "dev")
            .await
            .expect("single file listing");

        root.assert_async().await;
        single.assert_async().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].size, None);
        assert_eq!(entries[1].size, Some(12));
        assert_eq!(file.len(), 1);
        assert_eq!(file[0].path.as_deref(), Some("src/main.rs"));
    }

    #[tokio::test]
    async fn error_status_carries_github_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octo/hello-world/branches");
                then.status(404).json_body(json!({"message": "Not Found"}));
            })
            .await;

        let err = client(&server)
            .list_branches(&repo())
            .await
            .expect_err("expected upstream failure");

        match err {
            AppError::Upstream { status, message } => {
                assert_eq!(status, Some(404));
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn branch_head_keeps_slashes_in_branch_names() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/hello-world/git/refs/heads/feature/login");
                then.status(200)
                    .json_body(json!({"ref": "refs/heads/feature/login", "object": {"sha": "abc123"}}));
            })
            .await;

        let sha = client(&server)
            .branch_head(&repo(), "feature/login")
            .await
            .expect("branch head");

        mock.assert_async().await;
        assert_eq!(sha, "abc123");
    }

    #[tokio::test]
    async fn create_tree_posts_blob_entries() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/repos/octo/hello-world/git/trees")
                    .json_body(json!({
                        "base_tree": "tree0",
                        "tree": [
                            {"path": "a.txt", "mode": "100644", "type": "blob", "content": "alpha"}
                        ]
                    }));
                then.status(201).json_body(json!({"sha": "tree1"}));
            })
            .await;

        let sha = client(&server)
            .create_tree(
                &repo(),
                "tree0",
                &[FileChange {
                    path: "a.txt".to_string(),
                    content: "alpha".to_string(),
                }],
            )
            .await
            .expect("tree sha");

        mock.assert_async().await;
        assert_eq!(sha, "tree1");
    }

    #[tokio::test]
    async fn update_branch_is_not_forced() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/repos/octo/hello-world/git/refs/heads/main")
                    .json_body(json!({"sha": "c2", "force": false}));
                then.status(200).json_body(json!({"ref": "refs/heads/main"}));
            })
            .await;

        client(&server)
            .update_branch(&repo(), "main", "c2")
            .await
            .expect("ref update");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_contents_sends_sha_and_branch() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path("/repos/octo/hello-world/contents/docs/old.md")
                    .json_body(json!({"message": "remove", "sha": "s1", "branch": "main"}));
                then.status(200).json_body(json!({
                    "content": null,
                    "commit": {"sha": "c9", "html_url": "https://github.com/octo/hello-world/commit/c9"}
                }));
            })
            .await;

        let write = client(&server)
            .delete_contents(&repo(), "docs/old.md", "remove", "s1", "main")
            .await
            .expect("delete");

        mock.assert_async().await;
        assert_eq!(write.commit.sha.as_deref(), Some("c9"));
        assert_eq!(write.content_sha, None);
    }

    #[tokio::test]
    async fn create_pull_request_posts_title_body_head_and_base() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/repos/octo/hello-world/pulls")
                    .json_body(json!({
                        "title": "Add login",
                        "body": "Adds the login page",
                        "head": "forker:feature",
                        "base": "main"
                    }));
                then.status(201).json_body(json!({
                    "id": 55,
                    "number": 3,
                    "title": "Add login",
                    "html_url": "https://github.com/octo/hello-world/pull/3",
                    "state": "open"
                }));
            })
            .await;

        let pr = client(&server)
            .create_pull_request(
                &repo(),
                &NewPullRequest {
                    title: "Add login".to_string(),
                    body: "Adds the login page".to_string(),
                    head: "forker:feature".to_string(),
                    base: "main".to_string(),
                },
            )
            .await
            .expect("pull request");

        mock.assert_async().await;
        assert_eq!(pr.number, Some(3));
        assert_eq!(
            pr.url.as_deref(),
            Some("https://github.com/octo/hello-world/pull/3")
        );
        assert_eq!(pr.state.as_deref(), Some("open"));
    }

    #[tokio::test]
    async fn default_branch_falls_back_to_main() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octo/hello-world");
                then.status(200).json_body(json!({"id": 1}));
            })
            .await;

        let branch = client(&server)
            .default_branch(&repo())
            .await
            .expect("default branch");

        assert_eq!(branch, "main");
    }
}
