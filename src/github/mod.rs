//! GitHub REST API access
//!
//! `GitHubProvider` is the seam between the MCP tools and GitHub; `GitHubClient`
//! is the reqwest-backed implementation used in production.

pub mod client;
pub mod models;

use async_trait::async_trait;

use crate::errors::AppError;
use models::{
    AuthenticatedUser, Branch, CommitInfo, ContentEntry, ContentsWrite, FileBlob, FileChange,
    NewPullRequest, PullRequest, PutFileRequest, RepoRef, Repository,
};

pub use client::GitHubClient;

/// Single-call GitHub primitives. Multi-step workflows are composed in
/// `domain::operations`.
#[async_trait]
pub trait GitHubProvider: Send + Sync {
    /// Base for html links GitHub does not return itself.
    fn web_url(&self) -> &str;

    async fn authenticated_user(&self) -> Result<AuthenticatedUser, AppError>;

    /// Repositories of `username`, or of the authenticated user when `None`.
    async fn list_repositories(&self, username: Option<&str>)
        -> Result<Vec<Repository>, AppError>;

    async fn default_branch(&self, repo: &RepoRef) -> Result<String, AppError>;

    async fn list_branches(&self, repo: &RepoRef) -> Result<Vec<Branch>, AppError>;

    async fn list_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
    ) -> Result<Vec<ContentEntry>, AppError>;

    async fn get_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
    ) -> Result<FileBlob, AppError>;

    async fn put_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        request: &PutFileRequest,
    ) -> Result<ContentsWrite, AppError>;

    async fn delete_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        message: &str,
        sha: &str,
        branch: &str,
    ) -> Result<ContentsWrite, AppError>;

    /// Commit sha `refs/heads/<branch>` points at.
    async fn branch_head(&self, repo: &RepoRef, branch: &str) -> Result<String, AppError>;

    async fn get_commit(&self, repo: &RepoRef, sha: &str) -> Result<CommitInfo, AppError>;

    /// Creates a tree on top of `base_tree` with one regular-file blob per change.
    async fn create_tree(
        &self,
        repo: &RepoRef,
        base_tree: &str,
        changes: &[FileChange],
    ) -> Result<String, AppError>;

    async fn create_commit(
        &self,
        repo: &RepoRef,
        message: &str,
        tree_sha: &str,
        parents: &[String],
    ) -> Result<String, AppError>;

    /// Fast-forwards `refs/heads/<branch>` to `sha`.
    async fn update_branch(&self, repo: &RepoRef, branch: &str, sha: &str)
        -> Result<(), AppError>;

    async fn create_branch(&self, repo: &RepoRef, branch: &str, sha: &str)
        -> Result<(), AppError>;

    async fn create_pull_request(
        &self,
        repo: &RepoRef,
        request: &NewPullRequest,
    ) -> Result<PullRequest, AppError>;
}
