//! GitHub workflows behind the MCP tools
//!
//! Each function composes `GitHubProvider` primitives: default-branch
//! resolution, sha lookups before writes, and the ref/tree/commit sequence of
//! a multi-file commit.

use tracing::debug;

use crate::domain::utils::{decode_content, encode_content, file_name};
use crate::errors::AppError;
use crate::github::{
    models::{
        AuthenticatedUser, Branch, ContentEntry, CreatedBranch, CreatedCommit, FileChange,
        FileContent, FileDeletion, FileLink, FileWrite, MultiFileCommit, NewPullRequest,
        PullRequest, PutFileRequest, RepoRef, Repository, WriteOperation,
    },
    GitHubProvider,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListing {
    pub branch: String,
    pub entries: Vec<ContentEntry>,
}

#[derive(Debug, Clone)]
pub struct WriteFileInput {
    pub path: String,
    pub content: String,
    pub message: String,
    pub branch: Option<String>,
    pub sha: Option<String>,
}

pub async fn resolve_branch(
    github: &dyn GitHubProvider,
    repo: &RepoRef,
    branch: Option<String>,
) -> Result<String, AppError> {
    match branch {
        Some(branch) => Ok(branch),
        None => {
            let branch = github.default_branch(repo).await?;
            debug!(repo = %repo, branch = %branch, "resolved default branch");
            Ok(branch)
        }
    }
}

pub async fn test_connection(github: &dyn GitHubProvider) -> Result<AuthenticatedUser, AppError> {
    github.authenticated_user().await
}

pub async fn list_repositories(
    github: &dyn GitHubProvider,
    username: Option<&str>,
) -> Result<Vec<Repository>, AppError> {
    github.list_repositories(username).await
}

pub async fn list_branches(
    github: &dyn GitHubProvider,
    repo: &RepoRef,
) -> Result<Vec<Branch>, AppError> {
    github.list_branches(repo).await
}

pub async fn list_files(
    github: &dyn GitHubProvider,
    repo: &RepoRef,
    path: &str,
    branch: Option<String>,
) -> Result<FileListing, AppError> {
    let branch = resolve_branch(github, repo, branch).await?;
    let entries = github.list_contents(repo, path, &branch).await?;
    Ok(FileListing { branch, entries })
}

pub async fn read_file(
    github: &dyn GitHubProvider,
    repo: &RepoRef,
    path: &str,
    branch: Option<String>,
) -> Result<FileContent, AppError> {
    let branch = resolve_branch(github, repo, branch).await?;
    let blob = github.get_contents(repo, path, &branch).await?;

    if blob.kind.as_deref() != Some("file") {
        return Err(AppError::upstream(None, format!("path '{path}' is not a file")));
    }

    let content = decode_content(blob.encoded_content.as_deref().unwrap_or_default(), path)?;

    Ok(FileContent {
        name: blob.name,
        path: blob.path,
        size: blob.size,
        sha: blob.sha,
        content,
        url: blob.url,
        branch,
    })
}

/// Creates the file, or updates it when a sha is given or one can be found on
/// the target branch.
pub async fn write_file(
    github: &dyn GitHubProvider,
    repo: &RepoRef,
    input: WriteFileInput,
) -> Result<FileWrite, AppError> {
    let branch = resolve_branch(github, repo, input.branch).await?;

    let sha = match input.sha {
        Some(sha) => Some(sha),
        None => match github.get_contents(repo, &input.path, &branch).await {
            Ok(existing) if existing.kind.as_deref() == Some("file") => existing.sha,
            Ok(_) => None,
            Err(err) => {
                debug!(repo = %repo, path = %input.path, error = %err, "no existing file, creating");
                None
            }
        },
    };

    let operation = if sha.is_some() {
        WriteOperation::Updated
    } else {
        WriteOperation::Created
    };

    let request = PutFileRequest {
        message: input.message,
        content: encode_content(&input.content),
        branch,
        sha,
    };
    let write = github.put_contents(repo, &input.path, &request).await?;

    Ok(FileWrite {
        operation,
        commit: write.commit,
        file: FileLink {
            name: file_name(&input.path).to_string(),
            path: input.path,
            sha: write.content_sha,
            url: write.content_url,
        },
    })
}

pub async fn delete_file(
    github: &dyn GitHubProvider,
    repo: &RepoRef,
    path: &str,
    message: &str,
    branch: Option<String>,
) -> Result<FileDeletion, AppError> {
    let existing = read_file(github, repo, path, branch).await?;
    let sha = existing
        .sha
        .ok_or_else(|| AppError::upstream(None, format!("GitHub returned no sha for '{path}'")))?;

    let write = github
        .delete_contents(repo, path, message, &sha, &existing.branch)
        .await?;

    Ok(FileDeletion {
        commit: write.commit,
    })
}

/// Commits every change on top of the branch head and fast-forwards the branch.
pub async fn commit_files(
    github: &dyn GitHubProvider,
    repo: &RepoRef,
    message: &str,
    changes: &[FileChange],
    branch: Option<String>,
) -> Result<MultiFileCommit, AppError> {
    if changes.is_empty() {
        return Err(AppError::bad_request(
            "missing_arguments",
            "alteracoes must contain at least one change",
        ));
    }

    let branch = resolve_branch(github, repo, branch).await?;
    let head = github.branch_head(repo, &branch).await?;
    let parent = github.get_commit(repo, &head).await?;
    let tree_sha = github.create_tree(repo, &parent.tree_sha, changes).await?;
    let commit_sha = github
        .create_commit(repo, message, &tree_sha, &[parent.sha])
        .await?;
    github.update_branch(repo, &branch, &commit_sha).await?;

    debug!(repo = %repo, branch = %branch, commit = %commit_sha, files = changes.len(), "multi-file commit created");

    Ok(MultiFileCommit {
        commit: CreatedCommit {
            url: format!(
                "{}/{}/{}/commit/{}",
                github.web_url(),
                repo.owner,
                repo.name,
                commit_sha
            ),
            sha: commit_sha,
            message: message.to_string(),
        },
        changed_paths: changes.iter().map(|change| change.path.clone()).collect(),
    })
}

pub async fn create_branch(
    github: &dyn GitHubProvider,
    repo: &RepoRef,
    name: &str,
    base: Option<String>,
) -> Result<CreatedBranch, AppError> {
    let base = resolve_branch(github, repo, base).await?;
    let sha = github.branch_head(repo, &base).await?;
    github.create_branch(repo, name, &sha).await?;

    Ok(CreatedBranch {
        name: name.to_string(),
        reference: format!("refs/heads/{name}"),
        url: format!(
            "{}/{}/{}/tree/{}",
            github.web_url(),
            repo.owner,
            repo.name,
            name
        ),
        sha,
        base,
    })
}

pub async fn create_pull_request(
    github: &dyn GitHubProvider,
    repo: &RepoRef,
    request: &NewPullRequest,
) -> Result<PullRequest, AppError> {
    github.create_pull_request(repo, request).await
}
