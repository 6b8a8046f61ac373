//! Argument validation and content encoding shared by the tools

use std::sync::LazyLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;

use crate::{errors::AppError, github::models::RepoRef};

static REPO_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("repository segment pattern"));

/// Returns every required argument or a `missing_arguments` error naming the
/// whole required set. Only `null`, absent and empty strings count as missing.
pub fn require_all<const N: usize>(
    values: [(&'static str, Option<String>); N],
) -> Result<[String; N], AppError> {
    let names = values.iter().map(|(name, _)| *name).collect::<Vec<_>>();
    let mut present = Vec::with_capacity(N);

    for (_, value) in values {
        match value.filter(|value| !value.is_empty()) {
            Some(value) => present.push(value),
            None => {
                return Err(AppError::bad_request(
                    "missing_arguments",
                    format!("{} {} required", join_names(&names), verb(names.len())),
                ))
            }
        }
    }

    present
        .try_into()
        .map_err(|_| AppError::internal("required argument count mismatch"))
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn verb(count: usize) -> &'static str {
    if count == 1 {
        "is"
    } else {
        "are"
    }
}

/// Trims optional text arguments; blank values are treated as absent.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn parse_repo(owner: &str, name: &str) -> Result<RepoRef, AppError> {
    let owner = owner.trim();
    let name = name.trim();

    for segment in [owner, name] {
        if !REPO_SEGMENT.is_match(segment) || segment == "." || segment == ".." {
            return Err(AppError::bad_request(
                "invalid_repository",
                "repo_owner and repo_name must contain only alphanumeric characters, dashes, underscores and dots",
            ));
        }
    }

    Ok(RepoRef::new(owner, name))
}

pub fn normalize_username(username: Option<String>) -> Result<Option<String>, AppError> {
    let Some(username) = optional_text(username) else {
        return Ok(None);
    };

    if !REPO_SEGMENT.is_match(&username) {
        return Err(AppError::bad_request(
            "invalid_username",
            "username must contain only alphanumeric characters, dashes, underscores and dots",
        ));
    }

    Ok(Some(username))
}

/// Repository-relative path without leading or trailing slashes. Parent
/// segments are rejected.
pub fn normalize_path(path: &str) -> Result<String, AppError> {
    let normalized = path.trim().trim_matches('/');

    if normalized.split('/').any(|segment| segment == "..") {
        return Err(AppError::bad_request(
            "invalid_path",
            "path must not contain '..' segments",
        ));
    }

    Ok(normalized.to_string())
}

/// Like `normalize_path`, but the result must name something below the root.
pub fn normalize_file_path(path: &str) -> Result<String, AppError> {
    let normalized = normalize_path(path)?;
    if normalized.is_empty() {
        return Err(AppError::bad_request(
            "missing_arguments",
            "path must name a file inside the repository",
        ));
    }
    Ok(normalized)
}

pub fn normalize_branch(branch: &str) -> Result<String, AppError> {
    let normalized = branch.trim();

    if normalized.is_empty()
        || normalized.contains("..")
        || normalized.starts_with('/')
        || normalized.ends_with('/')
        || normalized
            .chars()
            .any(|character| character.is_whitespace() || "~^:?*[\\".contains(character))
    {
        return Err(AppError::bad_request(
            "invalid_branch",
            "branch must be a valid git branch name",
        ));
    }

    Ok(normalized.to_string())
}

/// Pull request head: a branch, optionally prefixed by `owner:` for a branch
/// of a fork.
pub fn normalize_pull_request_head(head: &str) -> Result<String, AppError> {
    let head = head.trim();
    let Some((owner, branch)) = head.split_once(':') else {
        return normalize_branch(head);
    };

    if !REPO_SEGMENT.is_match(owner) {
        return Err(AppError::bad_request(
            "invalid_branch",
            "branch_origem owner must contain only alphanumeric characters, dashes, underscores and dots",
        ));
    }

    Ok(format!("{owner}:{}", normalize_branch(branch)?))
}

pub fn normalize_optional_branch(branch: Option<String>) -> Result<Option<String>, AppError> {
    optional_text(branch)
        .map(|branch| normalize_branch(&branch))
        .transpose()
}

pub fn encode_content(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

/// Decodes GitHub's line-wrapped base64 file content into UTF-8 text.
pub fn decode_content(encoded: &str, path: &str) -> Result<String, AppError> {
    let compact = encoded
        .chars()
        .filter(|character| !character.is_ascii_whitespace())
        .collect::<String>();

    let bytes = STANDARD.decode(compact).map_err(|_| {
        AppError::upstream(None, format!("content of '{path}' is not valid base64"))
    })?;

    String::from_utf8(bytes)
        .map_err(|_| AppError::upstream(None, format!("file '{path}' is not valid UTF-8 text")))
}

/// Last path segment, used as the display name of a file.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
