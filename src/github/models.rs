//! Payload shapes returned to MCP clients.
//!
//! Serialized field names are the Portuguese keys existing clients read.

use serde::Serialize;

/// `owner/name` pair identifying a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub login: Option<String>,
    #[serde(rename = "nome")]
    pub name: Option<String>,
    pub id: Option<u64>,
    pub url: Option<String>,
    #[serde(rename = "tipo")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Repository {
    pub id: Option<u64>,
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "nome_completo")]
    pub full_name: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "privado")]
    pub private: Option<bool>,
    pub default_branch: Option<String>,
    #[serde(rename = "linguagem")]
    pub language: Option<String>,
    #[serde(rename = "data_atualizacao")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Branch {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    pub commit_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContentEntry {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "caminho")]
    pub path: Option<String>,
    /// `file`, `dir`, `symlink` or `submodule`.
    #[serde(rename = "tipo")]
    pub kind: Option<String>,
    /// Only reported for files.
    #[serde(rename = "tamanho")]
    pub size: Option<u64>,
    pub url: Option<String>,
    pub sha: Option<String>,
}

/// Raw contents entry for a single path, as GitHub returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub name: Option<String>,
    pub path: Option<String>,
    pub kind: Option<String>,
    pub size: Option<u64>,
    pub sha: Option<String>,
    pub url: Option<String>,
    /// Base64 with embedded line breaks.
    pub encoded_content: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileContent {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "caminho")]
    pub path: Option<String>,
    #[serde(rename = "tamanho")]
    pub size: Option<u64>,
    pub sha: Option<String>,
    #[serde(rename = "conteudo")]
    pub content: String,
    pub url: Option<String>,
    pub branch: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommitLink {
    pub sha: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileLink {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "caminho")]
    pub path: String,
    pub sha: Option<String>,
    pub url: Option<String>,
}

/// Body of a contents PUT.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PutFileRequest {
    pub message: String,
    /// Base64 encoded file content.
    pub content: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Response of a contents PUT or DELETE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentsWrite {
    pub commit: CommitLink,
    pub content_sha: Option<String>,
    pub content_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum WriteOperation {
    #[serde(rename = "criado")]
    Created,
    #[serde(rename = "atualizado")]
    Updated,
}

impl WriteOperation {
    pub fn as_verb(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileWrite {
    #[serde(rename = "operacao")]
    pub operation: WriteOperation,
    pub commit: CommitLink,
    #[serde(rename = "arquivo")]
    pub file: FileLink,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileDeletion {
    pub commit: CommitLink,
}

/// One file of a multi-file commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub content: String,
}

/// Commit object as needed for building on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha: String,
    pub tree_sha: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreatedCommit {
    pub sha: String,
    pub url: String,
    #[serde(rename = "mensagem")]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MultiFileCommit {
    pub commit: CreatedCommit,
    #[serde(rename = "arquivos_alterados")]
    pub changed_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreatedBranch {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub sha: String,
    pub url: String,
    pub base: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PullRequest {
    pub id: Option<u64>,
    #[serde(rename = "numero")]
    pub number: Option<u64>,
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "estado")]
    pub state: Option<String>,
}
