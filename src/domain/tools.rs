//! GitHub tools exposed via Model Context Protocol
//!
//! Each tool validates its arguments, runs the matching workflow from
//! `domain::operations` and returns a payload carrying `sucesso` and
//! `mensagem`. The same payload backs both `tools/call` and the legacy
//! `invoke` method.

use rust_mcp_sdk::{
    macros,
    schema::{CallToolRequestParams, CallToolResult, ContentBlock, TextContent, Tool},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::domain::operations::{self, WriteFileInput};
use crate::domain::utils::{
    normalize_branch, normalize_file_path, normalize_optional_branch, normalize_path,
    normalize_pull_request_head, normalize_username, optional_text, parse_repo, require_all,
};
use crate::github::{
    models::{FileChange, NewPullRequest, RepoRef},
    GitHubProvider,
};
use crate::mcp::rpc::{
    app_error_to_json_rpc, json_rpc_error, json_rpc_error_with_data, json_rpc_result,
};
use crate::{errors::AppError, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    ListRepositories,
    ListBranches,
    ListFiles,
    ReadFile,
    WriteFile,
    DeleteFile,
    CreateBranch,
    CommitFiles,
    CreatePullRequest,
    TestConnection,
}

impl ToolName {
    pub const ALL: [ToolName; 10] = [
        Self::ListRepositories,
        Self::ListBranches,
        Self::ListFiles,
        Self::ReadFile,
        Self::WriteFile,
        Self::DeleteFile,
        Self::CreateBranch,
        Self::CommitFiles,
        Self::CreatePullRequest,
        Self::TestConnection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListRepositories => "gh_listar_repositorios",
            Self::ListBranches => "gh_listar_branches",
            Self::ListFiles => "gh_listar_arquivos",
            Self::ReadFile => "gh_obter_conteudo_arquivo",
            Self::WriteFile => "gh_atualizar_arquivo",
            Self::DeleteFile => "gh_excluir_arquivo",
            Self::CreateBranch => "gh_criar_branch",
            Self::CommitFiles => "gh_criar_commit_multiplo",
            Self::CreatePullRequest => "gh_criar_pull_request",
            Self::TestConnection => "gh_testar_conexao",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[macros::mcp_tool(
    name = "gh_listar_repositorios",
    description = "List repositories of the authenticated user, or of another user when username is given"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct ListRepositoriesTool {
    /// GitHub login whose public repositories are listed
    pub username: Option<String>,
}

#[macros::mcp_tool(
    name = "gh_listar_branches",
    description = "List the branches of a repository"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct ListBranchesTool {
    /// Repository owner (user or organization)
    pub repo_owner: String,
    /// Repository name
    pub repo_name: String,
}

#[macros::mcp_tool(
    name = "gh_listar_arquivos",
    description = "List files and directories at a path of a repository"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct ListFilesTool {
    /// Repository owner (user or organization)
    pub repo_owner: String,
    /// Repository name
    pub repo_name: String,
    /// Directory path, repository root when omitted
    pub path: Option<String>,
    /// Branch name, default branch when omitted
    pub branch: Option<String>,
}

#[macros::mcp_tool(
    name = "gh_obter_conteudo_arquivo",
    description = "Read the text content of a file"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct ReadFileTool {
    /// Repository owner (user or organization)
    pub repo_owner: String,
    /// Repository name
    pub repo_name: String,
    /// File path inside the repository
    pub path: String,
    /// Branch name, default branch when omitted
    pub branch: Option<String>,
}

#[macros::mcp_tool(
    name = "gh_atualizar_arquivo",
    description = "Create a file or update an existing one with a single commit"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct WriteFileTool {
    /// Repository owner (user or organization)
    pub repo_owner: String,
    /// Repository name
    pub repo_name: String,
    /// File path inside the repository
    pub path: String,
    /// New file content as text
    pub conteudo: String,
    /// Commit message
    pub mensagem_commit: String,
    /// Branch name, default branch when omitted
    pub branch: Option<String>,
    /// Blob sha of the file being replaced, looked up when omitted
    pub sha: Option<String>,
}

#[macros::mcp_tool(name = "gh_excluir_arquivo", description = "Delete a file with a single commit")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct DeleteFileTool {
    /// Repository owner (user or organization)
    pub repo_owner: String,
    /// Repository name
    pub repo_name: String,
    /// File path inside the repository
    pub path: String,
    /// Commit message
    pub mensagem_commit: String,
    /// Branch name, default branch when omitted
    pub branch: Option<String>,
}

#[macros::mcp_tool(
    name = "gh_criar_branch",
    description = "Create a branch pointing at the head of a base branch"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct CreateBranchTool {
    /// Repository owner (user or organization)
    pub repo_owner: String,
    /// Repository name
    pub repo_name: String,
    /// Name of the new branch
    pub nome_branch: String,
    /// Branch to start from, default branch when omitted
    pub branch_base: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct FileChangeArgument {
    /// File path inside the repository
    pub path: String,
    /// Full file content as text
    pub conteudo: String,
}

#[macros::mcp_tool(
    name = "gh_criar_commit_multiplo",
    description = "Create or replace several files in one commit"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct CommitFilesTool {
    /// Repository owner (user or organization)
    pub repo_owner: String,
    /// Repository name
    pub repo_name: String,
    /// Commit message
    pub mensagem_commit: String,
    /// Files to write, at least one
    pub alteracoes: Vec<FileChangeArgument>,
    /// Branch name, default branch when omitted
    pub branch: Option<String>,
}

#[macros::mcp_tool(name = "gh_criar_pull_request", description = "Open a pull request")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct CreatePullRequestTool {
    /// Repository owner (user or organization)
    pub repo_owner: String,
    /// Repository name
    pub repo_name: String,
    /// Pull request title
    pub titulo: String,
    /// Pull request body
    pub descricao: String,
    /// Branch with the changes
    pub branch_origem: String,
    /// Branch the changes should be merged into
    pub branch_destino: String,
}

#[macros::mcp_tool(
    name = "gh_testar_conexao",
    description = "Check the GitHub token by fetching the authenticated user"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct TestConnectionTool {}

pub fn build_tools_list() -> Vec<Tool> {
    vec![
        ListRepositoriesTool::tool(),
        ListBranchesTool::tool(),
        ListFilesTool::tool(),
        ReadFileTool::tool(),
        WriteFileTool::tool(),
        DeleteFileTool::tool(),
        CreateBranchTool::tool(),
        CommitFilesTool::tool(),
        CreatePullRequestTool::tool(),
        TestConnectionTool::tool(),
    ]
}

/// Union of every tool argument. Presence is checked per tool so missing
/// values can be reported together.
#[derive(Debug, Default, Deserialize)]
pub struct ToolArguments {
    pub username: Option<String>,
    pub repo_owner: Option<String>,
    pub repo_name: Option<String>,
    pub path: Option<String>,
    pub branch: Option<String>,
    pub conteudo: Option<String>,
    pub mensagem_commit: Option<String>,
    pub sha: Option<String>,
    pub nome_branch: Option<String>,
    pub branch_base: Option<String>,
    pub alteracoes: Option<Vec<FileChangeParams>>,
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub branch_origem: Option<String>,
    pub branch_destino: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FileChangeParams {
    pub path: Option<String>,
    pub conteudo: Option<String>,
}

impl ToolArguments {
    pub fn from_map(arguments: Map<String, Value>) -> Result<Self, AppError> {
        serde_json::from_value(Value::Object(arguments))
            .map_err(|err| AppError::bad_request("invalid_arguments", err.to_string()))
    }

    fn repo(&mut self) -> Result<RepoRef, AppError> {
        let [owner, name] = require_all([
            ("repo_owner", self.repo_owner.take()),
            ("repo_name", self.repo_name.take()),
        ])?;
        parse_repo(&owner, &name)
    }
}

fn success(message: String, fields: Value) -> Map<String, Value> {
    let mut payload = Map::from_iter([
        ("sucesso".to_string(), Value::Bool(true)),
        ("mensagem".to_string(), Value::String(message)),
    ]);
    if let Value::Object(fields) = fields {
        payload.extend(fields);
    }
    payload
}

pub fn failure_payload(err: &AppError) -> Map<String, Value> {
    Map::from_iter([
        ("sucesso".to_string(), Value::Bool(false)),
        ("mensagem".to_string(), Value::String(err.user_message())),
    ])
}

/// Runs `tool` and returns its success payload. Validation problems come back
/// as `BadRequest`, GitHub problems as `Upstream`.
pub async fn run_tool(
    github: &dyn GitHubProvider,
    tool: ToolName,
    arguments: Map<String, Value>,
) -> Result<Map<String, Value>, AppError> {
    let mut args = ToolArguments::from_map(arguments)?;

    match tool {
        ToolName::ListRepositories => {
            let username = normalize_username(args.username)?;
            let repositories = operations::list_repositories(github, username.as_deref()).await?;
            let message = match username.as_deref() {
                Some(username) => format!("Found {} repositories for {username}", repositories.len()),
                None => format!("Found {} repositories", repositories.len()),
            };
            Ok(success(message, json!({ "repositorios": repositories })))
        }
        ToolName::ListBranches => {
            let repo = args.repo()?;
            let branches = operations::list_branches(github, &repo).await?;
            Ok(success(
                format!("Found {} branches in {repo}", branches.len()),
                json!({ "branches": branches }),
            ))
        }
        ToolName::ListFiles => {
            let repo = args.repo()?;
            let path = normalize_path(args.path.as_deref().unwrap_or_default())?;
            let branch = normalize_optional_branch(args.branch)?;
            let listing = operations::list_files(github, &repo, &path, branch).await?;
            let shown_path = if path.is_empty() { "/" } else { path.as_str() };
            Ok(success(
                format!(
                    "Found {} items in {shown_path} on branch {}",
                    listing.entries.len(),
                    listing.branch
                ),
                json!({ "branch": listing.branch, "itens": listing.entries }),
            ))
        }
        ToolName::ReadFile => {
            let repo = args.repo()?;
            let [path] = require_all([("path", args.path)])?;
            let path = normalize_file_path(&path)?;
            let branch = normalize_optional_branch(args.branch)?;
            let file = operations::read_file(github, &repo, &path, branch).await?;
            Ok(success(
                format!("Read {path} from branch {}", file.branch),
                json!(file),
            ))
        }
        ToolName::WriteFile => {
            let repo = args.repo()?;
            let [path, content, message] = require_all([
                ("path", args.path),
                ("conteudo", args.conteudo),
                ("mensagem_commit", args.mensagem_commit),
            ])?;
            let path = normalize_file_path(&path)?;
            let write = operations::write_file(
                github,
                &repo,
                WriteFileInput {
                    path: path.clone(),
                    content,
                    message,
                    branch: normalize_optional_branch(args.branch)?,
                    sha: optional_text(args.sha),
                },
            )
            .await?;
            Ok(success(
                format!("File {path} {} successfully", write.operation.as_verb()),
                json!(write),
            ))
        }
        ToolName::DeleteFile => {
            let repo = args.repo()?;
            let [path, message] = require_all([
                ("path", args.path),
                ("mensagem_commit", args.mensagem_commit),
            ])?;
            let path = normalize_file_path(&path)?;
            let branch = normalize_optional_branch(args.branch)?;
            let deletion = operations::delete_file(github, &repo, &path, &message, branch).await?;
            Ok(success(
                format!("File {path} deleted successfully"),
                json!(deletion),
            ))
        }
        ToolName::CreateBranch => {
            let repo = args.repo()?;
            let [name] = require_all([("nome_branch", args.nome_branch)])?;
            let name = normalize_branch(&name)?;
            let base = normalize_optional_branch(args.branch_base)?;
            let branch = operations::create_branch(github, &repo, &name, base).await?;
            Ok(success(
                format!("Branch {} created from {}", branch.name, branch.base),
                json!({ "branch": branch }),
            ))
        }
        ToolName::CommitFiles => {
            let repo = args.repo()?;
            let [message] = require_all([("mensagem_commit", args.mensagem_commit)])?;
            let changes = file_changes(args.alteracoes)?;
            let branch = normalize_optional_branch(args.branch)?;
            let commit = operations::commit_files(github, &repo, &message, &changes, branch).await?;
            Ok(success(
                format!("Commit created with {} changed files", changes.len()),
                json!(commit),
            ))
        }
        ToolName::CreatePullRequest => {
            let repo = args.repo()?;
            let [title, body, head, base] = require_all([
                ("titulo", args.titulo),
                ("descricao", args.descricao),
                ("branch_origem", args.branch_origem),
                ("branch_destino", args.branch_destino),
            ])?;
            let request = NewPullRequest {
                title,
                body,
                head: normalize_pull_request_head(&head)?,
                base: normalize_branch(&base)?,
            };
            let pull_request = operations::create_pull_request(github, &repo, &request).await?;
            let message = match pull_request.number {
                Some(number) => format!("Pull request #{number} created"),
                None => "Pull request created".to_string(),
            };
            Ok(success(message, json!({ "pull_request": pull_request })))
        }
        ToolName::TestConnection => {
            let user = operations::test_connection(github).await?;
            let login = user.login.as_deref().unwrap_or("unknown user");
            Ok(success(
                format!("Connected to GitHub as {login}"),
                json!({ "usuario": user }),
            ))
        }
    }
}

fn file_changes(changes: Option<Vec<FileChangeParams>>) -> Result<Vec<FileChange>, AppError> {
    let changes = changes.filter(|changes| !changes.is_empty()).ok_or_else(|| {
        AppError::bad_request(
            "missing_arguments",
            "alteracoes must contain at least one change",
        )
    })?;

    changes
        .into_iter()
        .map(|change| {
            let Some(path) = optional_text(change.path) else {
                return Err(AppError::bad_request(
                    "invalid_arguments",
                    "every entry of alteracoes needs path and conteudo",
                ));
            };
            let Some(content) = change.conteudo else {
                return Err(AppError::bad_request(
                    "invalid_arguments",
                    "every entry of alteracoes needs path and conteudo",
                ));
            };
            Ok(FileChange {
                path: normalize_file_path(&path)?,
                content,
            })
        })
        .collect()
}

fn tool_not_found(id: Option<Value>, name: &str) -> Value {
    json_rpc_error_with_data(
        id,
        -32601,
        "Method not found",
        Some(json!({
            "code": "tool_not_found",
            "message": "unknown tool name",
            "details": {
                "name": name,
            },
        })),
    )
}

pub async fn handle_tools_call(
    state: &AppState,
    id: Option<Value>,
    params: Option<Value>,
) -> Value {
    let Some(raw_params) = params else {
        return json_rpc_error(id, -32602, "Invalid params");
    };

    let tool_call: CallToolRequestParams = match serde_json::from_value(raw_params) {
        Ok(value) => value,
        Err(_) => return json_rpc_error(id, -32602, "Invalid params"),
    };

    let Some(tool) = ToolName::parse(&tool_call.name) else {
        return tool_not_found(id, &tool_call.name);
    };

    let arguments = tool_call.arguments.unwrap_or_default();
    let (payload, is_error) = match run_tool(state.github.as_ref(), tool, arguments).await {
        Ok(payload) => (payload, None),
        Err(err @ AppError::Upstream { .. }) => {
            warn!(tool = %tool, error = %err, "github tool call failed");
            (failure_payload(&err), Some(true))
        }
        Err(err) => return app_error_to_json_rpc(id, err),
    };

    let summary = payload
        .get("mensagem")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let result = CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(summary, None, None))],
        is_error,
        meta: None,
        structured_content: Some(payload),
    };

    json_rpc_result(
        id,
        serde_json::to_value(result).expect("tools/call result serialization"),
    )
}

#[derive(Debug, Deserialize)]
struct InvokeParams {
    method: String,
    arguments: Option<Map<String, Value>>,
}

/// Legacy `invoke`: `params.method` names the tool and the raw payload is the
/// JSON-RPC result, failures included.
pub async fn handle_legacy_invoke(
    state: &AppState,
    id: Option<Value>,
    params: Option<Value>,
) -> Value {
    let Some(raw_params) = params else {
        return json_rpc_error(id, -32602, "Invalid params");
    };

    let invoke: InvokeParams = match serde_json::from_value(raw_params) {
        Ok(value) => value,
        Err(_) => return json_rpc_error(id, -32602, "Invalid params"),
    };

    let Some(tool) = ToolName::parse(&invoke.method) else {
        return tool_not_found(id, &invoke.method);
    };

    match run_tool(state.github.as_ref(), tool, invoke.arguments.unwrap_or_default()).await {
        Ok(payload) => json_rpc_result(id, Value::Object(payload)),
        Err(err @ AppError::Upstream { .. }) => {
            warn!(tool = %tool, error = %err, "github tool invocation failed");
            json_rpc_result(id, Value::Object(failure_payload(&err)))
        }
        Err(err) => app_error_to_json_rpc(id, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::operations::fake::FakeGitHub;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object arguments")
    }

    #[test]
    fn tool_list_matches_tool_names() {
        let listed = build_tools_list()
            .into_iter()
            .map(|tool| tool.name)
            .collect::<Vec<_>>();
        let known = ToolName::ALL
            .iter()
            .map(|tool| tool.as_str().to_string())
            .collect::<Vec<_>>();

        assert_eq!(listed, known);
    }

    #[test]
    fn parses_known_tool_names_only() {
        assert_eq!(
            ToolName::parse("gh_excluir_arquivo"),
            Some(ToolName::DeleteFile)
        );
        assert_eq!(ToolName::parse("gh_unknown"), None);
    }

    #[tokio::test]
    async fn reports_all_missing_repository_arguments() {
        let github = FakeGitHub::default();

        let err = run_tool(&github, ToolName::ListBranches, args(json!({ "repo_owner": "" })))
            .await
            .expect_err("missing arguments");

        assert_eq!(
            err.to_string(),
            "bad request: repo_owner and repo_name are required"
        );
    }

    #[tokio::test]
    async fn rejects_wrongly_typed_arguments() {
        let github = FakeGitHub::default();

        let err = run_tool(
            &github,
            ToolName::ListBranches,
            args(json!({ "repo_owner": 7, "repo_name": "x" })),
        )
        .await
        .expect_err("invalid type");

        assert!(matches!(
            err,
            AppError::BadRequest {
                code: "invalid_arguments",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn read_file_payload_is_flat() {
        let github = FakeGitHub::default().with_file("main", "README.md", "# hi\n");

        let payload = run_tool(
            &github,
            ToolName::ReadFile,
            args(json!({
                "repo_owner": "octocat",
                "repo_name": "hello-world",
                "path": "/README.md"
            })),
        )
        .await
        .expect("payload");

        assert_eq!(payload["sucesso"], json!(true));
        assert_eq!(payload["conteudo"], json!("# hi\n"));
        assert_eq!(payload["caminho"], json!("README.md"));
        assert_eq!(payload["branch"], json!("main"));
        assert_eq!(payload["mensagem"], json!("Read README.md from branch main"));
    }

    #[tokio::test]
    async fn write_file_reports_operation() {
        let github = FakeGitHub::default();

        let payload = run_tool(
            &github,
            ToolName::WriteFile,
            args(json!({
                "repo_owner": "octocat",
                "repo_name": "hello-world",
                "path": "notes.md",
                "conteudo": "hello",
                "mensagem_commit": "add notes"
            })),
        )
        .await
        .expect("payload");

        assert_eq!(payload["operacao"], json!("criado"));
        assert_eq!(payload["arquivo"]["nome"], json!("notes.md"));
        assert_eq!(payload["commit"]["sha"], json!("put-commit"));
        assert_eq!(payload["mensagem"], json!("File notes.md created successfully"));
    }

    #[tokio::test]
    async fn commit_files_requires_changes() {
        let github = FakeGitHub::default();

        let err = run_tool(
            &github,
            ToolName::CommitFiles,
            args(json!({
                "repo_owner": "octocat",
                "repo_name": "hello-world",
                "mensagem_commit": "batch",
                "alteracoes": []
            })),
        )
        .await
        .expect_err("empty changes");

        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn commit_files_accepts_empty_file_content() {
        let github = FakeGitHub::default();

        let payload = run_tool(
            &github,
            ToolName::CommitFiles,
            args(json!({
                "repo_owner": "octocat",
                "repo_name": "hello-world",
                "mensagem_commit": "batch",
                "alteracoes": [
                    { "path": "a.txt", "conteudo": "" },
                    { "path": "b/c.txt", "conteudo": "c" }
                ]
            })),
        )
        .await
        .expect("payload");

        assert_eq!(payload["arquivos_alterados"], json!(["a.txt", "b/c.txt"]));
        assert_eq!(payload["commit"]["mensagem"], json!("batch"));
    }

    #[tokio::test]
    async fn create_branch_payload_wraps_branch() {
        let github = FakeGitHub::default();

        let payload = run_tool(
            &github,
            ToolName::CreateBranch,
            args(json!({
                "repo_owner": "octocat",
                "repo_name": "hello-world",
                "nome_branch": "feature/x"
            })),
        )
        .await
        .expect("payload");

        assert_eq!(payload["branch"]["ref"], json!("refs/heads/feature/x"));
        assert_eq!(payload["branch"]["base"], json!("main"));
    }

    #[tokio::test]
    async fn pull_request_validates_branch_names() {
        let github = FakeGitHub::default();

        let err = run_tool(
            &github,
            ToolName::CreatePullRequest,
            args(json!({
                "repo_owner": "octocat",
                "repo_name": "hello-world",
                "titulo": "t",
                "descricao": "d",
                "branch_origem": "bad branch",
                "branch_destino": "main"
            })),
        )
        .await
        .expect_err("invalid branch");

        assert!(matches!(
            err,
            AppError::BadRequest {
                code: "invalid_branch",
                ..
            }
        ));
        assert!(github.calls().is_empty());
    }

    #[tokio::test]
    async fn pull_request_payload_describes_created_pull_request() {
        let github = FakeGitHub::default();

        let payload = run_tool(
            &github,
            ToolName::CreatePullRequest,
            args(json!({
                "repo_owner": "octocat",
                "repo_name": "hello-world",
                "titulo": "Add login",
                "descricao": "Adds the login page",
                "branch_origem": "forker:feature",
                "branch_destino": "main"
            })),
        )
        .await
        .expect("payload");

        assert_eq!(payload["mensagem"], json!("Pull request #7 created"));
        assert_eq!(
            payload["pull_request"],
            json!({
                "id": 9001,
                "numero": 7,
                "titulo": "Add login",
                "url": "https://github.com/octocat/hello-world/pull/7",
                "estado": "open"
            })
        );
        assert_eq!(github.calls(), vec!["pr forker:feature -> main".to_string()]);
    }

    #[tokio::test]
    async fn list_repositories_payload_uses_portuguese_keys() {
        let github = FakeGitHub::default();

        let payload = run_tool(
            &github,
            ToolName::ListRepositories,
            args(json!({ "username": "someone" })),
        )
        .await
        .expect("payload");

        let repository = &payload["repositorios"][0];
        assert_eq!(payload["mensagem"], json!("Found 1 repositories for someone"));
        assert_eq!(repository["nome_completo"], json!("someone/hello-world"));
        assert_eq!(repository["privado"], json!(false));
        assert_eq!(repository["data_atualizacao"], json!("2026-10-01T00:00:00Z"));
        assert_eq!(repository["linguagem"], json!("Rust"));
    }

    #[tokio::test]
    async fn list_files_payload_has_null_size_for_directories() {
        let github = FakeGitHub::default();

        let payload = run_tool(
            &github,
            ToolName::ListFiles,
            args(json!({ "repo_owner": "octocat", "repo_name": "hello-world" })),
        )
        .await
        .expect("payload");

        assert_eq!(payload["branch"], json!("main"));
        assert_eq!(payload["mensagem"], json!("Found 2 items in / on branch main"));
        assert_eq!(payload["itens"][0]["tipo"], json!("dir"));
        assert_eq!(payload["itens"][0]["tamanho"], Value::Null);
        assert_eq!(payload["itens"][1]["caminho"], json!("README.md"));
        assert_eq!(payload["itens"][1]["tamanho"], json!(5));
    }

    #[tokio::test]
    async fn delete_file_payload_carries_commit() {
        let github = FakeGitHub::default().with_file("main", "old.txt", "bye");

        let payload = run_tool(
            &github,
            ToolName::DeleteFile,
            args(json!({
                "repo_owner": "octocat",
                "repo_name": "hello-world",
                "path": "old.txt",
                "mensagem_commit": "remove"
            })),
        )
        .await
        .expect("payload");

        assert_eq!(payload["mensagem"], json!("File old.txt deleted successfully"));
        assert_eq!(
            payload["commit"],
            json!({ "sha": "delete-commit", "url": null })
        );
    }

    #[tokio::test]
    async fn root_path_is_rejected_for_file_tools() {
        let github = FakeGitHub::default();

        for (tool, arguments) in [
            (
                ToolName::ReadFile,
                json!({ "repo_owner": "octocat", "repo_name": "hello-world", "path": "/" }),
            ),
            (
                ToolName::WriteFile,
                json!({
                    "repo_owner": "octocat",
                    "repo_name": "hello-world",
                    "path": "/",
                    "conteudo": "x",
                    "mensagem_commit": "m"
                }),
            ),
            (
                ToolName::DeleteFile,
                json!({
                    "repo_owner": "octocat",
                    "repo_name": "hello-world",
                    "path": "//",
                    "mensagem_commit": "m"
                }),
            ),
            (
                ToolName::CommitFiles,
                json!({
                    "repo_owner": "octocat",
                    "repo_name": "hello-world",
                    "mensagem_commit": "m",
                    "alteracoes": [{ "path": "/", "conteudo": "x" }]
                }),
            ),
        ] {
            let err = run_tool(&github, tool, args(arguments))
                .await
                .expect_err("root path");

            assert!(
                matches!(
                    err,
                    AppError::BadRequest {
                        code: "missing_arguments",
                        ..
                    }
                ),
                "{tool}: {err:?}"
            );
        }
        assert!(github.calls().is_empty());
    }

    #[tokio::test]
    async fn connection_failure_is_upstream_error() {
        let github = FakeGitHub {
            fail_user: true,
            ..FakeGitHub::default()
        };

        let err = run_tool(&github, ToolName::TestConnection, Map::new())
            .await
            .expect_err("bad credentials");

        assert_eq!(
            failure_payload(&err),
            args(json!({
                "sucesso": false,
                "mensagem": "GitHub returned 401: Bad credentials"
            }))
        );
    }
}
