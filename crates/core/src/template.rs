//! Presence template resolution
//!
//! Turns a configured template string into user-facing text by substituting a
//! closed set of placeholder tokens. Substitution is a single left-to-right
//! scan over the token table, so one token's value is never reinterpreted as
//! containing another live token and evaluation order cannot matter.

use crate::languages::title_case;

/// Two zero-width spaces.
///
/// Empty placeholder values render as this marker instead of the empty string
/// so downstream string operations can tell "intentionally blank" from
/// "absent".
pub const EMPTY_MARKER: &str = "\u{200b}\u{200b}";

/// Everything a template may reference, captured before resolution.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub app_name: String,
    pub file_name: Option<String>,
    pub directory_name: Option<String>,
    /// Directory of the active document relative to the workspace root
    pub full_directory_name: Option<String>,
    /// Display label from the language table (e.g. "Rust")
    pub language_label: Option<String>,
    pub total_lines: Option<u32>,
    /// 1-indexed
    pub current_line: Option<u32>,
    /// 1-indexed
    pub current_column: Option<u32>,
    pub file_size_bytes: Option<u64>,
    pub workspace: Option<String>,
    pub workspace_folder: Option<String>,
    pub git_branch: Option<String>,
    pub git_repo_name: Option<String>,
}

/// The closed set of recognized placeholder tokens (case-sensitive literals).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    AppName,
    CurrentColumn,
    CurrentLine,
    DirectoryName,
    Empty,
    FileName,
    FileSize,
    FullDirectoryName,
    GitBranch,
    GitRepoName,
    LanguageLower,
    LanguageTitle,
    LanguageUpper,
    TotalLines,
    Workspace,
    WorkspaceFolder,
    WorkspaceAndFolder,
}

const TOKENS: &[(&str, Token)] = &[
    ("{app_name}", Token::AppName),
    ("{current_column}", Token::CurrentColumn),
    ("{current_line}", Token::CurrentLine),
    ("{directory_name}", Token::DirectoryName),
    ("{empty}", Token::Empty),
    ("{file_name}", Token::FileName),
    ("{file_size}", Token::FileSize),
    ("{full_directory_name}", Token::FullDirectoryName),
    ("{git_branch}", Token::GitBranch),
    ("{git_repo_name}", Token::GitRepoName),
    ("{language}", Token::LanguageLower),
    ("{Language}", Token::LanguageTitle),
    ("{LANGUAGE}", Token::LanguageUpper),
    ("{total_lines}", Token::TotalLines),
    ("{workspace}", Token::Workspace),
    ("{workspace_folder}", Token::WorkspaceFolder),
    ("{workspace_and_folder}", Token::WorkspaceAndFolder),
];

impl Token {
    /// Match a token literal at the start of `input`, returning the token and
    /// the literal's length.
    fn match_at(input: &str) -> Option<(Self, usize)> {
        TOKENS
            .iter()
            .find(|(literal, _)| input.starts_with(literal))
            .map(|(literal, token)| (*token, literal.len()))
    }

    fn value(self, ctx: &TemplateContext) -> String {
        match self {
            Self::AppName => non_empty(&ctx.app_name),
            Self::CurrentColumn => number(ctx.current_column),
            Self::CurrentLine => number(ctx.current_line),
            Self::DirectoryName => optional(ctx.directory_name.as_deref()),
            Self::Empty => EMPTY_MARKER.to_string(),
            Self::FileName => optional(ctx.file_name.as_deref()),
            Self::FileSize => match ctx.file_size_bytes {
                Some(bytes) => format_file_size(bytes),
                None => EMPTY_MARKER.to_string(),
            },
            Self::FullDirectoryName => optional(ctx.full_directory_name.as_deref()),
            Self::GitBranch => optional(ctx.git_branch.as_deref()),
            Self::GitRepoName => optional(ctx.git_repo_name.as_deref()),
            Self::LanguageLower => {
                optional(ctx.language_label.as_deref().map(str::to_lowercase).as_deref())
            }
            Self::LanguageTitle => {
                optional(ctx.language_label.as_deref().map(title_case).as_deref())
            }
            Self::LanguageUpper => {
                optional(ctx.language_label.as_deref().map(str::to_uppercase).as_deref())
            }
            Self::TotalLines => number(ctx.total_lines),
            Self::Workspace => optional(ctx.workspace.as_deref()),
            Self::WorkspaceFolder => optional(ctx.workspace_folder.as_deref()),
            Self::WorkspaceAndFolder => {
                match (ctx.workspace.as_deref(), ctx.workspace_folder.as_deref()) {
                    (Some(workspace), Some(folder)) => format!("{workspace} - {folder}"),
                    (Some(workspace), None) => workspace.to_string(),
                    (None, Some(folder)) => folder.to_string(),
                    (None, None) => EMPTY_MARKER.to_string(),
                }
            }
        }
    }
}

/// Resolve every recognized token in `template` against `ctx`.
///
/// Unrecognized text, including unmatched braces, passes through unchanged.
pub fn resolve(template: &str, ctx: &TemplateContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        match Token::match_at(tail) {
            Some((token, len)) => {
                out.push_str(&token.value(ctx));
                rest = &tail[len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render a byte count with an auto-selected unit.
///
/// The value is divided by 1000 while it exceeds 1000, walking the unit list;
/// two decimal places whenever the original count exceeded 1000, else a bare
/// integer.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["bytes", "KB", "MB", "GB", "TB"];

    if bytes <= 1000 {
        return format!("{bytes} {}", UNITS[0]);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value > 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{value:.2}{}", UNITS[unit])
}

fn optional(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => EMPTY_MARKER.to_string(),
    }
}

fn non_empty(value: &str) -> String {
    if value.is_empty() {
        EMPTY_MARKER.to_string()
    } else {
        value.to_string()
    }
}

fn number(value: Option<u32>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => EMPTY_MARKER.to_string(),
    }
}
