//! Language and icon resolution for the active document
//!
//! Resolution order: filename-pattern table (literal suffix match, or
//! `/pattern/flags` regex syntax), then the per-language-identifier table,
//! then a generic default.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Display label and icon reference for a resolved language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    pub label: &'static str,
    pub icon: &'static str,
}

/// Fallback when neither table matches
pub const GENERIC_LANGUAGE: LanguageInfo = LanguageInfo { label: "Text", icon: "file" };

/// Filename patterns take precedence over the language identifier.
///
/// A pattern wrapped in slashes is regex syntax (`/pattern/flags`, `i`
/// supported); anything else is a literal suffix match.
const FILENAME_PATTERNS: &[(&str, LanguageInfo)] = &[
    ("Cargo.toml", LanguageInfo { label: "Cargo", icon: "cargo" }),
    ("Cargo.lock", LanguageInfo { label: "Cargo", icon: "cargo" }),
    ("Dockerfile", LanguageInfo { label: "Docker", icon: "docker" }),
    ("docker-compose.yml", LanguageInfo { label: "Docker", icon: "docker" }),
    ("Makefile", LanguageInfo { label: "Make", icon: "makefile" }),
    ("package.json", LanguageInfo { label: "Node.js", icon: "node" }),
    ("package-lock.json", LanguageInfo { label: "Node.js", icon: "node" }),
    ("yarn.lock", LanguageInfo { label: "Yarn", icon: "yarn" }),
    (".gitignore", LanguageInfo { label: "Git", icon: "git" }),
    (".gitattributes", LanguageInfo { label: "Git", icon: "git" }),
    ("/\\.eslintrc(\\.(json|js|cjs|ya?ml))?$/i", LanguageInfo { label: "ESLint", icon: "eslint" }),
    ("/\\.prettierrc(\\.(json|js|ya?ml))?$/i", LanguageInfo { label: "Prettier", icon: "prettier" }),
    ("/webpack\\.config\\.(js|ts)$/", LanguageInfo { label: "Webpack", icon: "webpack" }),
    ("/tsconfig(\\..+)?\\.json$/", LanguageInfo { label: "TypeScript", icon: "typescript" }),
    ("/\\.(test|spec)\\.[jt]sx?$/", LanguageInfo { label: "Testing", icon: "test" }),
];

/// Host language identifiers, checked when no filename pattern matches
const LANGUAGE_IDS: &[(&str, LanguageInfo)] = &[
    ("c", LanguageInfo { label: "C", icon: "c" }),
    ("cpp", LanguageInfo { label: "C++", icon: "cpp" }),
    ("csharp", LanguageInfo { label: "C#", icon: "csharp" }),
    ("css", LanguageInfo { label: "CSS", icon: "css" }),
    ("dockerfile", LanguageInfo { label: "Docker", icon: "docker" }),
    ("go", LanguageInfo { label: "Go", icon: "go" }),
    ("html", LanguageInfo { label: "HTML", icon: "html" }),
    ("java", LanguageInfo { label: "Java", icon: "java" }),
    ("javascript", LanguageInfo { label: "JavaScript", icon: "javascript" }),
    ("javascriptreact", LanguageInfo { label: "JSX", icon: "react" }),
    ("json", LanguageInfo { label: "JSON", icon: "json" }),
    ("kotlin", LanguageInfo { label: "Kotlin", icon: "kotlin" }),
    ("lua", LanguageInfo { label: "Lua", icon: "lua" }),
    ("markdown", LanguageInfo { label: "Markdown", icon: "markdown" }),
    ("php", LanguageInfo { label: "PHP", icon: "php" }),
    ("plaintext", LanguageInfo { label: "Text", icon: "file" }),
    ("python", LanguageInfo { label: "Python", icon: "python" }),
    ("ruby", LanguageInfo { label: "Ruby", icon: "ruby" }),
    ("rust", LanguageInfo { label: "Rust", icon: "rust" }),
    ("scss", LanguageInfo { label: "SCSS", icon: "scss" }),
    ("shellscript", LanguageInfo { label: "Shell", icon: "shell" }),
    ("sql", LanguageInfo { label: "SQL", icon: "sql" }),
    ("swift", LanguageInfo { label: "Swift", icon: "swift" }),
    ("toml", LanguageInfo { label: "TOML", icon: "toml" }),
    ("typescript", LanguageInfo { label: "TypeScript", icon: "typescript" }),
    ("typescriptreact", LanguageInfo { label: "TSX", icon: "react" }),
    ("yaml", LanguageInfo { label: "YAML", icon: "yaml" }),
];

enum FilenameMatcher {
    Suffix(&'static str),
    Pattern(Regex),
}

static FILENAME_MATCHERS: Lazy<Vec<(FilenameMatcher, LanguageInfo)>> = Lazy::new(|| {
    FILENAME_PATTERNS
        .iter()
        .filter_map(|(pattern, info)| {
            let matcher = if pattern.starts_with('/') {
                compile_slash_pattern(pattern)?
            } else {
                FilenameMatcher::Suffix(pattern)
            };
            Some((matcher, *info))
        })
        .collect()
});

fn compile_slash_pattern(pattern: &str) -> Option<FilenameMatcher> {
    let close = pattern.rfind('/')?;
    if close == 0 {
        return None;
    }
    let (body, flags) = (&pattern[1..close], &pattern[close + 1..]);
    let source =
        if flags.contains('i') { format!("(?i){body}") } else { body.to_string() };
    match Regex::new(&source) {
        Ok(regex) => Some(FilenameMatcher::Pattern(regex)),
        Err(err) => {
            warn!(pattern, error = %err, "Invalid filename pattern, skipping");
            None
        }
    }
}

/// Resolve the display label and icon for the active document.
pub fn resolve_language(file_name: Option<&str>, language_id: Option<&str>) -> LanguageInfo {
    if let Some(name) = file_name {
        for (matcher, info) in FILENAME_MATCHERS.iter() {
            let matched = match matcher {
                FilenameMatcher::Suffix(suffix) => name.ends_with(suffix),
                FilenameMatcher::Pattern(regex) => regex.is_match(name),
            };
            if matched {
                return *info;
            }
        }
    }

    if let Some(id) = language_id {
        if let Some((_, info)) = LANGUAGE_IDS.iter().find(|(known, _)| *known == id) {
            return *info;
        }
    }

    GENERIC_LANGUAGE
}

/// Uppercase the first letter of each whitespace-separated word.
pub fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
