use url::Url;

use crate::error::{Error, Result};

/// A git repository to build from. Constructed once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRepo {
    pub url: String,
    pub branch: String,
    pub name: String,
}

impl GitRepo {
    /// Derive the repo name from the URL: the second path segment with any
    /// trailing `.git` suffix stripped.
    pub fn from_url(repo_url: &str, branch: &str) -> Result<Self> {
        let parsed = Url::parse(repo_url)
            .map_err(|e| Error::Config(format!("Invalid repository URL '{}': {}", repo_url, e)))?;

        let name = parsed
            .path_segments()
            .and_then(|mut segments| segments.nth(1))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "Cannot derive repository name from URL '{}'",
                    repo_url
                ))
            })?;
        let name = name.strip_suffix(".git").unwrap_or(name);

        Ok(GitRepo {
            url: repo_url.to_string(),
            branch: branch.to_string(),
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_name_from_second_path_segment() {
        let repo = GitRepo::from_url("https://github.com/praekelt/test-app.git", "develop").unwrap();
        assert_eq!(repo.name, "test-app");
        assert_eq!(repo.branch, "develop");
        assert_eq!(repo.url, "https://github.com/praekelt/test-app.git");
    }

    #[test]
    fn name_without_git_suffix_is_kept_verbatim() {
        let repo = GitRepo::from_url("https://github.com/org/project", "main").unwrap();
        assert_eq!(repo.name, "project");
    }

    #[test]
    fn only_trailing_git_suffix_is_stripped() {
        let repo = GitRepo::from_url("https://github.com/org/widgit", "main").unwrap();
        assert_eq!(repo.name, "widgit");
    }

    #[test]
    fn url_without_repo_segment_is_rejected() {
        let err = GitRepo::from_url("https://github.com/org", "main").unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn malformed_url_is_rejected() {
        let err = GitRepo::from_url("not a url", "main").unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
