use git2::{
    AutotagOption, Cred, CredentialType, ErrorCode, FetchOptions, PushOptions, Reference,
    RemoteCallbacks, Repository as Git2Repository,
};
use std::path::Path;
use thiserror::Error;

/// Authentication attempts per remote operation before giving up
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Tag repository operations related errors
#[derive(Debug, Error)]
pub enum TagRepositoryError {
    #[error("Not a valid Git repository: {0}")]
    NotARepository(String),

    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    #[error("Invalid tag name: {0}")]
    InvalidTagName(String),

    #[error("Repository has no checked-out commit: {0}")]
    NoHead(String),

    #[error("Tag not found: {0}")]
    TagNotFound(String),

    #[error("Push of {tag} to {remote} rejected: {reason}")]
    PushRejected {
        tag: String,
        remote: String,
        reason: String,
    },

    #[error("Git operation failed: {0}")]
    Git2Error(#[from] git2::Error),
}

/// Git operations needed to publish a release tag.
///
/// Every call is blocking and scoped to one repository path.
#[cfg_attr(test, mockall::automock)]
pub trait TagOperations {
    /// Whether `path` exists and carries a `.git` entry
    fn is_repository(&self, path: &Path) -> bool;

    /// Refresh remote-tracking refs and tags from `remote`
    fn fetch_tags(&self, repo_path: &Path, remote: &str) -> Result<(), TagRepositoryError>;

    fn tag_exists(&self, repo_path: &Path, tag: &str) -> Result<bool, TagRepositoryError>;

    /// Create a lightweight tag at `HEAD`; returns the tagged commit id
    fn create_tag(&self, repo_path: &Path, tag: &str) -> Result<String, TagRepositoryError>;

    fn push_tag(&self, repo_path: &Path, remote: &str, tag: &str)
        -> Result<(), TagRepositoryError>;

    /// Commit id a tag points to
    fn resolve_tag(&self, repo_path: &Path, tag: &str) -> Result<String, TagRepositoryError>;
}

/// libgit2 backed implementation of [`TagOperations`]
#[derive(Debug, Default, Clone, Copy)]
pub struct GitTagRepository;

impl GitTagRepository {
    pub fn new() -> Self {
        Self
    }

    fn open(&self, repo_path: &Path) -> Result<Git2Repository, TagRepositoryError> {
        if !self.is_repository(repo_path) {
            return Err(TagRepositoryError::NotARepository(
                repo_path.display().to_string(),
            ));
        }
        Ok(Git2Repository::open(repo_path)?)
    }

    fn tag_ref(tag: &str) -> Result<String, TagRepositoryError> {
        let refname = format!("refs/tags/{}", tag);
        if !Reference::is_valid_name(&refname) {
            return Err(TagRepositoryError::InvalidTagName(tag.to_string()));
        }
        Ok(refname)
    }
}

/// Credentials callback shared by fetch and push: ssh-agent for SSH remotes,
/// the configured credential helper for HTTPS, default credentials otherwise.
fn remote_callbacks<'a>(config: &'a git2::Config) -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0;

    callbacks.credentials(move |url, username_from_url, allowed_types| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("Authentication failed"));
        }

        if allowed_types.contains(CredentialType::SSH_KEY) {
            Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
        } else if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            Cred::credential_helper(config, url, username_from_url)
        } else if allowed_types.contains(CredentialType::DEFAULT) {
            Cred::default()
        } else {
            Err(git2::Error::from_str("No supported authentication method"))
        }
    });

    callbacks
}

impl TagOperations for GitTagRepository {
    fn is_repository(&self, path: &Path) -> bool {
        path.is_dir() && path.join(".git").exists()
    }

    fn fetch_tags(&self, repo_path: &Path, remote: &str) -> Result<(), TagRepositoryError> {
        let repo = self.open(repo_path)?;
        let mut git_remote = repo
            .find_remote(remote)
            .map_err(|_| TagRepositoryError::RemoteNotFound(remote.to_string()))?;

        let config = repo.config()?;
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(&config));
        fetch_options.download_tags(AutotagOption::All);

        let refspecs: [&str; 0] = [];
        git_remote.fetch(&refspecs, Some(&mut fetch_options), None)?;

        tracing::debug!("Fetched {} in {}", remote, repo_path.display());
        Ok(())
    }

    fn tag_exists(&self, repo_path: &Path, tag: &str) -> Result<bool, TagRepositoryError> {
        let repo = self.open(repo_path)?;
        let refname = Self::tag_ref(tag)?;

        let exists = match repo.find_reference(&refname) {
            Ok(_) => true,
            Err(e) if e.code() == ErrorCode::NotFound => false,
            Err(e) => return Err(e.into()),
        };
        Ok(exists)
    }

    fn create_tag(&self, repo_path: &Path, tag: &str) -> Result<String, TagRepositoryError> {
        let repo = self.open(repo_path)?;
        Self::tag_ref(tag)?;

        let head = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|_| TagRepositoryError::NoHead(repo_path.display().to_string()))?;

        repo.tag_lightweight(tag, head.as_object(), false)?;

        let commit_id = head.id().to_string();
        tracing::debug!("Tagged {} as {} in {}", commit_id, tag, repo_path.display());
        Ok(commit_id)
    }

    fn push_tag(
        &self,
        repo_path: &Path,
        remote: &str,
        tag: &str,
    ) -> Result<(), TagRepositoryError> {
        let repo = self.open(repo_path)?;
        let refname = Self::tag_ref(tag)?;
        let mut git_remote = repo
            .find_remote(remote)
            .map_err(|_| TagRepositoryError::RemoteNotFound(remote.to_string()))?;

        let config = repo.config()?;
        let mut rejection: Option<String> = None;
        {
            let mut callbacks = remote_callbacks(&config);
            callbacks.push_update_reference(|_refname, status| {
                if let Some(message) = status {
                    rejection = Some(message.to_string());
                }
                Ok(())
            });

            let mut push_options = PushOptions::new();
            push_options.remote_callbacks(callbacks);

            let refspec = format!("{0}:{0}", refname);
            git_remote.push(&[refspec.as_str()], Some(&mut push_options))?;
        }

        if let Some(reason) = rejection {
            return Err(TagRepositoryError::PushRejected {
                tag: tag.to_string(),
                remote: remote.to_string(),
                reason,
            });
        }

        tracing::debug!("Pushed {} to {} from {}", tag, remote, repo_path.display());
        Ok(())
    }

    fn resolve_tag(&self, repo_path: &Path, tag: &str) -> Result<String, TagRepositoryError> {
        let repo = self.open(repo_path)?;
        let refname = Self::tag_ref(tag)?;

        let reference = repo.find_reference(&refname).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                TagRepositoryError::TagNotFound(tag.to_string())
            } else {
                e.into()
            }
        })?;

        let commit_id = reference.peel_to_commit()?.id().to_string();
        Ok(commit_id)
    }
}
