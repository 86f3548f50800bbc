//! Board items and the issues they wrap.

use super::{BoardDomainError, ItemId};
use serde::{Deserialize, Serialize};
use std::fmt;

const GITHUB_PREFIX: &str = "https://github.com/";

/// Web URL of a GitHub issue or pull request.
///
/// Pull requests share the issue comment endpoint, so both resolve to the
/// same owner, repository and number triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssueUrl {
    owner: String,
    repository: String,
    number: u64,
    pull_request: bool,
}

impl IssueUrl {
    /// Parses an issue or pull request URL.
    ///
    /// Query strings and fragments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::InvalidIssueUrl`] when the value is not a
    /// `https://github.com/<owner>/<repo>/(issues|pull)/<number>` URL.
    pub fn parse(value: &str) -> Result<Self, BoardDomainError> {
        let invalid = || BoardDomainError::InvalidIssueUrl(value.to_owned());
        let trimmed = value.trim();
        let raw_path = trimmed.strip_prefix(GITHUB_PREFIX).ok_or_else(invalid)?;
        let path = raw_path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');

        let mut segments = path.split('/');
        let owner = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let repository = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let pull_request = match segments.next() {
            Some("issues") => false,
            Some("pull") => true,
            _ => return Err(invalid()),
        };
        let number = segments
            .next()
            .and_then(|segment| segment.parse::<u64>().ok())
            .filter(|number| *number > 0)
            .ok_or_else(invalid)?;
        if segments.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_owned(),
            repository: repository.to_owned(),
            number,
            pull_request,
        })
    }

    /// Returns the repository owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Returns the issue or pull request number.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// Returns `true` when the URL names a pull request.
    #[must_use]
    pub const fn is_pull_request(&self) -> bool {
        self.pull_request
    }
}

impl TryFrom<String> for IssueUrl {
    type Error = BoardDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IssueUrl> for String {
    fn from(value: IssueUrl) -> Self {
        value.to_string()
    }
}

impl fmt::Display for IssueUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let segment = if self.pull_request { "pull" } else { "issues" };
        write!(
            f,
            "{GITHUB_PREFIX}{}/{}/{segment}/{}",
            self.owner, self.repository, self.number
        )
    }
}

/// Reference to one item of a batch, with the issue to annotate when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    item_id: ItemId,
    linked_issue: Option<IssueUrl>,
}

impl ItemRef {
    /// Creates a reference to an item with no linked issue.
    #[must_use]
    pub const fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            linked_issue: None,
        }
    }

    /// Sets the issue the item wraps.
    #[must_use]
    pub fn with_linked_issue(mut self, issue: IssueUrl) -> Self {
        self.linked_issue = Some(issue);
        self
    }

    /// Returns the item identifier.
    #[must_use]
    pub const fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    /// Returns the linked issue when the item wraps one.
    #[must_use]
    pub const fn linked_issue(&self) -> Option<&IssueUrl> {
        self.linked_issue.as_ref()
    }
}

impl From<ItemId> for ItemRef {
    fn from(item_id: ItemId) -> Self {
        Self::new(item_id)
    }
}

/// A board row as listed from the remote board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardItem {
    id: ItemId,
    title: String,
    number: Option<u64>,
    body: Option<String>,
    issue_url: Option<IssueUrl>,
    status: Option<String>,
}

impl BoardItem {
    /// Creates an item with a title and no content links.
    #[must_use]
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            number: None,
            body: None,
            issue_url: None,
            status: None,
        }
    }

    /// Links the item to the issue or pull request it wraps.
    #[must_use]
    pub fn with_issue(mut self, issue_url: IssueUrl) -> Self {
        self.number = Some(issue_url.number());
        self.issue_url = Some(issue_url);
        self
    }

    /// Sets the item body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the current status option name.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Returns the item identifier.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    /// Returns the item title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the issue or pull request number when linked.
    #[must_use]
    pub const fn number(&self) -> Option<u64> {
        self.number
    }

    /// Returns the item body when present.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns the linked issue URL when present.
    #[must_use]
    pub const fn issue_url(&self) -> Option<&IssueUrl> {
        self.issue_url.as_ref()
    }

    /// Returns the current status option name, if one is set.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Returns an [`ItemRef`] carrying this item's linked issue.
    #[must_use]
    pub fn to_item_ref(&self) -> ItemRef {
        ItemRef {
            item_id: self.id.clone(),
            linked_issue: self.issue_url.clone(),
        }
    }
}
