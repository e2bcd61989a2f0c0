//! Position tracking inside the resource hierarchy.
//!
//! A [`LocationPath`] is a stack of folder names plus the name tokens bound
//! for the instances being visited. Traversal code never pushes or binds
//! directly: [`LocationPath::enter`] and [`LocationPath::bind`] return guards
//! that restore the previous state when dropped, so every exit path (early
//! return, `?`, panic unwinding) leaves the location exactly as it was.

use crate::error::LookupError;
use indexmap::IndexMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationPath {
    folders: Vec<String>,
    tokens: IndexMap<String, String>,
}

impl LocationPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a detached location from folder names, with no tokens bound.
    pub fn from_folders<I, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            folders: folders.into_iter().map(Into::into).collect(),
            tokens: IndexMap::new(),
        }
    }

    pub fn append(&mut self, folder: impl Into<String>) {
        self.folders.push(folder.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.folders.pop()
    }

    /// Binds `token` to an instance name, returning the previously bound value.
    pub fn bind_token(&mut self, token: impl Into<String>, name: impl Into<String>) -> Option<String> {
        self.tokens.insert(token.into(), name.into())
    }

    pub fn unbind_token(&mut self, token: &str) -> Option<String> {
        self.tokens.shift_remove(token)
    }

    pub fn resolve_token(&self, token: &str) -> Result<&str, LookupError> {
        self.tokens
            .get(token)
            .map(String::as_str)
            .ok_or_else(|| LookupError::UnboundToken {
                token: token.to_string(),
                location: self.to_string(),
            })
    }

    pub fn is_bound(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    pub fn depth(&self) -> usize {
        self.folders.len()
    }

    pub fn bound_token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn current_folder(&self) -> Option<&str> {
        self.folders.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.folders.is_empty()
    }

    /// Folder path without instance names, e.g. `/CoherenceClusterSystemResource/CoherenceResource`.
    pub fn folder_path(&self) -> String {
        if self.folders.is_empty() {
            return "/".to_string();
        }
        self.folders.iter().fold(String::new(), |mut path, folder| {
            path.push('/');
            path.push_str(folder);
            path
        })
    }

    /// Pushes `folder` for the lifetime of the returned guard.
    pub fn enter(&mut self, folder: impl Into<String>) -> FolderGuard<'_> {
        let depth = self.folders.len();
        self.append(folder);
        FolderGuard {
            location: self,
            depth,
        }
    }

    /// Binds `token` for the lifetime of the returned guard. A value that was
    /// already bound for the token is restored on drop.
    pub fn bind(&mut self, token: impl Into<String>, name: impl Into<String>) -> TokenGuard<'_> {
        let token = token.into();
        let previous = self.bind_token(token.clone(), name);
        TokenGuard {
            location: self,
            token,
            previous,
        }
    }
}

impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.folder_path())?;
        if !self.tokens.is_empty() {
            let bound: Vec<String> = self
                .tokens
                .iter()
                .map(|(token, name)| format!("{}={}", token, name))
                .collect();
            write!(f, " {{{}}}", bound.join(", "))?;
        }
        Ok(())
    }
}

pub struct FolderGuard<'a> {
    location: &'a mut LocationPath,
    depth: usize,
}

impl Deref for FolderGuard<'_> {
    type Target = LocationPath;

    fn deref(&self) -> &LocationPath {
        &*self.location
    }
}

impl DerefMut for FolderGuard<'_> {
    fn deref_mut(&mut self) -> &mut LocationPath {
        &mut *self.location
    }
}

impl Drop for FolderGuard<'_> {
    fn drop(&mut self) {
        debug_assert_eq!(
            self.location.depth(),
            self.depth + 1,
            "unbalanced folder push inside guarded scope"
        );
        self.location.pop();
    }
}

pub struct TokenGuard<'a> {
    location: &'a mut LocationPath,
    token: String,
    previous: Option<String>,
}

impl Deref for TokenGuard<'_> {
    type Target = LocationPath;

    fn deref(&self) -> &LocationPath {
        &*self.location
    }
}

impl DerefMut for TokenGuard<'_> {
    fn deref_mut(&mut self) -> &mut LocationPath {
        &mut *self.location
    }
}

impl Drop for TokenGuard<'_> {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(previous) => {
                self.location.bind_token(self.token.clone(), previous);
            }
            None => {
                self.location.unbind_token(&self.token);
            }
        }
    }
}
