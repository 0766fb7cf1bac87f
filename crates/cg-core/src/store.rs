//! Cookie store abstraction
//!
//! A [`CookieStore`] is the page's original, unfiltered cookie interface.
//! The gate forwards allowed writes to it and the sweeper writes expirations
//! straight into it. The gate itself deliberately does not implement this
//! trait, so cleanup code cannot route a write back through the filter.

use std::cell::RefCell;
use std::rc::Rc;

use crate::jar::CookieJar;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("cookie write rejected: {0}")]
    Rejected(String),
    #[error("cookie store unavailable")]
    Unavailable,
}

/// Script-facing cookie interface: one read of all visible cookies, one
/// write of a single assignment string.
pub trait CookieStore {
    /// All cookies visible to the page, as `name=value; name2=value2`.
    fn read(&self) -> String;

    /// Apply one assignment (`name=value; attr=...`) exactly as given.
    fn write(&self, assignment: &str) -> Result<(), StoreError>;

    /// Hostname of the page owning the store.
    fn hostname(&self) -> String;

    /// Path of the page owning the store. Only cookies whose path is a
    /// prefix of it are visible.
    fn pathname(&self) -> String {
        "/".to_string()
    }
}

impl<T: CookieStore + ?Sized> CookieStore for &T {
    fn read(&self) -> String {
        (**self).read()
    }

    fn write(&self, assignment: &str) -> Result<(), StoreError> {
        (**self).write(assignment)
    }

    fn hostname(&self) -> String {
        (**self).hostname()
    }

    fn pathname(&self) -> String {
        (**self).pathname()
    }
}

impl<T: CookieStore + ?Sized> CookieStore for Rc<T> {
    fn read(&self) -> String {
        (**self).read()
    }

    fn write(&self, assignment: &str) -> Result<(), StoreError> {
        (**self).write(assignment)
    }

    fn hostname(&self) -> String {
        (**self).hostname()
    }

    fn pathname(&self) -> String {
        (**self).pathname()
    }
}

impl<T: CookieStore + ?Sized> CookieStore for Box<T> {
    fn read(&self) -> String {
        (**self).read()
    }

    fn write(&self, assignment: &str) -> Result<(), StoreError> {
        (**self).write(assignment)
    }

    fn hostname(&self) -> String {
        (**self).hostname()
    }

    fn pathname(&self) -> String {
        (**self).pathname()
    }
}

/// Single-threaded shared jar, the way a page shares its cookie store
/// between scripts.
impl CookieStore for RefCell<CookieJar> {
    fn read(&self) -> String {
        self.try_borrow()
            .map(|jar| jar.cookie_string())
            .unwrap_or_default()
    }

    fn write(&self, assignment: &str) -> Result<(), StoreError> {
        let mut jar = self.try_borrow_mut().map_err(|_| StoreError::Unavailable)?;
        // Script writes the store refuses are dropped silently, never raised.
        jar.set(assignment);
        Ok(())
    }

    fn hostname(&self) -> String {
        self.try_borrow()
            .map(|jar| jar.host().to_string())
            .unwrap_or_default()
    }

    fn pathname(&self) -> String {
        self.try_borrow()
            .map(|jar| jar.page_path().to_string())
            .unwrap_or_else(|_| "/".to_string())
    }
}
