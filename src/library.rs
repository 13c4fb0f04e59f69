//! Library catalogue items and a decorator that makes any item borrowable.
//!
//! Unlike the operation chains, this decorator wraps a stateful component: it
//! adjusts the wrapped item's copy count as items go out and come back.

use tracing::debug;

use crate::error::{PatternError, Result};

pub trait LibraryItem {
    fn title(&self) -> &str;
    fn copies(&self) -> u32;
    fn set_copies(&mut self, copies: u32);
    /// Multi-line description of the item.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    author: String,
    title: String,
    copies: u32,
}

impl Book {
    pub fn new(author: impl Into<String>, title: impl Into<String>, copies: u32) -> Self {
        Self {
            author: author.into(),
            title: title.into(),
            copies,
        }
    }
}

impl LibraryItem for Book {
    fn title(&self) -> &str {
        &self.title
    }

    fn copies(&self) -> u32 {
        self.copies
    }

    fn set_copies(&mut self, copies: u32) {
        self.copies = copies;
    }

    fn describe(&self) -> String {
        format!(
            "Book ------\n Author: {}\n Title: {}\n # Copies: {}\n",
            self.author, self.title, self.copies
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    director: String,
    title: String,
    copies: u32,
    play_time: u32,
}

impl Video {
    pub fn new(
        director: impl Into<String>,
        title: impl Into<String>,
        copies: u32,
        play_time: u32,
    ) -> Self {
        Self {
            director: director.into(),
            title: title.into(),
            copies,
            play_time,
        }
    }
}

impl LibraryItem for Video {
    fn title(&self) -> &str {
        &self.title
    }

    fn copies(&self) -> u32 {
        self.copies
    }

    fn set_copies(&mut self, copies: u32) {
        self.copies = copies;
    }

    fn describe(&self) -> String {
        format!(
            "Video -----\n Director: {}\n Title: {}\n # Copies: {}\n Playtime: {}\n",
            self.director, self.title, self.copies, self.play_time
        )
    }
}

// ============================================================================
// Decorator
// ============================================================================

/// Adds lending to any item. The wrapped item still owns the copy count.
#[derive(Debug, Clone, PartialEq)]
pub struct Borrowable<T> {
    item: T,
    borrowers: Vec<String>,
}

impl<T: LibraryItem> Borrowable<T> {
    pub fn new(item: T) -> Self {
        Self {
            item,
            borrowers: Vec::new(),
        }
    }

    pub fn borrow_item(&mut self, borrower: impl Into<String>) -> Result<()> {
        let copies = self.item.copies();
        if copies == 0 {
            return Err(PatternError::NoCopiesAvailable {
                title: self.item.title().to_string(),
            });
        }
        let borrower = borrower.into();
        debug!(title = self.item.title(), borrower = %borrower, "lending item");
        self.item.set_copies(copies - 1);
        self.borrowers.push(borrower);
        Ok(())
    }

    pub fn return_item(&mut self, borrower: &str) -> Result<()> {
        let position = self
            .borrowers
            .iter()
            .position(|b| b == borrower)
            .ok_or_else(|| PatternError::NotBorrowed {
                title: self.item.title().to_string(),
                borrower: borrower.to_string(),
            })?;
        self.borrowers.remove(position);
        self.item.set_copies(self.item.copies() + 1);
        Ok(())
    }

    pub fn borrowers(&self) -> &[String] {
        &self.borrowers
    }

    pub fn into_inner(self) -> T {
        self.item
    }
}

impl<T: LibraryItem> LibraryItem for Borrowable<T> {
    fn title(&self) -> &str {
        self.item.title()
    }

    fn copies(&self) -> u32 {
        self.item.copies()
    }

    fn set_copies(&mut self, copies: u32) {
        self.item.set_copies(copies);
    }

    fn describe(&self) -> String {
        let mut out = self.item.describe();
        for borrower in &self.borrowers {
            out.push_str(" borrower: ");
            out.push_str(borrower);
            out.push('\n');
        }
        out
    }
}
