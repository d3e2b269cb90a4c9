//! Owned editable query text
//!
//! All offsets are byte offsets and must land on char boundaries. Edits that
//! would fail validation leave the buffer unchanged.

use tuql_core::{Result, TuqlError};

pub const DEFAULT_MAX_BUFFER_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    max_bytes: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BUFFER_BYTES)
    }
}

impl TextBuffer {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            text: String::new(),
            max_bytes,
        }
    }

    pub fn with_text(text: impl Into<String>, max_bytes: usize) -> Result<Self> {
        let text = text.into();
        if text.len() > max_bytes {
            return Err(limit_error(max_bytes));
        }
        Ok(Self { text, max_bytes })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn insert_at(&mut self, offset: usize, text: &str) -> Result<()> {
        self.check_offset(offset)?;
        let new_len = self
            .text
            .len()
            .checked_add(text.len())
            .ok_or_else(|| limit_error(self.max_bytes))?;
        if new_len > self.max_bytes {
            return Err(limit_error(self.max_bytes));
        }
        self.text.insert_str(offset, text);
        Ok(())
    }

    /// Remove `start..end`, returning the removed text.
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<String> {
        if start > end {
            return Err(TuqlError::InvalidArgument(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        self.check_offset(start)?;
        self.check_offset(end)?;
        Ok(self.text.drain(start..end).collect())
    }

    /// Replace the whole contents.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        if text.len() > self.max_bytes {
            return Err(limit_error(self.max_bytes));
        }
        self.text = text;
        Ok(())
    }

    /// Statement under the cursor
    pub fn statement_at(&self, cursor: usize) -> String {
        crate::statement_at(&self.text, cursor)
    }

    pub fn statements(&self) -> Vec<String> {
        crate::split_statements(&self.text)
    }

    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset > self.text.len() || !self.text.is_char_boundary(offset) {
            return Err(TuqlError::InvalidArgument(format!(
                "offset {} is not a char boundary of a {}-byte buffer",
                offset,
                self.text.len()
            )));
        }
        Ok(())
    }
}

fn limit_error(max_bytes: usize) -> TuqlError {
    TuqlError::ResourceLimit(format!("editor buffer exceeds {} bytes", max_bytes))
}
