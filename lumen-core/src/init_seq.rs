//! Panel initialization sequences
//!
//! Controller bring-up is data, not code. A sequence is a flat byte table
//! of records:
//!
//! ```text
//! [len] [delay_ms] [cmd] [param; len - 1]
//! ```
//!
//! `len` counts the command byte and its parameters. A record with
//! `len == 0` ends the table. The delay is applied after the command.

use core::iter::FusedIterator;

use crate::error::DisplayError;

/// One decoded record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitCommand<'a> {
    /// Command byte
    pub command: u8,
    /// Parameter bytes
    pub params: &'a [u8],
    /// Pause after the command
    pub delay_ms: u8,
}

/// A validated sequence table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitSequence<'a> {
    bytes: &'a [u8],
}

impl<'a> InitSequence<'a> {
    /// Validate a table
    ///
    /// Fails if a record runs past the end or the terminator is missing.
    pub fn new(bytes: &'a [u8]) -> Result<Self, DisplayError> {
        let mut pos = 0;
        loop {
            let len = *bytes.get(pos).ok_or(DisplayError::InvalidSequence)? as usize;
            if len == 0 {
                return Ok(Self { bytes: &bytes[..=pos] });
            }
            pos += len + 2;
            if pos > bytes.len() {
                return Err(DisplayError::InvalidSequence);
            }
        }
    }

    /// Decoded records, terminator excluded
    pub fn iter(&self) -> InitIter<'a> {
        InitIter {
            bytes: self.bytes,
            pos: 0,
        }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total delay in milliseconds
    pub fn total_delay_ms(&self) -> u32 {
        self.iter().map(|cmd| cmd.delay_ms as u32).sum()
    }
}

impl<'a> IntoIterator for &InitSequence<'a> {
    type Item = InitCommand<'a>;
    type IntoIter = InitIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the records of an [`InitSequence`]
#[derive(Debug, Clone)]
pub struct InitIter<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for InitIter<'a> {
    type Item = InitCommand<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = *self.bytes.get(self.pos)? as usize;
        if len == 0 {
            return None;
        }
        let record = self.bytes.get(self.pos + 1..self.pos + 2 + len)?;
        self.pos += len + 2;
        Some(InitCommand {
            delay_ms: record[0],
            command: record[1],
            params: &record[2..],
        })
    }
}

impl FusedIterator for InitIter<'_> {}

/// Patch parameter `index` of the first `command` record in a table
///
/// Boards use this to adjust a shared controller table, e.g. the MADCTL
/// orientation byte, before handing it to the driver.
pub fn modify_param(bytes: &mut [u8], command: u8, index: usize, value: u8) -> Result<(), DisplayError> {
    InitSequence::new(bytes)?;

    let mut pos = 0;
    loop {
        let len = bytes[pos] as usize;
        if len == 0 {
            return Err(DisplayError::NotFound);
        }
        if bytes[pos + 2] == command {
            if index >= len - 1 {
                return Err(DisplayError::InvalidParameter);
            }
            bytes[pos + 3 + index] = value;
            return Ok(());
        }
        pos += len + 2;
    }
}
