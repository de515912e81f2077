//! Reordering helpers for editable lists.

use crate::error::TmdError;

/// Move operations on a `Vec`, with bounds checked instead of panicking.
pub trait ListExt<T> {
    /// Move the item at `old_index` so that it ends up at `new_index`.
    fn move_item(&mut self, old_index: usize, new_index: usize) -> Result<(), TmdError>;

    /// Move the first item equal to `item` so that it ends up at `new_index`.
    fn move_value(&mut self, item: &T, new_index: usize) -> Result<(), TmdError>
    where
        T: PartialEq;
}

impl<T> ListExt<T> for Vec<T> {
    fn move_item(&mut self, old_index: usize, new_index: usize) -> Result<(), TmdError> {
        if self.is_empty() {
            return Err(TmdError::EmptyList);
        }
        check_index(old_index, self.len())?;
        check_index(new_index, self.len())?;
        if old_index != new_index {
            let item = self.remove(old_index);
            self.insert(new_index, item);
        }
        Ok(())
    }

    fn move_value(&mut self, item: &T, new_index: usize) -> Result<(), TmdError>
    where
        T: PartialEq,
    {
        if self.is_empty() {
            return Err(TmdError::EmptyList);
        }
        let old_index = self
            .iter()
            .position(|x| x == item)
            .ok_or(TmdError::ItemNotFound)?;
        self.move_item(old_index, new_index)
    }
}

pub(crate) fn check_index(index: usize, len: usize) -> Result<(), TmdError> {
    if index < len {
        Ok(())
    } else {
        Err(TmdError::IndexOutOfRange { index, len })
    }
}
