//! Error taxonomy shared by every grid operation.

use alloc::string::String;

use crate::surface::ItemId;

/// Grid computation error.
///
/// Every variant is recoverable: nothing is mutated before a pass has
/// computed all of its results, so callers can report and move on.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Fewer than two items were supplied to the clusterer.
    #[error("need at least 2 items to detect a grid, found {found}")]
    InsufficientInput { found: usize },
    /// The container is too small to hold a single cell.
    #[error("layout is empty ({columns} columns × {rows} rows)")]
    EmptyLayout { columns: u32, rows: u32 },
    /// A caller-supplied parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
    /// The surface does not know this item.
    #[error("unknown item {0:?}")]
    UnknownItem(ItemId),
    /// A length string could not be parsed.
    #[error("invalid length `{0}`")]
    InvalidLength(String),
}

impl GridError {
    pub(crate) const fn invalid(name: &'static str, reason: &'static str) -> Self {
        Self::InvalidParameter { name, reason }
    }
}
