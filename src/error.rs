/// Errors reported by [`AvlTree`](crate::AvlTree) queries.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// `minimum()` or `maximum()` was called on a tree with no nodes.
    #[error("The tree is empty.")]
    EmptyTree,
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
