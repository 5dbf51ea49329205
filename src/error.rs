use std::fmt::Display;

/// Returned by [`crate::Node::set`] when the target is an operation node.
#[derive(Debug, Clone, Copy)]
pub struct NonLeafError;

impl Display for NonLeafError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Only leaf nodes can be assigned a value. Update the leaves and rebuild the expression."
        )
    }
}

impl std::error::Error for NonLeafError {}
