//! Arena handles

use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Position in the owning arena
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Handle of a [`super::Value`]
    ValueId,
    "v"
);
arena_id!(
    /// Handle of a [`super::BasicBlock`]
    BlockId,
    "b"
);
arena_id!(
    /// Handle of a [`super::Function`]
    FunctionId,
    "f"
);
arena_id!(
    /// Handle of a [`super::Scope`]
    ScopeId,
    "s"
);
arena_id!(
    /// Handle of a [`super::Variable`]
    VariableId,
    "var"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_index() {
        let id = ValueId::from_index(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.to_string(), "v7");
        assert_eq!(BlockId::from_index(2).to_string(), "b2");
    }
}
