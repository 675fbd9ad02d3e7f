use serde::{Deserialize, Serialize};

/// One-shot visibility state of an observed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    NotVisible,
    Visible,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Self::Visible
    }

    /// Move to `Visible`. Returns `true` only on the transition itself.
    pub fn latch(&mut self) -> bool {
        match self {
            Self::NotVisible => {
                *self = Self::Visible;
                true
            }
            Self::Visible => false,
        }
    }
}
