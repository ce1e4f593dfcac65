//! Workspace membership masks

use bitflags::bitflags;

/// Number of workspaces.
pub const WORKSPACE_COUNT: usize = 8;

bitflags! {
    /// Set of workspaces; bit *i* is workspace *i + 1*.
    ///
    /// Windows carry one to say where they live, the view carries one to say
    /// what is shown. An empty mask is valid and means "nowhere".
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Workspaces: u8 {
        const WS1 = 1 << 0;
        const WS2 = 1 << 1;
        const WS3 = 1 << 2;
        const WS4 = 1 << 3;
        const WS5 = 1 << 4;
        const WS6 = 1 << 5;
        const WS7 = 1 << 6;
        const WS8 = 1 << 7;
    }
}

impl Workspaces {
    /// Mask for the zero-based workspace `index`, `None` if out of range.
    pub fn nth(index: usize) -> Option<Self> {
        if index < WORKSPACE_COUNT {
            Some(Self::from_bits_retain(1 << index))
        } else {
            None
        }
    }

    /// Flip membership of workspace `index`. Out-of-range indices are ignored.
    pub fn toggle_nth(&mut self, index: usize) {
        if let Some(bit) = Self::nth(index) {
            self.toggle(bit);
        }
    }

    /// Whether something on `self` is shown by the view `other`.
    pub fn overlaps(self, other: Workspaces) -> bool {
        self.intersects(other)
    }
}
