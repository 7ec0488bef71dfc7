/// Children of a node whose subtree is fetched on demand.
///
/// Transitions are `NotLoaded -> Loading` on expand, `Loading -> Loaded` when the fetch
/// succeeds, and `Loading -> NotLoaded` when it fails. A reload replaces a `Loaded` sequence with
/// a new one. `NotLoaded` never becomes `Loaded` directly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Children<T> {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Vec<T>),
}

/// Answer to "does this node have children".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasChildren {
    Empty,
    NonEmpty,
    Unknown,
}

impl HasChildren {
    pub fn from_slice<T>(children: &[T]) -> Self {
        if children.is_empty() {
            Self::Empty
        } else {
            Self::NonEmpty
        }
    }

    /// Whether the tree panel should draw an expand arrow.
    pub fn is_expandable(self) -> bool {
        !matches!(self, Self::Empty)
    }
}

impl<T> Children<T> {
    pub fn loaded(children: Vec<T>) -> Self {
        Self::Loaded(children)
    }

    pub fn has_children(&self) -> HasChildren {
        match self {
            Self::NotLoaded | Self::Loading => HasChildren::Unknown,
            Self::Loaded(children) => HasChildren::from_slice(children),
        }
    }

    pub fn is_not_loaded(&self) -> bool {
        matches!(self, Self::NotLoaded)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Moves `NotLoaded` to `Loading`. Returns `false` and changes nothing in any other state.
    pub fn begin_loading(&mut self) -> bool {
        if self.is_not_loaded() {
            *self = Self::Loading;
            true
        } else {
            false
        }
    }

    /// Stores a fetched sequence, replacing whatever was loaded before. Returns `false` and
    /// drops the sequence if no fetch was started.
    pub fn finish_loading(&mut self, children: Vec<T>) -> bool {
        if self.is_not_loaded() {
            return false;
        }
        *self = Self::Loaded(children);
        true
    }

    /// Rolls a failed fetch back so the node can be expanded again. Loaded children are kept.
    pub fn abandon_loading(&mut self) {
        if self.is_loading() {
            *self = Self::NotLoaded;
        }
    }

    pub fn as_slice(&self) -> Option<&[T]> {
        match self {
            Self::Loaded(children) => Some(children),
            Self::NotLoaded | Self::Loading => None,
        }
    }

    pub fn as_mut_vec(&mut self) -> Option<&mut Vec<T>> {
        match self {
            Self::Loaded(children) => Some(children),
            Self::NotLoaded | Self::Loading => None,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().unwrap_or(&[]).iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        match self {
            Self::Loaded(children) => children.iter_mut(),
            Self::NotLoaded | Self::Loading => Default::default(),
        }
    }
}
