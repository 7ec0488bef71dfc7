use std::fmt;

use super::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    Study,
    Examination,
    Acquisition,
    Dataset,
    Processing,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Study => "Study",
            NodeKind::Examination => "Examination",
            NodeKind::Acquisition => "Dataset Acquisition",
            NodeKind::Dataset => "Dataset",
            NodeKind::Processing => "Processing",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a tree node. Ids are only unique within a kind, so a dataset and a processing
/// sharing a numeric id are different keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeKey {
    pub kind: NodeKind,
    pub id: EntityId,
}

impl NodeKey {
    pub fn study(id: EntityId) -> Self {
        Self::new(NodeKind::Study, id)
    }

    pub fn examination(id: EntityId) -> Self {
        Self::new(NodeKind::Examination, id)
    }

    pub fn acquisition(id: EntityId) -> Self {
        Self::new(NodeKind::Acquisition, id)
    }

    pub fn dataset(id: EntityId) -> Self {
        Self::new(NodeKind::Dataset, id)
    }

    pub fn processing(id: EntityId) -> Self {
        Self::new(NodeKind::Processing, id)
    }

    pub fn new(kind: NodeKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind, self.id)
    }
}

/// Position of a node: the key of its root followed by the keys on the way down.
///
/// Keys repeat across the tree (a pinned acquisition may also sit inside an examination, a
/// processing output may carry the id of the raw dataset it came from), so nodes are addressed
/// by path rather than by key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath {
    root: NodeKey,
    descendants: Vec<NodeKey>,
}

impl NodePath {
    pub fn root(key: NodeKey) -> Self {
        Self {
            root: key,
            descendants: Vec::new(),
        }
    }

    pub fn child(&self, key: NodeKey) -> Self {
        let mut descendants = self.descendants.clone();
        descendants.push(key);
        Self {
            root: self.root,
            descendants,
        }
    }

    /// Key of the node this path leads to.
    pub fn key(&self) -> NodeKey {
        self.descendants.last().copied().unwrap_or(self.root)
    }

    pub fn root_key(&self) -> NodeKey {
        self.root
    }

    pub fn descendants(&self) -> &[NodeKey] {
        &self.descendants
    }

    pub fn parent(&self) -> Option<NodePath> {
        let (_, ancestors) = self.descendants.split_last()?;
        Some(Self {
            root: self.root,
            descendants: ancestors.to_vec(),
        })
    }

    /// Whether `self` is `ancestor` or lies below it.
    pub fn starts_with(&self, ancestor: &NodePath) -> bool {
        self.root == ancestor.root && self.descendants.starts_with(&ancestor.descendants)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for key in &self.descendants {
            write!(f, " / {key}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn same_id_at_different_kinds_is_distinct() {
        let keys: BTreeSet<_> = [NodeKey::dataset(5), NodeKey::processing(5), NodeKey::dataset(5)]
            .into_iter()
            .collect();
        assert_eq!(keys.len(), 2);
        assert_ne!(NodeKey::dataset(5), NodeKey::processing(5));
    }

    #[test]
    fn display_names_kind_and_id() {
        assert_eq!(NodeKey::acquisition(12).to_string(), "Dataset Acquisition #12");
    }

    #[test]
    fn path_addresses_the_last_key() {
        let acquisition = NodePath::root(NodeKey::study(2))
            .child(NodeKey::examination(20))
            .child(NodeKey::acquisition(200));
        assert_eq!(acquisition.key(), NodeKey::acquisition(200));
        assert_eq!(acquisition.root_key(), NodeKey::study(2));
        assert_eq!(
            acquisition.parent(),
            Some(NodePath::root(NodeKey::study(2)).child(NodeKey::examination(20)))
        );
        assert_eq!(NodePath::root(NodeKey::study(2)).parent(), None);
    }

    #[test]
    fn same_key_at_two_positions_gives_two_paths() {
        let pinned = NodePath::root(NodeKey::acquisition(200));
        let nested = NodePath::root(NodeKey::study(2))
            .child(NodeKey::examination(20))
            .child(NodeKey::acquisition(200));
        assert_eq!(pinned.key(), nested.key());
        assert_ne!(pinned, nested);
        assert!(!nested.starts_with(&pinned));
    }

    #[test]
    fn descendants_start_with_their_ancestors() {
        let exam = NodePath::root(NodeKey::study(1)).child(NodeKey::examination(10));
        let dataset = exam
            .child(NodeKey::acquisition(100))
            .child(NodeKey::dataset(5));
        assert!(dataset.starts_with(&exam));
        assert!(exam.starts_with(&exam));
        assert!(!exam.starts_with(&dataset));
        assert_eq!(
            dataset.to_string(),
            "Study #1 / Examination #10 / Dataset Acquisition #100 / Dataset #5"
        );
    }
}
