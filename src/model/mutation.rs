use super::node::{
    DatasetAcquisitionNode, DatasetNode, ExaminationNode, ProcessingNode, StudyNode, TreeNode,
};
use super::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed { index: usize },
    AlreadyAbsent,
}

/// A node that owns a sequence of children and is the only one allowed to splice it.
pub trait ChildOwner {
    type Child: TreeNode;

    /// `None` while the children are not loaded.
    fn children_mut(&mut self) -> Option<&mut Vec<Self::Child>>;
}

/// Removes the child with `child_id` from `parent`, keeping the order of the remaining
/// siblings. Removing a child that is not there (or from unloaded children) is a no-op.
pub fn remove_child<P: ChildOwner>(parent: &mut P, child_id: EntityId) -> Removal {
    let Some(children) = parent.children_mut() else {
        return Removal::AlreadyAbsent;
    };
    match children.iter().position(|child| child.id() == child_id) {
        Some(index) => {
            children.remove(index);
            Removal::Removed { index }
        }
        None => Removal::AlreadyAbsent,
    }
}

impl ChildOwner for StudyNode {
    type Child = ExaminationNode;

    fn children_mut(&mut self) -> Option<&mut Vec<ExaminationNode>> {
        self.examinations.as_mut_vec()
    }
}

impl ChildOwner for ExaminationNode {
    type Child = DatasetAcquisitionNode;

    fn children_mut(&mut self) -> Option<&mut Vec<DatasetAcquisitionNode>> {
        self.acquisitions.as_mut_vec()
    }
}

impl ChildOwner for DatasetAcquisitionNode {
    type Child = DatasetNode;

    fn children_mut(&mut self) -> Option<&mut Vec<DatasetNode>> {
        self.datasets.as_mut_vec()
    }
}

impl ChildOwner for DatasetNode {
    type Child = ProcessingNode;

    fn children_mut(&mut self) -> Option<&mut Vec<ProcessingNode>> {
        Some(&mut self.processings)
    }
}

impl ChildOwner for ProcessingNode {
    type Child = DatasetNode;

    fn children_mut(&mut self) -> Option<&mut Vec<DatasetNode>> {
        Some(&mut self.outputs)
    }
}
