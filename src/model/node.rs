use chrono::NaiveDate;

use super::dto::DatasetType;
use super::lazy::{Children, HasChildren};
use super::tree::{NodeKey, NodeKind};
use super::EntityId;

/// Surface shared by every level of the hierarchy.
pub trait TreeNode {
    const KIND: NodeKind;

    fn id(&self) -> EntityId;
    fn label(&self) -> &str;
    fn has_children(&self) -> HasChildren;

    /// `can_admin` on study/examination/acquisition nodes, `can_delete` on dataset and
    /// processing nodes. Fixed when the node is built.
    fn permission(&self) -> bool;

    fn key(&self) -> NodeKey {
        NodeKey::new(Self::KIND, self.id())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudyNode {
    pub id: EntityId,
    pub label: String,
    pub examinations: Children<ExaminationNode>,
    can_admin: bool,
}

impl StudyNode {
    pub fn new(
        id: EntityId,
        label: impl Into<String>,
        examinations: Children<ExaminationNode>,
        can_admin: bool,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            examinations,
            can_admin,
        }
    }

    /// A study whose examinations have not been requested yet.
    pub fn shallow(id: EntityId, label: impl Into<String>, can_admin: bool) -> Self {
        Self::new(id, label, Children::NotLoaded, can_admin)
    }

    pub fn can_admin(&self) -> bool {
        self.can_admin
    }
}

impl TreeNode for StudyNode {
    const KIND: NodeKind = NodeKind::Study;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn has_children(&self) -> HasChildren {
        self.examinations.has_children()
    }

    fn permission(&self) -> bool {
        self.can_admin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExaminationNode {
    pub id: EntityId,
    pub label: String,
    pub examination_date: Option<NaiveDate>,
    pub acquisitions: Children<DatasetAcquisitionNode>,
    pub extra_data_file_paths: Vec<String>,
    can_admin: bool,
}

impl ExaminationNode {
    pub fn new(
        id: EntityId,
        label: impl Into<String>,
        examination_date: Option<NaiveDate>,
        acquisitions: Children<DatasetAcquisitionNode>,
        extra_data_file_paths: Vec<String>,
        can_admin: bool,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            examination_date,
            acquisitions,
            extra_data_file_paths,
            can_admin,
        }
    }

    pub fn can_admin(&self) -> bool {
        self.can_admin
    }
}

impl TreeNode for ExaminationNode {
    const KIND: NodeKind = NodeKind::Examination;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn has_children(&self) -> HasChildren {
        self.acquisitions.has_children()
    }

    fn permission(&self) -> bool {
        self.can_admin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetAcquisitionNode {
    pub id: EntityId,
    pub label: String,
    pub datasets: Children<DatasetNode>,
    can_admin: bool,
}

impl DatasetAcquisitionNode {
    pub fn new(
        id: EntityId,
        label: impl Into<String>,
        datasets: Children<DatasetNode>,
        can_admin: bool,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            datasets,
            can_admin,
        }
    }

    /// Built from a bare acquisition reference: no rights are known, nothing is loaded.
    pub fn shallow(id: EntityId) -> Self {
        Self::new(id, shallow_acquisition_label(id), Children::NotLoaded, false)
    }

    pub fn can_admin(&self) -> bool {
        self.can_admin
    }

    /// Capability handed down to the datasets of this acquisition.
    pub fn can_delete(&self) -> bool {
        self.can_admin
    }
}

pub fn shallow_acquisition_label(id: EntityId) -> String {
    format!("Dataset Acquisition n° {id}")
}

impl TreeNode for DatasetAcquisitionNode {
    const KIND: NodeKind = NodeKind::Acquisition;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn has_children(&self) -> HasChildren {
        self.datasets.has_children()
    }

    fn permission(&self) -> bool {
        self.can_admin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetNode {
    pub id: EntityId,
    pub label: String,
    pub dataset_type: DatasetType,
    pub processings: Vec<ProcessingNode>,
    /// `true` when this dataset is the output of a processing.
    pub processed: bool,
    can_delete: bool,
}

impl DatasetNode {
    pub fn new(
        id: EntityId,
        label: impl Into<String>,
        dataset_type: DatasetType,
        processings: Vec<ProcessingNode>,
        processed: bool,
        can_delete: bool,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            dataset_type,
            processings,
            processed,
            can_delete,
        }
    }

    pub fn can_delete(&self) -> bool {
        self.can_delete
    }
}

impl TreeNode for DatasetNode {
    const KIND: NodeKind = NodeKind::Dataset;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn has_children(&self) -> HasChildren {
        HasChildren::from_slice(&self.processings)
    }

    fn permission(&self) -> bool {
        self.can_delete
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingNode {
    pub id: EntityId,
    pub label: String,
    pub outputs: Vec<DatasetNode>,
    can_delete: bool,
}

impl ProcessingNode {
    pub fn new(
        id: EntityId,
        label: impl Into<String>,
        outputs: Vec<DatasetNode>,
        can_delete: bool,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            outputs,
            can_delete,
        }
    }

    pub fn can_delete(&self) -> bool {
        self.can_delete
    }
}

impl TreeNode for ProcessingNode {
    const KIND: NodeKind = NodeKind::Processing;

    fn id(&self) -> EntityId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn has_children(&self) -> HasChildren {
        HasChildren::from_slice(&self.outputs)
    }

    fn permission(&self) -> bool {
        self.can_delete
    }
}

/// Borrowed view over any node of the hierarchy.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Study(&'a StudyNode),
    Examination(&'a ExaminationNode),
    Acquisition(&'a DatasetAcquisitionNode),
    Dataset(&'a DatasetNode),
    Processing(&'a ProcessingNode),
}

impl NodeRef<'_> {
    pub fn key(&self) -> NodeKey {
        match self {
            NodeRef::Study(node) => node.key(),
            NodeRef::Examination(node) => node.key(),
            NodeRef::Acquisition(node) => node.key(),
            NodeRef::Dataset(node) => node.key(),
            NodeRef::Processing(node) => node.key(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            NodeRef::Study(node) => node.label(),
            NodeRef::Examination(node) => node.label(),
            NodeRef::Acquisition(node) => node.label(),
            NodeRef::Dataset(node) => node.label(),
            NodeRef::Processing(node) => node.label(),
        }
    }

    pub fn has_children(&self) -> HasChildren {
        match self {
            NodeRef::Study(node) => node.has_children(),
            NodeRef::Examination(node) => node.has_children(),
            NodeRef::Acquisition(node) => node.has_children(),
            NodeRef::Dataset(node) => node.has_children(),
            NodeRef::Processing(node) => node.has_children(),
        }
    }

    pub fn permission(&self) -> bool {
        match self {
            NodeRef::Study(node) => node.permission(),
            NodeRef::Examination(node) => node.permission(),
            NodeRef::Acquisition(node) => node.permission(),
            NodeRef::Dataset(node) => node.permission(),
            NodeRef::Processing(node) => node.permission(),
        }
    }
}

impl<'a> NodeRef<'a> {
    /// Direct child with `key`, if this node owns one.
    pub fn child(self, key: NodeKey) -> Option<NodeRef<'a>> {
        let id = key.id;
        match (self, key.kind) {
            (NodeRef::Study(study), NodeKind::Examination) => study
                .examinations
                .iter()
                .find(|exam| exam.id == id)
                .map(NodeRef::Examination),
            (NodeRef::Examination(exam), NodeKind::Acquisition) => exam
                .acquisitions
                .iter()
                .find(|acquisition| acquisition.id == id)
                .map(NodeRef::Acquisition),
            (NodeRef::Acquisition(acquisition), NodeKind::Dataset) => acquisition
                .datasets
                .iter()
                .find(|dataset| dataset.id == id)
                .map(NodeRef::Dataset),
            (NodeRef::Dataset(dataset), NodeKind::Processing) => dataset
                .processings
                .iter()
                .find(|processing| processing.id == id)
                .map(NodeRef::Processing),
            (NodeRef::Processing(processing), NodeKind::Dataset) => processing
                .outputs
                .iter()
                .find(|output| output.id == id)
                .map(NodeRef::Dataset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_dataset(id: EntityId, processings: Vec<ProcessingNode>) -> DatasetNode {
        DatasetNode::new(id, "ds", DatasetType::Mr, processings, false, true)
    }

    #[test]
    fn shallow_nodes_report_unknown_children() {
        let study = StudyNode::shallow(1, "Study", true);
        assert_eq!(study.has_children(), HasChildren::Unknown);
        assert!(study.can_admin());

        let acquisition = DatasetAcquisitionNode::shallow(42);
        assert_eq!(acquisition.label, "Dataset Acquisition n° 42");
        assert_eq!(acquisition.has_children(), HasChildren::Unknown);
        assert!(!acquisition.can_delete());
    }

    #[test]
    fn dataset_children_are_never_unknown() {
        assert_eq!(raw_dataset(1, vec![]).has_children(), HasChildren::Empty);

        let processing = ProcessingNode::new(2, "Segmentation", vec![], true);
        assert_eq!(processing.has_children(), HasChildren::Empty);
        assert_eq!(
            raw_dataset(1, vec![processing]).has_children(),
            HasChildren::NonEmpty
        );
    }

    #[test]
    fn node_ref_delegates_to_the_wrapped_node() {
        let processing = ProcessingNode::new(5, "Registration", vec![], false);
        let dataset = raw_dataset(5, vec![processing.clone()]);

        let as_processing = NodeRef::Processing(&processing);
        let as_dataset = NodeRef::Dataset(&dataset);
        assert_eq!(as_processing.key(), NodeKey::processing(5));
        assert_eq!(as_dataset.key(), NodeKey::dataset(5));
        assert_ne!(as_processing.key(), as_dataset.key());
        assert_eq!(as_processing.label(), "Registration");
        assert!(!as_processing.permission());
        assert!(as_dataset.permission());
        assert_eq!(as_dataset.has_children(), HasChildren::NonEmpty);
    }

    #[test]
    fn child_lookup_follows_the_kind_of_the_owner() {
        let output = DatasetNode::new(5, "output", DatasetType::Mr, vec![], true, true);
        let processing = ProcessingNode::new(5, "Registration", vec![output], true);
        let dataset = raw_dataset(5, vec![processing]);

        let raw = NodeRef::Dataset(&dataset);
        let processing = raw.child(NodeKey::processing(5)).unwrap();
        match processing.child(NodeKey::dataset(5)) {
            Some(NodeRef::Dataset(output)) => assert!(output.processed),
            other => panic!("expected processed output, found {other:?}"),
        }
        assert!(raw.child(NodeKey::dataset(5)).is_none());
        assert!(processing.child(NodeKey::dataset(6)).is_none());
    }
}
