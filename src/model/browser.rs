//! Tree state owned by the browser: the roots, the lazy-load transitions, and the splice
//! that follows a confirmed deletion.

use std::collections::BTreeSet;

use super::dto::{DatasetDto, StudyDto, SubjectExaminationDto};
use super::mapper::{map_examinations, map_raw_datasets, map_study};
use super::mutation::{remove_child, Removal};
use super::node::{
    DatasetAcquisitionNode, DatasetNode, ExaminationNode, NodeRef, ProcessingNode, StudyNode,
    TreeNode,
};
use super::tree::{NodeKey, NodeKind, NodePath};
use super::EntityId;
use crate::error::ServiceResult;

#[derive(Debug, Clone, PartialEq)]
pub enum RootNode {
    Study(StudyNode),
    /// An acquisition opened on its own, outside any study.
    Acquisition(DatasetAcquisitionNode),
}

impl RootNode {
    pub fn key(&self) -> NodeKey {
        match self {
            RootNode::Study(study) => study.key(),
            RootNode::Acquisition(acquisition) => acquisition.key(),
        }
    }

    pub fn path(&self) -> NodePath {
        NodePath::root(self.key())
    }

    pub fn as_node(&self) -> NodeRef<'_> {
        match self {
            RootNode::Study(study) => NodeRef::Study(study),
            RootNode::Acquisition(acquisition) => NodeRef::Acquisition(acquisition),
        }
    }
}

/// Fetch to issue after a node entered `Loading` (or was asked to reload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRequest {
    Examinations {
        subject_id: EntityId,
        study_id: EntityId,
    },
    Datasets {
        acquisition_id: EntityId,
    },
}

impl FetchRequest {
    pub fn target(&self) -> NodeKey {
        match *self {
            FetchRequest::Examinations { study_id, .. } => NodeKey::study(study_id),
            FetchRequest::Datasets { acquisition_id } => NodeKey::acquisition(acquisition_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    NodeInitialized(NodeKey),
    SelectionChanged(Option<NodePath>),
    /// `parent` lost a child; `None` is the root list. Consumers re-read the parent's
    /// children to find out whether it is now empty.
    ChildDeleted { parent: Option<NodePath> },
}

enum NodeMut<'a> {
    Study(&'a mut StudyNode),
    Examination(&'a mut ExaminationNode),
    Acquisition(&'a mut DatasetAcquisitionNode),
    Dataset(&'a mut DatasetNode),
    Processing(&'a mut ProcessingNode),
}

impl<'a> NodeMut<'a> {
    fn key(&self) -> NodeKey {
        match self {
            NodeMut::Study(node) => node.key(),
            NodeMut::Examination(node) => node.key(),
            NodeMut::Acquisition(node) => node.key(),
            NodeMut::Dataset(node) => node.key(),
            NodeMut::Processing(node) => node.key(),
        }
    }

    fn child(self, key: NodeKey) -> Option<NodeMut<'a>> {
        let id = key.id;
        match (self, key.kind) {
            (NodeMut::Study(study), NodeKind::Examination) => study
                .examinations
                .iter_mut()
                .find(|exam| exam.id == id)
                .map(NodeMut::Examination),
            (NodeMut::Examination(exam), NodeKind::Acquisition) => exam
                .acquisitions
                .iter_mut()
                .find(|acquisition| acquisition.id == id)
                .map(NodeMut::Acquisition),
            (NodeMut::Acquisition(acquisition), NodeKind::Dataset) => acquisition
                .datasets
                .iter_mut()
                .find(|dataset| dataset.id == id)
                .map(NodeMut::Dataset),
            (NodeMut::Dataset(dataset), NodeKind::Processing) => dataset
                .processings
                .iter_mut()
                .find(|processing| processing.id == id)
                .map(NodeMut::Processing),
            (NodeMut::Processing(processing), NodeKind::Dataset) => processing
                .outputs
                .iter_mut()
                .find(|output| output.id == id)
                .map(NodeMut::Dataset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudyTree {
    subject_id: Option<EntityId>,
    roots: Vec<RootNode>,
    selected: Option<NodePath>,
    /// Nodes waiting on a fetch. Only these accept a response.
    in_flight: BTreeSet<NodePath>,
}

impl StudyTree {
    pub fn new(subject_id: Option<EntityId>) -> Self {
        Self {
            subject_id,
            ..Self::default()
        }
    }

    pub fn subject_id(&self) -> Option<EntityId> {
        self.subject_id
    }

    pub fn roots(&self) -> &[RootNode] {
        &self.roots
    }

    pub fn selected(&self) -> Option<&NodePath> {
        self.selected.as_ref()
    }

    /// Adds a study root, or rebuilds it if a root with the same id exists.
    ///
    /// `can_admin` must already be resolved for this study; it is stamped on every node
    /// built from `dto` and on everything later loaded under it. A fetch still running for
    /// the replaced study is forgotten.
    pub fn init_study(&mut self, dto: StudyDto, can_admin: bool) -> TreeEvent {
        let node = map_study(dto, can_admin);
        let key = node.key();
        match self.roots.iter_mut().find(|root| root.key() == key) {
            Some(root) => {
                *root = RootNode::Study(node);
                self.forget_below(&NodePath::root(key));
            }
            None => self.roots.push(RootNode::Study(node)),
        }
        log::debug!("Initialized {key} (can_admin={can_admin})");
        TreeEvent::NodeInitialized(key)
    }

    pub fn pin_acquisition(&mut self, acquisition_id: EntityId) -> TreeEvent {
        let key = NodeKey::acquisition(acquisition_id);
        if !self.roots.iter().any(|root| root.key() == key) {
            self.roots.push(RootNode::Acquisition(DatasetAcquisitionNode::shallow(
                acquisition_id,
            )));
            log::debug!("Initialized {key}");
        }
        TreeEvent::NodeInitialized(key)
    }

    /// Moves a `NotLoaded` node to `Loading` and returns the fetch to run. Returns `None` for
    /// nodes that are loading or loaded already, and for kinds that never load lazily.
    pub fn expand(&mut self, path: &NodePath) -> Option<FetchRequest> {
        let subject_id = self.subject_id;
        let request = match self.node_mut(path)? {
            NodeMut::Study(study) => {
                let Some(subject_id) = subject_id else {
                    log::warn!("Cannot load examinations of {path}: no subject selected");
                    return None;
                };
                study
                    .examinations
                    .begin_loading()
                    .then_some(FetchRequest::Examinations {
                        subject_id,
                        study_id: study.id,
                    })
            }
            NodeMut::Acquisition(acquisition) => acquisition
                .datasets
                .begin_loading()
                .then_some(FetchRequest::Datasets {
                    acquisition_id: acquisition.id,
                }),
            _ => None,
        };

        match request {
            Some(_) => {
                log::debug!("Expanding {path}");
                self.in_flight.insert(path.clone());
            }
            None => log::debug!("{path} needs no fetch"),
        }
        request
    }

    /// Re-fetches the children of a loaded node. The node keeps its current children until
    /// the response replaces them. Returns `None` while a fetch for the node is running.
    pub fn reload(&mut self, path: &NodePath) -> Option<FetchRequest> {
        if self.in_flight.contains(path) {
            log::debug!("{path} is already being fetched");
            return None;
        }
        let subject_id = self.subject_id;
        let request = match self.node_mut(path)? {
            NodeMut::Study(study) if study.examinations.is_loaded() => {
                FetchRequest::Examinations {
                    subject_id: subject_id?,
                    study_id: study.id,
                }
            }
            NodeMut::Acquisition(acquisition) if acquisition.datasets.is_loaded() => {
                FetchRequest::Datasets {
                    acquisition_id: acquisition.id,
                }
            }
            _ => return None,
        };
        log::debug!("Reloading {path}");
        self.in_flight.insert(path.clone());
        Some(request)
    }

    /// Applies an examination response to the study at `path`. Returns whether children
    /// were written. Responses nobody is waiting for are dropped.
    pub fn complete_examinations(
        &mut self,
        path: &NodePath,
        result: ServiceResult<Vec<SubjectExaminationDto>>,
    ) -> bool {
        if !self.in_flight.remove(path) {
            log::warn!("Dropping examinations for {path}: no fetch in flight");
            return false;
        }
        let Some(NodeMut::Study(study)) = self.node_mut(path) else {
            log::warn!("Dropping examinations for {path}: node is no longer in the tree");
            return false;
        };

        match result {
            Ok(dtos) => {
                let examinations = map_examinations(dtos, study.can_admin());
                log::debug!("Loaded {} examinations under {path}", examinations.len());
                study.examinations.finish_loading(examinations)
            }
            Err(err) => {
                // TODO: surface fetch failures in the tree panel instead of only logging them.
                log::warn!("Failed to load examinations of {path}: {err}");
                study.examinations.abandon_loading();
                false
            }
        }
    }

    /// Applies a dataset response to the acquisition at `path`. Returns whether children
    /// were written.
    pub fn complete_datasets(
        &mut self,
        path: &NodePath,
        result: ServiceResult<Vec<DatasetDto>>,
    ) -> bool {
        if !self.in_flight.remove(path) {
            log::warn!("Dropping datasets for {path}: no fetch in flight");
            return false;
        }
        let Some(NodeMut::Acquisition(acquisition)) = self.node_mut(path) else {
            log::warn!("Dropping datasets for {path}: node is no longer in the tree");
            return false;
        };

        match result {
            Ok(dtos) => {
                let datasets = map_raw_datasets(dtos, acquisition.can_delete());
                log::debug!("Loaded {} datasets under {path}", datasets.len());
                acquisition.datasets.finish_loading(datasets)
            }
            Err(err) => {
                log::warn!("Failed to load datasets of {path}: {err}");
                acquisition.datasets.abandon_loading();
                false
            }
        }
    }

    pub fn select(&mut self, path: Option<NodePath>) -> Option<TreeEvent> {
        if self.selected == path {
            return None;
        }
        self.selected = path.clone();
        Some(TreeEvent::SelectionChanged(path))
    }

    pub fn find(&self, path: &NodePath) -> Option<NodeRef<'_>> {
        let root = self
            .roots
            .iter()
            .find(|root| root.key() == path.root_key())?;
        path.descendants()
            .iter()
            .try_fold(root.as_node(), |node, key| node.child(*key))
    }

    /// Splices `child` out of the node at `parent` (out of the root list when `parent` is
    /// `None`) after the backend confirmed the deletion. A child that is already gone is a
    /// no-op.
    pub fn remove(&mut self, parent: Option<&NodePath>, child: NodeKey) -> Option<TreeEvent> {
        let (removal, removed) = match parent {
            None => (self.remove_root(child), NodePath::root(child)),
            Some(parent_path) => {
                let removal = match self.node_mut(parent_path) {
                    Some(parent_node) => splice(parent_node, child),
                    None => Removal::AlreadyAbsent,
                };
                (removal, parent_path.child(child))
            }
        };

        let Removal::Removed { index } = removal else {
            log::debug!("{removed} was already removed");
            return None;
        };
        log::debug!("Removed {removed} at position {index}");
        self.forget_below(&removed);
        if self.selected.as_ref().is_some_and(|path| self.find(path).is_none()) {
            self.selected = None;
        }
        Some(TreeEvent::ChildDeleted {
            parent: parent.cloned(),
        })
    }

    fn forget_below(&mut self, ancestor: &NodePath) {
        self.in_flight.retain(|path| !path.starts_with(ancestor));
    }

    fn remove_root(&mut self, child: NodeKey) -> Removal {
        match self.roots.iter().position(|root| root.key() == child) {
            Some(index) => {
                self.roots.remove(index);
                Removal::Removed { index }
            }
            None => Removal::AlreadyAbsent,
        }
    }

    fn node_mut(&mut self, path: &NodePath) -> Option<NodeMut<'_>> {
        let root = match self
            .roots
            .iter_mut()
            .find(|root| root.key() == path.root_key())?
        {
            RootNode::Study(study) => NodeMut::Study(study),
            RootNode::Acquisition(acquisition) => NodeMut::Acquisition(acquisition),
        };
        path.descendants()
            .iter()
            .try_fold(root, |node, key| node.child(*key))
    }
}

fn splice(parent: NodeMut<'_>, child: NodeKey) -> Removal {
    match (parent, child.kind) {
        (NodeMut::Study(study), NodeKind::Examination) => remove_child(study, child.id),
        (NodeMut::Examination(exam), NodeKind::Acquisition) => remove_child(exam, child.id),
        (NodeMut::Acquisition(acquisition), NodeKind::Dataset) => {
            remove_child(acquisition, child.id)
        }
        (NodeMut::Dataset(dataset), NodeKind::Processing) => remove_child(dataset, child.id),
        (NodeMut::Processing(processing), NodeKind::Dataset) => {
            remove_child(processing, child.id)
        }
        (parent, kind) => {
            log::warn!("{} cannot own a {kind}", parent.key());
            Removal::AlreadyAbsent
        }
    }
}
