use std::sync::Arc;

use crate::error::ServiceResult;
use crate::model::dto::{DatasetDto, StudyDto, StudyUserRight, SubjectExaminationDto};
use crate::model::{EntityId, NodeKey, NodePath};
use crate::service::FixtureService;

/// Identifies the catalog a background task was started for.
pub type Generation = u64;

#[derive(Debug, Clone)]
pub enum Message {
    OpenCatalog,
    /// `None` when the file dialog was dismissed.
    CatalogLoaded(Option<ServiceResult<Arc<FixtureService>>>),
    RootsResolved {
        generation: Generation,
        studies: Vec<(StudyDto, ServiceResult<Vec<StudyUserRight>>)>,
        pinned_acquisitions: Vec<EntityId>,
    },
    ToggleNode(NodePath),
    ReloadNode(NodePath),
    SelectNode(NodePath),
    ExaminationsLoaded {
        generation: Generation,
        path: NodePath,
        result: ServiceResult<Vec<SubjectExaminationDto>>,
    },
    DatasetsLoaded {
        generation: Generation,
        path: NodePath,
        result: ServiceResult<Vec<DatasetDto>>,
    },
    DeleteAcquisition {
        parent: Option<NodePath>,
        acquisition_id: EntityId,
        label: String,
    },
    DeleteDataset {
        parent: NodePath,
        dataset_id: EntityId,
        label: String,
    },
    Deleted {
        generation: Generation,
        parent: Option<NodePath>,
        child: NodeKey,
        result: ServiceResult<bool>,
    },
}
