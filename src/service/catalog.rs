use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};
use crate::model::dto::{DatasetAcquisitionDto, StudyDto, StudyUserRight, SubjectExaminationDto};
use crate::model::{EntityId, Session};

/// In-memory export of a study hierarchy, read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub subject_id: Option<EntityId>,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub studies: Vec<CatalogStudy>,
    #[serde(default)]
    pub pinned_acquisitions: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStudy {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub rights: Vec<StudyUserRight>,
    #[serde(default)]
    pub examinations: Vec<CatalogExamination>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogExamination {
    pub subject_id: EntityId,
    #[serde(flatten)]
    pub examination: SubjectExaminationDto,
}

pub fn load_catalog(path: PathBuf) -> ServiceResult<Catalog> {
    log::info!("Loading catalog: {}", path.display());
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) => {
            log::error!("{}: failed to read catalog ({err})", path.display());
            return Err(ServiceError::CatalogRead {
                path,
                source: Arc::new(err),
            });
        }
    };

    serde_json::from_str(&contents).map_err(|err| {
        log::error!("{}: failed to parse catalog ({err})", path.display());
        ServiceError::CatalogParse {
            path,
            source: Arc::new(err),
        }
    })
}

impl Catalog {
    /// Studies as shallow references, in catalog order.
    pub fn study_refs(&self) -> Vec<StudyDto> {
        self.studies
            .iter()
            .map(|study| StudyDto {
                id: study.id,
                name: study.name.clone(),
                examinations: None,
            })
            .collect()
    }

    pub fn study(&self, study_id: EntityId) -> Option<&CatalogStudy> {
        self.studies.iter().find(|study| study.id == study_id)
    }

    fn acquisitions(&self) -> impl Iterator<Item = &DatasetAcquisitionDto> {
        self.studies
            .iter()
            .flat_map(|study| &study.examinations)
            .flat_map(|exam| exam.examination.dataset_acquisitions.iter().flatten())
    }

    fn acquisitions_mut(&mut self) -> impl Iterator<Item = &mut DatasetAcquisitionDto> {
        self.studies
            .iter_mut()
            .flat_map(|study| &mut study.examinations)
            .flat_map(|exam| exam.examination.dataset_acquisitions.iter_mut().flatten())
    }

    pub fn acquisition(&self, acquisition_id: EntityId) -> Option<&DatasetAcquisitionDto> {
        self.acquisitions()
            .find(|acquisition| acquisition.id == acquisition_id)
    }

    /// Removes an acquisition wherever it is referenced. Returns whether anything was removed.
    pub fn remove_acquisition(&mut self, acquisition_id: EntityId) -> bool {
        let mut removed = false;
        for exam in self.studies.iter_mut().flat_map(|study| &mut study.examinations) {
            if let Some(acquisitions) = exam.examination.dataset_acquisitions.as_mut() {
                let before = acquisitions.len();
                acquisitions.retain(|acquisition| acquisition.id != acquisition_id);
                removed |= acquisitions.len() != before;
            }
        }
        self.pinned_acquisitions.retain(|id| *id != acquisition_id);
        removed
    }

    /// Removes a raw dataset from every acquisition that lists it.
    pub fn remove_dataset(&mut self, dataset_id: EntityId) -> bool {
        let mut removed = false;
        for acquisition in self.acquisitions_mut() {
            if let Some(datasets) = acquisition.datasets.as_mut() {
                let before = datasets.len();
                datasets.retain(|dataset| dataset.id != dataset_id);
                removed |= datasets.len() != before;
            }
        }
        removed
    }
}
