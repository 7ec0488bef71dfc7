//! Boundary to the backend that owns the study hierarchy.

pub mod catalog;
pub mod confirm;
pub mod fixture;
#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::ServiceResult;
use crate::model::dto::{DatasetAcquisitionDto, DatasetDto, StudyUserRight, SubjectExaminationDto};
use crate::model::{EntityId, Session};

pub use confirm::DialogConfirm;
pub use fixture::FixtureService;

pub type ServiceFuture<T> = Pin<Box<dyn Future<Output = ServiceResult<T>> + Send + 'static>>;

/// Data access used by the tree. Futures own everything they need so they can run as
/// detached UI tasks.
pub trait StudyTreeService: fmt::Debug + Send + Sync {
    fn datasets_by_acquisition(&self, acquisition_id: EntityId) -> ServiceFuture<Vec<DatasetDto>>;

    /// Examinations embed their acquisitions, datasets and processings when the backend has
    /// them.
    fn examinations_by_subject_and_study(
        &self,
        subject_id: EntityId,
        study_id: EntityId,
    ) -> ServiceFuture<Vec<SubjectExaminationDto>>;

    fn acquisition_by_id(&self, acquisition_id: EntityId) -> ServiceFuture<DatasetAcquisitionDto>;

    /// Resolves to `true` only if the user confirmed and the acquisition was deleted.
    fn delete_acquisition_with_confirmation(
        &self,
        label: String,
        entity: DatasetAcquisitionDto,
    ) -> ServiceFuture<bool>;

    fn delete_dataset_with_confirmation(
        &self,
        label: String,
        dataset_id: EntityId,
    ) -> ServiceFuture<bool>;

    fn rights_for_study(&self, study_id: EntityId) -> ServiceFuture<Vec<StudyUserRight>>;

    fn is_system_admin(&self) -> bool;

    fn is_expert_user(&self) -> bool;

    fn session(&self) -> Session {
        Session {
            system_admin: self.is_system_admin(),
            expert: self.is_expert_user(),
        }
    }
}
