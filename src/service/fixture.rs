use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use super::catalog::{load_catalog, Catalog};
use super::confirm::Confirm;
use super::{ServiceFuture, StudyTreeService};
use crate::error::{ServiceError, ServiceResult};
use crate::model::dto::{
    DatasetAcquisitionDto, DatasetDto, StudyDto, StudyUserRight, SubjectExaminationDto,
};
use crate::model::{EntityId, NodeKind, Session};

/// Serves the hierarchy from a catalog held in memory. Deletions only change that copy.
#[derive(Debug, Clone)]
pub struct FixtureService {
    catalog: Arc<Mutex<Catalog>>,
    session: Session,
    confirm: Arc<dyn Confirm>,
}

fn lock(catalog: &Mutex<Catalog>) -> ServiceResult<MutexGuard<'_, Catalog>> {
    catalog.lock().map_err(|_| ServiceError::Unavailable)
}

impl FixtureService {
    pub fn new(catalog: Catalog, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            session: catalog.session,
            catalog: Arc::new(Mutex::new(catalog)),
            confirm,
        }
    }

    pub fn open(path: PathBuf, confirm: Arc<dyn Confirm>) -> ServiceResult<Self> {
        let catalog = load_catalog(path)?;
        log::info!(
            "Catalog loaded: {} studies, {} pinned acquisitions",
            catalog.studies.len(),
            catalog.pinned_acquisitions.len()
        );
        Ok(Self::new(catalog, confirm))
    }

    pub fn subject_id(&self) -> ServiceResult<Option<EntityId>> {
        Ok(lock(&self.catalog)?.subject_id)
    }

    pub fn study_refs(&self) -> ServiceResult<Vec<StudyDto>> {
        Ok(lock(&self.catalog)?.study_refs())
    }

    pub fn pinned_acquisitions(&self) -> ServiceResult<Vec<EntityId>> {
        Ok(lock(&self.catalog)?.pinned_acquisitions.clone())
    }

    fn query<T, F>(&self, query: F) -> ServiceFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&Catalog) -> ServiceResult<T> + Send + 'static,
    {
        let catalog = Arc::clone(&self.catalog);
        Box::pin(async move { query(&*lock(&catalog)?) })
    }

    fn delete_with_confirmation<F>(
        &self,
        kind: NodeKind,
        label: String,
        remove: F,
    ) -> ServiceFuture<bool>
    where
        F: FnOnce(&mut Catalog) -> bool + Send + 'static,
    {
        let catalog = Arc::clone(&self.catalog);
        let confirm = Arc::clone(&self.confirm);
        Box::pin(async move {
            let description = format!("Are you sure you want to delete {label}?");
            if !confirm.confirm(format!("Delete {kind}"), description).await {
                log::debug!("Deletion of {label} cancelled");
                return Ok(false);
            }

            let removed = remove(&mut *lock(&catalog)?);
            if removed {
                log::info!("Deleted {kind} {label}");
            } else {
                log::warn!("{kind} {label} was already gone");
            }
            Ok(removed)
        })
    }
}

impl StudyTreeService for FixtureService {
    fn datasets_by_acquisition(&self, acquisition_id: EntityId) -> ServiceFuture<Vec<DatasetDto>> {
        self.query(move |catalog| {
            catalog
                .acquisition(acquisition_id)
                .map(|acquisition| acquisition.datasets.clone().unwrap_or_default())
                .ok_or(ServiceError::NotFound {
                    kind: NodeKind::Acquisition,
                    id: acquisition_id,
                })
        })
    }

    fn examinations_by_subject_and_study(
        &self,
        subject_id: EntityId,
        study_id: EntityId,
    ) -> ServiceFuture<Vec<SubjectExaminationDto>> {
        self.query(move |catalog| {
            let study = catalog.study(study_id).ok_or(ServiceError::NotFound {
                kind: NodeKind::Study,
                id: study_id,
            })?;
            Ok(study
                .examinations
                .iter()
                .filter(|exam| exam.subject_id == subject_id)
                .map(|exam| exam.examination.clone())
                .collect())
        })
    }

    fn acquisition_by_id(&self, acquisition_id: EntityId) -> ServiceFuture<DatasetAcquisitionDto> {
        self.query(move |catalog| {
            catalog
                .acquisition(acquisition_id)
                .cloned()
                .ok_or(ServiceError::NotFound {
                    kind: NodeKind::Acquisition,
                    id: acquisition_id,
                })
        })
    }

    fn delete_acquisition_with_confirmation(
        &self,
        label: String,
        entity: DatasetAcquisitionDto,
    ) -> ServiceFuture<bool> {
        self.delete_with_confirmation(NodeKind::Acquisition, label, move |catalog| {
            catalog.remove_acquisition(entity.id)
        })
    }

    fn delete_dataset_with_confirmation(
        &self,
        label: String,
        dataset_id: EntityId,
    ) -> ServiceFuture<bool> {
        self.delete_with_confirmation(NodeKind::Dataset, label, move |catalog| {
            catalog.remove_dataset(dataset_id)
        })
    }

    fn rights_for_study(&self, study_id: EntityId) -> ServiceFuture<Vec<StudyUserRight>> {
        self.query(move |catalog| {
            catalog
                .study(study_id)
                .map(|study| study.rights.clone())
                .ok_or(ServiceError::NotFound {
                    kind: NodeKind::Study,
                    id: study_id,
                })
        })
    }

    fn is_system_admin(&self) -> bool {
        self.session.system_admin
    }

    fn is_expert_user(&self) -> bool {
        self.session.expert
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::confirm::FixedConfirm;
    use crate::service::testing::sample_catalog;

    fn service(answer: bool) -> FixtureService {
        FixtureService::new(sample_catalog(), Arc::new(FixedConfirm(answer)))
    }

    #[tokio::test]
    async fn examinations_are_filtered_by_subject() {
        let exams = service(true)
            .examinations_by_subject_and_study(3, 1)
            .await
            .unwrap();
        let ids: Vec<_> = exams.iter().map(|exam| exam.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[tokio::test]
    async fn unknown_study_is_not_found() {
        let err = service(true)
            .examinations_by_subject_and_study(3, 99)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotFound {
                kind: NodeKind::Study,
                id: 99
            }
        ));
    }

    #[tokio::test]
    async fn datasets_come_back_in_catalog_order() {
        let datasets = service(true).datasets_by_acquisition(100).await.unwrap();
        let ids: Vec<_> = datasets.iter().map(|dataset| dataset.id).collect();
        assert_eq!(ids, vec![5, 6]);
    }

    #[tokio::test]
    async fn rights_and_session_come_from_the_catalog() {
        let service = service(true);
        let rights = service.rights_for_study(1).await.unwrap();
        assert!(rights.contains(&StudyUserRight::CanAdministrate));
        assert!(service.is_expert_user());
        assert!(!service.is_system_admin());
        assert!(service.session().can_admin(&rights));
    }

    #[tokio::test]
    async fn confirmed_delete_removes_the_acquisition() {
        let service = service(true);
        let entity = service.acquisition_by_id(100).await.unwrap();

        let deleted = service
            .delete_acquisition_with_confirmation("T1".into(), entity)
            .await
            .unwrap();
        assert!(deleted);
        assert!(service.acquisition_by_id(100).await.is_err());
    }

    #[tokio::test]
    async fn declined_delete_keeps_the_acquisition() {
        let service = service(false);
        let entity = service.acquisition_by_id(100).await.unwrap();

        let deleted = service
            .delete_acquisition_with_confirmation("T1".into(), entity)
            .await
            .unwrap();
        assert!(!deleted);
        assert!(service.acquisition_by_id(100).await.is_ok());
    }

    #[tokio::test]
    async fn dataset_delete_only_reports_real_removals() {
        let service = service(true);
        assert!(service
            .delete_dataset_with_confirmation("t1".into(), 5)
            .await
            .unwrap());
        assert!(!service
            .delete_dataset_with_confirmation("t1".into(), 5)
            .await
            .unwrap());
    }
}
