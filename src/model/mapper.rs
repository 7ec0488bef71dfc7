//! Conversion from service DTOs to tree nodes.
//!
//! One function per level, each calling the level below. The capability flag is a plain
//! parameter resolved by the caller before the pass starts, so every node built in one pass
//! carries the same value. Absent child arrays become empty sequences: by the time a level is
//! mapped its parent already holds the response, so nothing here is ever `NotLoaded`.

use super::dto::{
    DatasetAcquisitionDto, DatasetDto, DatasetProcessingDto, StudyDto, SubjectExaminationDto,
};
use super::lazy::Children;
use super::node::{
    shallow_acquisition_label, DatasetAcquisitionNode, DatasetNode, ExaminationNode,
    ProcessingNode, StudyNode,
};
use crate::utils::examination_label;

/// A study without embedded examinations stays `NotLoaded`: that level was never requested.
pub fn map_study(dto: StudyDto, can_admin: bool) -> StudyNode {
    let examinations = match dto.examinations {
        Some(examinations) => Children::loaded(map_examinations(examinations, can_admin)),
        None => Children::NotLoaded,
    };
    StudyNode::new(dto.id, dto.name, examinations, can_admin)
}

/// Maps a response of examinations and orders it by examination date.
///
/// The sort is stable, so examinations sharing a date keep the response order. Undated
/// examinations come first.
pub fn map_examinations(
    dtos: Vec<SubjectExaminationDto>,
    can_admin: bool,
) -> Vec<ExaminationNode> {
    let mut examinations: Vec<_> = dtos
        .into_iter()
        .map(|dto| map_examination(dto, can_admin))
        .collect();
    examinations.sort_by_key(|examination| examination.examination_date);
    examinations
}

pub fn map_examination(dto: SubjectExaminationDto, can_admin: bool) -> ExaminationNode {
    let label = examination_label(dto.id, dto.examination_date, dto.comment.as_deref());
    let acquisitions = dto
        .dataset_acquisitions
        .unwrap_or_default()
        .into_iter()
        .map(|acquisition| map_acquisition(acquisition, can_admin))
        .collect();

    ExaminationNode::new(
        dto.id,
        label,
        dto.examination_date,
        Children::loaded(acquisitions),
        dto.extra_data_file_path_list,
        can_admin,
    )
}

pub fn map_acquisition(dto: DatasetAcquisitionDto, can_admin: bool) -> DatasetAcquisitionNode {
    let label = dto
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| shallow_acquisition_label(dto.id));
    let datasets = map_raw_datasets(dto.datasets.unwrap_or_default(), can_admin);

    DatasetAcquisitionNode::new(dto.id, label, Children::loaded(datasets), can_admin)
}

/// Datasets found directly under an acquisition.
pub fn map_raw_datasets(dtos: Vec<DatasetDto>, can_delete: bool) -> Vec<DatasetNode> {
    dtos.into_iter()
        .map(|dataset| map_dataset(dataset, false, can_delete))
        .collect()
}

pub fn map_dataset(dto: DatasetDto, processed: bool, can_delete: bool) -> DatasetNode {
    let processings = dto
        .processings
        .unwrap_or_default()
        .into_iter()
        .map(|processing| map_processing(processing, can_delete))
        .collect();

    DatasetNode::new(
        dto.id,
        dto.name,
        dto.dataset_type,
        processings,
        processed,
        can_delete,
    )
}

/// Output datasets may carry processings of their own; the recursion has no depth bound.
pub fn map_processing(dto: DatasetProcessingDto, can_delete: bool) -> ProcessingNode {
    let outputs = dto
        .output_datasets
        .unwrap_or_default()
        .into_iter()
        .map(|dataset| map_dataset(dataset, true, can_delete))
        .collect();

    ProcessingNode::new(
        dto.id,
        dto.dataset_processing_type.label(),
        outputs,
        can_delete,
    )
}
