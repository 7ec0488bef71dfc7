//! Transfer objects as returned by the data service.
//!
//! Field names follow the backend JSON (camelCase). Every nested collection is optional: a
//! response that omits a children array is still valid and maps to an empty sequence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudyUserRight {
    CanSeeAll,
    CanDownload,
    CanImport,
    CanAdministrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetType {
    Mr,
    Ct,
    Pet,
    Spect,
    Eeg,
    Meg,
    Xa,
    Segmentation,
    Mesh,
    Registration,
    Calibration,
    ParameterQuantification,
    Template,
    Measurement,
    Bids,
    #[serde(other)]
    Generic,
}

impl DatasetType {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetType::Mr => "MR",
            DatasetType::Ct => "CT",
            DatasetType::Pet => "PET",
            DatasetType::Spect => "SPECT",
            DatasetType::Eeg => "EEG",
            DatasetType::Meg => "MEG",
            DatasetType::Xa => "XA",
            DatasetType::Segmentation => "Segmentation",
            DatasetType::Mesh => "Mesh",
            DatasetType::Registration => "Registration",
            DatasetType::Calibration => "Calibration",
            DatasetType::ParameterQuantification => "Parameter quantification",
            DatasetType::Template => "Template",
            DatasetType::Measurement => "Measurement",
            DatasetType::Bids => "BIDS",
            DatasetType::Generic => "Generic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetProcessingType {
    FormatConversion,
    Segmentation,
    Registration,
    Denoising,
    BiasFieldCorrection,
    SkullStripping,
    ParameterQuantification,
    Anonymisation,
    #[serde(other)]
    Other,
}

impl DatasetProcessingType {
    /// Human-readable name, used as the processing node label.
    pub fn label(self) -> &'static str {
        match self {
            DatasetProcessingType::FormatConversion => "Format conversion",
            DatasetProcessingType::Segmentation => "Segmentation",
            DatasetProcessingType::Registration => "Registration",
            DatasetProcessingType::Denoising => "Denoising",
            DatasetProcessingType::BiasFieldCorrection => "Bias field correction",
            DatasetProcessingType::SkullStripping => "Skull stripping",
            DatasetProcessingType::ParameterQuantification => "Parameter quantification",
            DatasetProcessingType::Anonymisation => "Anonymisation",
            DatasetProcessingType::Other => "Other processing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyDto {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examinations: Option<Vec<SubjectExaminationDto>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectExaminationDto {
    pub id: EntityId,
    #[serde(default)]
    pub examination_date: Option<NaiveDate>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub dataset_acquisitions: Option<Vec<DatasetAcquisitionDto>>,
    #[serde(default)]
    pub extra_data_file_path_list: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetAcquisitionDto {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub datasets: Option<Vec<DatasetDto>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDto {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type", default = "generic_dataset_type")]
    pub dataset_type: DatasetType,
    #[serde(default)]
    pub processings: Option<Vec<DatasetProcessingDto>>,
}

fn generic_dataset_type() -> DatasetType {
    DatasetType::Generic
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetProcessingDto {
    pub id: EntityId,
    pub dataset_processing_type: DatasetProcessingType,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub processing_date: Option<NaiveDate>,
    #[serde(default)]
    pub output_datasets: Option<Vec<DatasetDto>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn examination_accepts_backend_json() {
        let exam: SubjectExaminationDto = serde_json::from_value(json!({
            "id": 10,
            "examinationDate": "2020-03-02",
            "comment": "baseline",
            "extraDataFilePathList": ["notes.pdf"],
            "datasetAcquisitions": [{
                "id": 100,
                "name": "T1 MPRAGE",
                "datasets": [{
                    "id": 5,
                    "name": "t1",
                    "type": "Mr",
                    "processings": [{
                        "id": 7,
                        "datasetProcessingType": "SEGMENTATION",
                        "outputDatasets": [{ "id": 8, "name": "t1-seg", "type": "Segmentation" }]
                    }]
                }]
            }]
        }))
        .unwrap();

        assert_eq!(exam.examination_date, NaiveDate::from_ymd_opt(2020, 3, 2));
        let acquisition = &exam.dataset_acquisitions.as_ref().unwrap()[0];
        let dataset = &acquisition.datasets.as_ref().unwrap()[0];
        assert_eq!(dataset.dataset_type, DatasetType::Mr);
        let processing = &dataset.processings.as_ref().unwrap()[0];
        assert_eq!(
            processing.dataset_processing_type,
            DatasetProcessingType::Segmentation
        );
        assert!(processing.output_datasets.as_ref().unwrap()[0]
            .processings
            .is_none());
    }

    #[test]
    fn absent_fields_fall_back_to_defaults() {
        let exam: SubjectExaminationDto = serde_json::from_value(json!({ "id": 3 })).unwrap();
        assert!(exam.examination_date.is_none());
        assert!(exam.dataset_acquisitions.is_none());
        assert!(exam.extra_data_file_path_list.is_empty());

        let dataset: DatasetDto =
            serde_json::from_value(json!({ "id": 1, "name": "x", "type": "Hologram" })).unwrap();
        assert_eq!(dataset.dataset_type, DatasetType::Generic);
    }

    #[test]
    fn rights_use_backend_names() {
        let rights: Vec<StudyUserRight> =
            serde_json::from_value(json!(["CAN_SEE_ALL", "CAN_ADMINISTRATE"])).unwrap();
        assert_eq!(
            rights,
            vec![StudyUserRight::CanSeeAll, StudyUserRight::CanAdministrate]
        );
    }
}
