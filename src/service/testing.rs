//! Shared catalog fixture for unit tests.

use serde_json::json;

use super::catalog::Catalog;

pub(crate) fn sample_catalog_json() -> serde_json::Value {
    json!({
        "subjectId": 3,
        "session": { "systemAdmin": false, "expert": true },
        "pinnedAcquisitions": [200],
        "studies": [
            {
                "id": 1,
                "name": "Neuro cohort",
                "rights": ["CAN_SEE_ALL", "CAN_ADMINISTRATE"],
                "examinations": [
                    {
                        "subjectId": 3,
                        "id": 10,
                        "examinationDate": "2020-03-02",
                        "datasetAcquisitions": [
                            { "id": 100, "name": "T1", "datasets": [
                                { "id": 5, "name": "t1", "type": "Mr" },
                                { "id": 6, "name": "t1 bis", "type": "Mr" }
                            ] }
                        ]
                    },
                    { "subjectId": 3, "id": 11, "examinationDate": "2020-01-05" },
                    { "subjectId": 4, "id": 12, "examinationDate": "2019-01-01" }
                ]
            },
            {
                "id": 2,
                "name": "Read-only study",
                "rights": ["CAN_SEE_ALL"],
                "examinations": [
                    {
                        "subjectId": 3,
                        "id": 20,
                        "datasetAcquisitions": [
                            { "id": 200, "datasets": [{ "id": 7, "name": "pet", "type": "Pet" }] }
                        ]
                    }
                ]
            }
        ]
    })
}

pub(crate) fn sample_catalog() -> Catalog {
    serde_json::from_value(sample_catalog_json()).unwrap()
}
