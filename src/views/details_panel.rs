use crate::message::Message;
use crate::model::{Children, NodeRef};
use crate::utils::{format_date, format_flag};
use iced::widget::text::Wrapping;
use iced::widget::{column, row, scrollable, text};
use iced::{Element, Length};

fn child_count<T>(children: &Children<T>) -> String {
    match children {
        Children::NotLoaded => "not loaded".to_string(),
        Children::Loading => "loading…".to_string(),
        Children::Loaded(children) => children.len().to_string(),
    }
}

fn properties(node: NodeRef<'_>) -> Vec<(&'static str, String)> {
    let key = node.key();
    let mut rows = vec![
        ("Kind", key.kind.to_string()),
        ("Id", key.id.to_string()),
        ("Label", node.label().to_string()),
    ];

    match node {
        NodeRef::Study(study) => {
            rows.push(("Can administrate", format_flag(study.can_admin()).into()));
            rows.push(("Examinations", child_count(&study.examinations)));
        }
        NodeRef::Examination(exam) => {
            let date = exam.examination_date.map(format_date).unwrap_or_default();
            rows.push(("Date", date));
            rows.push(("Can administrate", format_flag(exam.can_admin()).into()));
            rows.push(("Acquisitions", child_count(&exam.acquisitions)));
            rows.extend(
                exam.extra_data_file_paths
                    .iter()
                    .map(|path| ("Extra data", path.clone())),
            );
        }
        NodeRef::Acquisition(acquisition) => {
            rows.push(("Can administrate", format_flag(acquisition.can_admin()).into()));
            rows.push(("Datasets", child_count(&acquisition.datasets)));
        }
        NodeRef::Dataset(dataset) => {
            rows.push(("Type", dataset.dataset_type.as_str().into()));
            rows.push(("Processed", format_flag(dataset.processed).into()));
            rows.push(("Can delete", format_flag(dataset.can_delete()).into()));
            rows.push(("Processings", dataset.processings.len().to_string()));
        }
        NodeRef::Processing(processing) => {
            rows.push(("Can delete", format_flag(processing.can_delete()).into()));
            rows.push(("Outputs", processing.outputs.len().to_string()));
        }
    }
    rows
}

pub fn details_panel<'a>(node: Option<NodeRef<'_>>, tree_empty: bool) -> Element<'a, Message> {
    let Some(node) = node else {
        return if tree_empty {
            text("Open a catalog to browse its studies").into()
        } else {
            text("Select a node to see its details").into()
        };
    };

    let table = properties(node)
        .into_iter()
        .fold(column![], |table, (name, value)| {
            table.push(
                row![
                    text(name).width(Length::FillPortion(1)),
                    text(value)
                        .width(Length::FillPortion(3))
                        .wrapping(Wrapping::Word),
                ]
                .spacing(12),
            )
        });

    column![text(node.key().to_string()).size(16), scrollable(table.spacing(8))]
        .spacing(12)
        .into()
}
