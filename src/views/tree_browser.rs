use crate::message::Message;
use crate::model::{
    DatasetAcquisitionNode, DatasetNode, ExaminationNode, HasChildren, NodePath, NodeRef,
    ProcessingNode, RootNode, StudyNode, StudyTree, TreeNode,
};
use crate::utils::formatting::truncate;
use iced::widget::{button, column, row, text, Column, Row, Space};
use iced::Length;
use std::collections::BTreeSet;

const INDENT: f32 = 18.0;

struct TreeState<'s> {
    expanded: &'s BTreeSet<NodePath>,
    selected: Option<&'s NodePath>,
}

impl TreeState<'_> {
    fn is_open(&self, node: NodeRef<'_>, path: &NodePath) -> bool {
        node.has_children() == HasChildren::NonEmpty && self.expanded.contains(path)
    }
}

pub fn tree_panel<'a>(tree: &'a StudyTree, expanded: &BTreeSet<NodePath>) -> Column<'a, Message> {
    let root = column![text("Studies").size(20)];

    if tree.roots().is_empty() {
        return root.push(text("No studies loaded"));
    }

    let state = TreeState {
        expanded,
        selected: tree.selected(),
    };

    tree.roots()
        .iter()
        .fold(root, |column, node| {
            let path = node.path();
            match node {
                RootNode::Study(study) => push_study(column, &state, study, &path),
                RootNode::Acquisition(acquisition) => {
                    push_acquisition(column, &state, acquisition, &path, 0)
                }
            }
        })
        .spacing(6)
}

fn node_row<'a>(
    state: &TreeState<'_>,
    node: NodeRef<'_>,
    path: &NodePath,
    loading: bool,
    depth: usize,
) -> Row<'a, Message> {
    let has_children = node.has_children();
    let marker = if loading {
        "…"
    } else if has_children == HasChildren::Empty {
        "•"
    } else if state.is_open(node, path) {
        "▼"
    } else {
        "▶"
    };

    let label = truncate(node.label());
    let label = if state.selected == Some(path) {
        format!("» {label}")
    } else {
        label
    };

    row![
        Space::with_width(Length::Fixed(INDENT * depth as f32)),
        button(text(marker)).on_press_maybe(
            (!loading && has_children.is_expandable())
                .then(|| Message::ToggleNode(path.clone()))
        ),
        button(text(label)).on_press(Message::SelectNode(path.clone())),
    ]
    .spacing(6)
}

fn reload_button<'a>(path: &NodePath) -> iced::widget::Button<'a, Message> {
    button(text("Reload").size(14)).on_press(Message::ReloadNode(path.clone()))
}

fn delete_button<'a>(message: Message) -> iced::widget::Button<'a, Message> {
    button(text("Delete").size(14)).on_press(message)
}

fn push_study<'a>(
    column: Column<'a, Message>,
    state: &TreeState<'_>,
    study: &StudyNode,
    path: &NodePath,
) -> Column<'a, Message> {
    let node = NodeRef::Study(study);
    let mut line = node_row(state, node, path, study.examinations.is_loading(), 0);
    if study.examinations.is_loaded() {
        line = line.push(reload_button(path));
    }
    let column = column.push(line);

    if !state.is_open(node, path) {
        return column;
    }
    study.examinations.iter().fold(column, |column, exam| {
        push_examination(column, state, exam, &path.child(exam.key()), 1)
    })
}

fn push_examination<'a>(
    column: Column<'a, Message>,
    state: &TreeState<'_>,
    exam: &ExaminationNode,
    path: &NodePath,
    depth: usize,
) -> Column<'a, Message> {
    let node = NodeRef::Examination(exam);
    let column = column.push(node_row(state, node, path, false, depth));

    if !state.is_open(node, path) {
        return column;
    }
    exam.acquisitions.iter().fold(column, |column, acquisition| {
        let child = path.child(acquisition.key());
        push_acquisition(column, state, acquisition, &child, depth + 1)
    })
}

fn push_acquisition<'a>(
    column: Column<'a, Message>,
    state: &TreeState<'_>,
    acquisition: &DatasetAcquisitionNode,
    path: &NodePath,
    depth: usize,
) -> Column<'a, Message> {
    let node = NodeRef::Acquisition(acquisition);
    let mut line = node_row(state, node, path, acquisition.datasets.is_loading(), depth);
    if acquisition.datasets.is_loaded() {
        line = line.push(reload_button(path));
    }
    if node.permission() {
        line = line.push(delete_button(Message::DeleteAcquisition {
            parent: path.parent(),
            acquisition_id: acquisition.id,
            label: acquisition.label.clone(),
        }));
    }
    let column = column.push(line);

    if !state.is_open(node, path) {
        return column;
    }
    acquisition.datasets.iter().fold(column, |column, dataset| {
        push_dataset(column, state, dataset, &path.child(dataset.key()), depth + 1)
    })
}

fn push_dataset<'a>(
    column: Column<'a, Message>,
    state: &TreeState<'_>,
    dataset: &DatasetNode,
    path: &NodePath,
    depth: usize,
) -> Column<'a, Message> {
    let node = NodeRef::Dataset(dataset);
    let mut line = node_row(state, node, path, false, depth);
    // Processed outputs are not deletable from the tree.
    if !dataset.processed && node.permission() {
        if let Some(parent) = path.parent() {
            line = line.push(delete_button(Message::DeleteDataset {
                parent,
                dataset_id: dataset.id,
                label: dataset.label.clone(),
            }));
        }
    }
    let column = column.push(line);

    if !state.is_open(node, path) {
        return column;
    }
    dataset.processings.iter().fold(column, |column, processing| {
        let child = path.child(processing.key());
        push_processing(column, state, processing, &child, depth + 1)
    })
}

fn push_processing<'a>(
    column: Column<'a, Message>,
    state: &TreeState<'_>,
    processing: &ProcessingNode,
    path: &NodePath,
    depth: usize,
) -> Column<'a, Message> {
    let node = NodeRef::Processing(processing);
    let column = column.push(node_row(state, node, path, false, depth));

    if !state.is_open(node, path) {
        return column;
    }
    processing.outputs.iter().fold(column, |column, output| {
        push_dataset(column, state, output, &path.child(output.key()), depth + 1)
    })
}
