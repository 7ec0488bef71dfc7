pub mod browser;
pub mod dto;
pub mod lazy;
pub mod mapper;
pub mod mutation;
pub mod node;
pub mod permission;
pub mod tree;

pub type EntityId = u64;

pub use browser::{FetchRequest, RootNode, StudyTree, TreeEvent};
pub use lazy::{Children, HasChildren};
pub use node::{
    DatasetAcquisitionNode, DatasetNode, ExaminationNode, NodeRef, ProcessingNode, StudyNode,
    TreeNode,
};
pub use permission::Session;
pub use tree::{NodeKey, NodeKind, NodePath};
