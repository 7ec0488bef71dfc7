use crate::config::Config;
use crate::message::{Generation, Message};
use crate::model::{FetchRequest, HasChildren, NodeKey, NodePath, StudyTree, TreeEvent};
use crate::service::{DialogConfirm, FixtureService, StudyTreeService};
use crate::views::{details_panel, tree_panel};
use iced::widget::text::Wrapping;
use iced::widget::{button, column, container, row, scrollable, text};
use iced::{application, Element, Length, Task, Theme};
use rfd::AsyncFileDialog;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

const APP_TITLE: &str = "Study Tree";

pub fn run() -> iced::Result {
    dotenvy::dotenv().ok();

    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .try_init();

    let config = Config::from_env().unwrap_or_else(|err| {
        log::error!("Ignoring environment configuration: {err}");
        Config::default()
    });

    application(APP_TITLE, App::update, App::view)
        .theme(App::theme)
        .run_with(move || App::new(config))
}

pub struct App {
    config: Config,
    service: Option<Arc<dyn StudyTreeService>>,
    tree: StudyTree,
    expanded: BTreeSet<NodePath>,
    /// Bumped whenever a catalog is installed; results of older tasks are ignored.
    generation: Generation,
    last_error: Option<String>,
}

fn open_catalog(path: PathBuf) -> Task<Message> {
    Task::perform(
        async move { Some(FixtureService::open(path, Arc::new(DialogConfirm)).map(Arc::new)) },
        Message::CatalogLoaded,
    )
}

impl App {
    pub fn new(config: Config) -> (Self, Task<Message>) {
        let task = match config.catalog_path.clone() {
            Some(path) => open_catalog(path),
            None => Task::none(),
        };
        let app = Self {
            tree: StudyTree::new(config.subject_id),
            config,
            service: None,
            expanded: BTreeSet::new(),
            generation: 0,
            last_error: None,
        };
        (app, task)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenCatalog => Task::perform(
                async {
                    let handle = AsyncFileDialog::new()
                        .add_filter("Catalog", &["json"])
                        .pick_file()
                        .await?;
                    Some(
                        FixtureService::open(handle.path().to_path_buf(), Arc::new(DialogConfirm))
                            .map(Arc::new),
                    )
                },
                Message::CatalogLoaded,
            ),
            Message::CatalogLoaded(None) => Task::none(),
            Message::CatalogLoaded(Some(Err(err))) => {
                self.last_error = Some(err.to_string());
                Task::none()
            }
            Message::CatalogLoaded(Some(Ok(service))) => self.install_service(service),
            Message::RootsResolved {
                generation,
                studies,
                pinned_acquisitions,
            } => {
                if self.is_stale(generation, "study roots") {
                    return Task::none();
                }
                let Some(service) = self.service.clone() else {
                    return Task::none();
                };
                let session = service.session();
                for (study, rights) in studies {
                    let rights = rights.unwrap_or_else(|err| {
                        log::warn!("Rights for study {} unavailable: {err}", study.id);
                        Vec::new()
                    });
                    let event = self.tree.init_study(study, session.can_admin(&rights));
                    self.on_event(event);
                }
                for acquisition_id in pinned_acquisitions {
                    let event = self.tree.pin_acquisition(acquisition_id);
                    self.on_event(event);
                }
                Task::none()
            }
            Message::ToggleNode(path) => match self.tree.expand(&path) {
                Some(request) => {
                    self.expanded.insert(path.clone());
                    self.fetch(path, request)
                }
                None => {
                    if !self.expanded.remove(&path) {
                        self.expanded.insert(path);
                    }
                    Task::none()
                }
            },
            Message::ReloadNode(path) => match self.tree.reload(&path) {
                Some(request) => self.fetch(path, request),
                None => Task::none(),
            },
            Message::SelectNode(path) => {
                if let Some(event) = self.tree.select(Some(path)) {
                    self.on_event(event);
                }
                Task::none()
            }
            Message::ExaminationsLoaded {
                generation,
                path,
                result,
            } => {
                if !self.is_stale(generation, "examinations")
                    && !self.tree.complete_examinations(&path, result)
                {
                    self.collapse_if_unloaded(&path);
                }
                Task::none()
            }
            Message::DatasetsLoaded {
                generation,
                path,
                result,
            } => {
                if !self.is_stale(generation, "datasets")
                    && !self.tree.complete_datasets(&path, result)
                {
                    self.collapse_if_unloaded(&path);
                }
                Task::none()
            }
            Message::DeleteAcquisition {
                parent,
                acquisition_id,
                label,
            } => {
                let Some(service) = self.service.clone() else {
                    return Task::none();
                };
                let generation = self.generation;
                Task::perform(
                    async move {
                        let entity = service.acquisition_by_id(acquisition_id).await?;
                        service
                            .delete_acquisition_with_confirmation(label, entity)
                            .await
                    },
                    move |result| Message::Deleted {
                        generation,
                        parent: parent.clone(),
                        child: NodeKey::acquisition(acquisition_id),
                        result,
                    },
                )
            }
            Message::DeleteDataset {
                parent,
                dataset_id,
                label,
            } => {
                let Some(service) = self.service.clone() else {
                    return Task::none();
                };
                let generation = self.generation;
                Task::perform(
                    service.delete_dataset_with_confirmation(label, dataset_id),
                    move |result| Message::Deleted {
                        generation,
                        parent: Some(parent.clone()),
                        child: NodeKey::dataset(dataset_id),
                        result,
                    },
                )
            }
            Message::Deleted {
                generation,
                parent,
                child,
                result,
            } => {
                if self.is_stale(generation, "deletion") {
                    return Task::none();
                }
                match result {
                    Ok(true) => {
                        let removed = match &parent {
                            Some(parent) => parent.child(child),
                            None => NodePath::root(child),
                        };
                        self.expanded.retain(|path| !path.starts_with(&removed));
                        if let Some(event) = self.tree.remove(parent.as_ref(), child) {
                            self.on_event(event);
                        }
                    }
                    Ok(false) => log::debug!("{child} kept"),
                    Err(err) => {
                        log::warn!("Failed to delete {child}: {err}");
                        self.last_error = Some(err.to_string());
                    }
                }
                Task::none()
            }
        }
    }

    fn install_service(&mut self, service: Arc<FixtureService>) -> Task<Message> {
        let catalog = service
            .subject_id()
            .and_then(|subject_id| Ok((subject_id, service.study_refs()?)))
            .and_then(|(subject_id, studies)| {
                Ok((subject_id, studies, service.pinned_acquisitions()?))
            });
        let (catalog_subject, studies, pinned_acquisitions) = match catalog {
            Ok(catalog) => catalog,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return Task::none();
            }
        };

        let subject_id = self.config.subject_id.or(catalog_subject);
        if subject_id.is_none() {
            log::warn!("No subject configured; study examinations cannot be loaded");
        }
        self.tree = StudyTree::new(subject_id);
        self.expanded.clear();
        self.generation += 1;
        self.last_error = None;

        let service: Arc<dyn StudyTreeService> = service;
        self.service = Some(Arc::clone(&service));

        let generation = self.generation;
        Task::perform(
            async move {
                let mut resolved = Vec::with_capacity(studies.len());
                for study in studies {
                    let rights = service.rights_for_study(study.id).await;
                    resolved.push((study, rights));
                }
                resolved
            },
            move |studies| Message::RootsResolved {
                generation,
                studies,
                pinned_acquisitions: pinned_acquisitions.clone(),
            },
        )
    }

    fn fetch(&self, path: NodePath, request: FetchRequest) -> Task<Message> {
        let Some(service) = self.service.as_ref() else {
            log::warn!("No catalog open; cannot load {}", request.target());
            return Task::none();
        };
        let generation = self.generation;
        match request {
            FetchRequest::Examinations {
                subject_id,
                study_id,
            } => Task::perform(
                service.examinations_by_subject_and_study(subject_id, study_id),
                move |result| Message::ExaminationsLoaded {
                    generation,
                    path: path.clone(),
                    result,
                },
            ),
            FetchRequest::Datasets { acquisition_id } => Task::perform(
                service.datasets_by_acquisition(acquisition_id),
                move |result| Message::DatasetsLoaded {
                    generation,
                    path: path.clone(),
                    result,
                },
            ),
        }
    }

    fn is_stale(&self, generation: Generation, what: &str) -> bool {
        let stale = generation != self.generation;
        if stale {
            log::warn!("Dropping {what} from a previous catalog");
        }
        stale
    }

    /// Collapses `path` after a failed fetch, unless it still shows loaded children.
    fn collapse_if_unloaded(&mut self, path: &NodePath) {
        let unloaded = self
            .tree
            .find(path)
            .map_or(true, |node| node.has_children() == HasChildren::Unknown);
        if unloaded {
            self.expanded.remove(path);
        }
    }

    fn on_event(&mut self, event: TreeEvent) {
        log::debug!("Tree event: {event:?}");
        if let TreeEvent::ChildDeleted {
            parent: Some(parent),
        } = event
        {
            let now_empty = self
                .tree
                .find(&parent)
                .is_some_and(|node| node.has_children() == HasChildren::Empty);
            if now_empty {
                self.expanded.remove(&parent);
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let open_button = button("Open Catalog").on_press(Message::OpenCatalog);
        let subject = match self.tree.subject_id() {
            Some(subject_id) => format!("Subject #{subject_id}"),
            None => "No subject".to_string(),
        };

        let tree_column = tree_panel(&self.tree, &self.expanded);
        let tree_panel = container(scrollable(tree_column))
            .padding(16)
            .width(Length::FillPortion(3));

        let selected = self.tree.selected().and_then(|path| self.tree.find(path));
        let details_content = details_panel(selected, self.tree.roots().is_empty());
        let details_panel = container(details_content)
            .padding(16)
            .width(Length::FillPortion(2));

        let mut content = column![row![tree_panel, details_panel]
            .spacing(16)
            .width(Length::Fill)
            .height(Length::Fill)]
        .spacing(16);

        if let Some(error) = &self.last_error {
            content = content.push(text(error).size(16).wrapping(Wrapping::Word));
        }

        column![row![open_button, text(subject)].spacing(16), content]
            .padding(20)
            .spacing(20)
            .into()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::model::dto::{DatasetAcquisitionDto, StudyDto, SubjectExaminationDto};
    use crate::model::NodeRef;

    fn app() -> App {
        let (app, _) = App::new(Config {
            subject_id: Some(3),
            ..Config::default()
        });
        app
    }

    fn study(examinations: Option<Vec<SubjectExaminationDto>>) -> StudyDto {
        StudyDto {
            id: 1,
            name: "Study 1".into(),
            examinations,
        }
    }

    fn exam(id: u64) -> SubjectExaminationDto {
        SubjectExaminationDto {
            id,
            examination_date: None,
            comment: None,
            dataset_acquisitions: None,
            extra_data_file_path_list: Vec::new(),
        }
    }

    fn study_is_loading(app: &App, path: &NodePath) -> bool {
        matches!(
            app.tree.find(path),
            Some(NodeRef::Study(study)) if study.examinations.is_loading()
        )
    }

    #[test]
    fn failed_first_load_collapses_the_node() {
        let mut app = app();
        app.tree.init_study(study(None), true);
        let path = NodePath::root(NodeKey::study(1));

        let _ = app.update(Message::ToggleNode(path.clone()));
        assert!(app.expanded.contains(&path));

        let _ = app.update(Message::ExaminationsLoaded {
            generation: app.generation,
            path: path.clone(),
            result: Err(ServiceError::Unavailable),
        });
        assert!(!app.expanded.contains(&path));
        assert_eq!(
            app.tree.find(&path).map(|node| node.has_children()),
            Some(HasChildren::Unknown)
        );
    }

    #[test]
    fn failed_reload_stays_expanded() {
        let mut app = app();
        app.tree.init_study(study(Some(vec![exam(10)])), true);
        let path = NodePath::root(NodeKey::study(1));
        app.expanded.insert(path.clone());

        let _ = app.update(Message::ReloadNode(path.clone()));
        let _ = app.update(Message::ExaminationsLoaded {
            generation: app.generation,
            path: path.clone(),
            result: Err(ServiceError::Unavailable),
        });

        assert!(app.expanded.contains(&path));
        assert_eq!(
            app.tree.find(&path).map(|node| node.has_children()),
            Some(HasChildren::NonEmpty)
        );
    }

    #[test]
    fn results_from_a_previous_catalog_are_ignored() {
        let mut app = app();
        app.generation = 2;
        app.tree.init_study(study(None), true);
        let path = NodePath::root(NodeKey::study(1));
        let _ = app.update(Message::ToggleNode(path.clone()));

        let _ = app.update(Message::ExaminationsLoaded {
            generation: 1,
            path: path.clone(),
            result: Ok(vec![exam(10)]),
        });
        assert!(study_is_loading(&app, &path));
        assert!(app.expanded.contains(&path));

        let _ = app.update(Message::ExaminationsLoaded {
            generation: 2,
            path: path.clone(),
            result: Ok(vec![exam(10)]),
        });
        assert!(!study_is_loading(&app, &path));
    }

    #[test]
    fn deleting_a_node_forgets_its_expanded_descendants() {
        let mut app = app();
        let examination = SubjectExaminationDto {
            dataset_acquisitions: Some(vec![DatasetAcquisitionDto {
                id: 100,
                name: None,
                datasets: None,
            }]),
            ..exam(10)
        };
        app.tree.init_study(study(Some(vec![examination])), true);
        let study_path = NodePath::root(NodeKey::study(1));
        let exam_path = study_path.child(NodeKey::examination(10));
        app.expanded.insert(study_path.clone());
        app.expanded.insert(exam_path.clone());
        app.expanded.insert(exam_path.child(NodeKey::acquisition(100)));

        let _ = app.update(Message::Deleted {
            generation: app.generation,
            parent: Some(exam_path.clone()),
            child: NodeKey::acquisition(100),
            result: Ok(true),
        });

        // The emptied examination collapses too.
        assert_eq!(
            app.expanded.iter().cloned().collect::<Vec<_>>(),
            vec![study_path]
        );
        assert_eq!(
            app.tree.find(&exam_path).map(|node| node.has_children()),
            Some(HasChildren::Empty)
        );
    }
}
