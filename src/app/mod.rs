use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::ontology::{
    Dataset, NodeKind, Ontology, ProposedElement, QaUnit, RelationClass, load_dataset,
};

mod graph;
mod highlight;
mod physics;
mod render_utils;
#[cfg(test)]
mod test_support;
mod ui;
mod viewport;

use viewport::{PendingFit, ViewAnimation};

pub struct OntographApp {
    data_path: Option<PathBuf>,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

/// Where the guided demo currently stands. The extraction itself is
/// simulated; `Extracting` only models the asynchronous wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WorkflowStep {
    Upload,
    Extracting,
    Map,
    Complete,
}

struct ViewModel {
    dataset: Dataset,
    ontology: Ontology,
    qas: Vec<QaUnit>,
    current_qa: usize,
    workflow: WorkflowStep,
    /// Proposed elements staged for the current Q&A unit. Cleared on skip,
    /// promoted into `ontology` on confirm.
    staged: Vec<ProposedElement>,
    uploaded_doc: Option<String>,
    extraction_rx: Option<Receiver<Vec<QaUnit>>>,

    selected: Option<String>,
    search: String,
    search_match_cache: Option<SearchMatchCache>,

    pan: Vec2,
    zoom: f32,
    canvas_size: Vec2,
    view_animation: Option<ViewAnimation>,
    pending_fit: Option<PendingFit>,
    needs_initial_fit: bool,

    live_physics: bool,
    show_legend: bool,
    show_fps_bar: bool,

    scene_dirty: bool,
    scene_revision: u64,
    scene: Option<SceneGraph>,

    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

struct SearchMatchCache {
    query: String,
    scene_revision: u64,
    matches: Arc<HashSet<usize>>,
}

/// The working render set for one scene revision: confirmed nodes merged
/// with staged proposals, indexed densely. Simulation state lives here and
/// survives rebuilds by id continuity.
struct SceneGraph {
    nodes: Vec<SceneNode>,
    edges: Vec<SceneEdge>,
    index_by_id: HashMap<String, usize>,
    /// Undirected neighbor lists, used for highlight propagation.
    adjacency: Vec<Vec<usize>>,
    root_index: Option<usize>,
    alpha: f32,
    alpha_target: f32,
    drag: DragState,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

struct SceneNode {
    id: String,
    label: String,
    kind: NodeKind,
    content: Option<String>,
    is_proposed: bool,
    is_new: bool,
    is_hub: bool,
    depth: Option<usize>,
    charge: f32,
    collide_radius: f32,
    /// World-space radius used for pointer hit-testing and fit bounds.
    hit_radius: f32,
    world_pos: Vec2,
    velocity: Vec2,
    /// Set while the user drags this node; overrides the simulation.
    pin: Option<Vec2>,
}

struct SceneEdge {
    source: usize,
    target: usize,
    relation: String,
    relation_class: RelationClass,
    attributes: Vec<(String, String)>,
    is_proposed: bool,
}

impl SceneEdge {
    fn touches(&self, index: usize) -> bool {
        self.source == index || self.target == index
    }
}

/// Node drag gesture state. A released node stays pinned for a short
/// settle delay so the layout does not snap back under the cursor.
#[derive(Clone, Copy, Debug, PartialEq)]
enum DragState {
    Idle,
    Dragging { index: usize },
    Releasing { index: usize, until: f64 },
}

#[derive(Default)]
struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    charges: Vec<f32>,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
}

impl SceneGraph {
    fn dragged_id(&self) -> Option<&str> {
        let index = match self.drag {
            DragState::Idle => return None,
            DragState::Dragging { index } | DragState::Releasing { index, .. } => index,
        };
        self.nodes.get(index).map(|node| node.id.as_str())
    }

    /// Clear an expired post-drag settle pin.
    fn expire_drag_release(&mut self, now: f64) {
        if let DragState::Releasing { index, until } = self.drag
            && now >= until
        {
            if let Some(node) = self.nodes.get_mut(index) {
                node.pin = None;
            }
            self.drag = DragState::Idle;
        }
    }
}

impl OntographApp {
    pub fn new(cc: &eframe::CreationContext<'_>, data_path: Option<PathBuf>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        let state = Self::start_load(data_path.clone());
        Self { data_path, state }
    }

    fn spawn_load(data_path: Option<PathBuf>) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_dataset(data_path.as_deref()).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: Option<PathBuf>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }
}

impl eframe::App for OntographApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(dataset)) => {
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(dataset))));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("dataset loader disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading knowledge graph dataset...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load dataset");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    transition = Some(Self::start_load(self.data_path.clone()));
                }
            }
            AppState::Ready(model) => {
                model.poll_extraction(ctx);
                model.show(ctx);
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

impl ViewModel {
    /// Deliver the simulated extraction result once the worker finishes.
    fn poll_extraction(&mut self, ctx: &Context) {
        let Some(rx) = self.extraction_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(qas) => {
                self.qas = qas;
                self.current_qa = 0;
                self.workflow = WorkflowStep::Map;
                self.stage_current_qa();
            }
            Err(TryRecvError::Empty) => {
                self.extraction_rx = Some(rx);
                ctx.request_repaint();
            }
            Err(TryRecvError::Disconnected) => {
                self.workflow = WorkflowStep::Upload;
                self.uploaded_doc = None;
            }
        }
    }

    fn begin_extraction(&mut self) {
        self.uploaded_doc = Some("Wagner_Wartungsberichte_2019-2024.pdf (45.3 MB)".to_owned());
        self.workflow = WorkflowStep::Extracting;

        let (tx, rx) = mpsc::channel();
        let qas = self.dataset.qas.clone();
        thread::spawn(move || {
            // Stand-in for the real OCR/NLP pipeline.
            thread::sleep(Duration::from_millis(1200));
            let _ = tx.send(qas);
        });
        self.extraction_rx = Some(rx);
    }

    /// Stage the current Q&A unit's proposed elements into the scene.
    fn stage_current_qa(&mut self) {
        self.staged = self
            .qas
            .get(self.current_qa)
            .map(|qa| qa.proposed_elements())
            .unwrap_or_default();
        self.scene_dirty = true;
    }

    /// Promote the staged proposals into the confirmed graph, then move
    /// on to the next unit.
    fn confirm_staged(&mut self) {
        self.ontology.confirm(&self.staged);
        self.staged.clear();

        if self.current_qa + 1 < self.qas.len() {
            self.current_qa += 1;
            self.stage_current_qa();
        } else {
            self.workflow = WorkflowStep::Complete;
            self.scene_dirty = true;
        }
    }

    /// Discard the staged proposals without touching the confirmed graph.
    /// The next unit is not auto-staged; the user asks for its proposals.
    fn skip_staged(&mut self) {
        self.staged.clear();
        self.scene_dirty = true;

        if self.current_qa + 1 < self.qas.len() {
            self.current_qa += 1;
        } else {
            self.workflow = WorkflowStep::Complete;
        }
    }

    fn reset_demo(&mut self) {
        self.ontology = Ontology::from_seed(self.dataset.ontology.clone());
        self.qas.clear();
        self.current_qa = 0;
        self.workflow = WorkflowStep::Upload;
        self.staged.clear();
        self.uploaded_doc = None;
        self.extraction_rx = None;
        self.selected = None;
        self.search.clear();
        self.scene = None;
        self.scene_dirty = true;
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
        self.view_animation = None;
        self.pending_fit = None;
        self.needs_initial_fit = true;
    }
}
