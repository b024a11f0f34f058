use crate::scenario::{
    HostEvent,
    Scenario,
};
use eyre::{
    OptionExt as _,
    Result,
};
use participant_transform::{
    host::memory::{
        AutoplayPolicy,
        MemoryHost,
        MemoryLifecycle,
    },
    CanvasSize,
    MediaSurface as _,
    ParticipantId,
    ProjectId,
    RoomParticipant,
    SourceQuery,
    StreamHandle,
    SurfaceId,
    SurfaceView,
    TransformDeclaration,
    TransformRegistry,
    TransformRoot,
};
use participant_transform_config::{
    Autoplay,
    Config,
};
use serde::Serialize;
use std::{
    collections::HashMap,
    io::Write,
    rc::Rc,
    time::Duration,
};
use tokio::sync::mpsc;

pub struct App {
    config: Config,
    host: Rc<MemoryHost>,
    registry: TransformRegistry,
}

/// One line of output: the surface after a host event was handled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub event: String,
    /// Label of the stream attached to the surface.
    pub attached: Option<String>,
    pub volume: f64,
    pub observed: bool,
    pub pending_retry: bool,
    pub view: Option<SurfaceView>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let host = MemoryHost::new();
        let project = ProjectId::new(&config.project_id);

        host.set_autoplay(match config.autoplay {
            Autoplay::Allowed => AutoplayPolicy::Allowed,
            Autoplay::Blocked => AutoplayPolicy::Blocked,
        });
        host.set_surface_width(config.surface_width);
        host.set_canvas(
            project.clone(),
            CanvasSize {
                width: config.canvas_width,
                height: config.canvas_height,
            },
        );
        if let Some(local) = &config.local_participant_id {
            host.set_local_participant(project, ParticipantId::new(local));
        }

        Self {
            config,
            host,
            registry: TransformRegistry::with_builtin(),
        }
    }

    pub async fn run(self) -> Result<()> {
        let path = self
            .config
            .scenario
            .clone()
            .ok_or_eyre("No scenario given, pass a scenario file as the first argument")?;
        let scenario = Scenario::from_file(&path)?;
        info!(?path, name = ?scenario.name, steps = scenario.steps.len(), "Replaying scenario");

        let mut stdout = std::io::stdout().lock();
        let steps = self.replay(scenario, &mut stdout).await?;
        info!(steps, "Scenario finished");
        Ok(())
    }

    /// Creates one room participant transform and feeds it the scenario's
    /// events, writing a [`StepReport`] JSON line per event to `out`.
    pub async fn replay(&self, scenario: Scenario, out: &mut impl Write) -> Result<usize> {
        let declaration = self
            .registry
            .get(RoomParticipant::NAME)
            .ok_or_eyre("Room participant transform is not registered")?;

        let mut lifecycle = MemoryLifecycle::default();
        let context = self.host.context(ProjectId::new(&self.config.project_id));
        let initial_props = declaration.props().normalize(&scenario.props);
        let TransformRoot { root } = declaration.create(&mut lifecycle, context, initial_props);
        let surface_id = root.borrow().id();
        debug!(surface = %surface_id, "Created transform");

        let mut replay = Replay {
            declaration,
            lifecycle,
            host: &self.host,
            query: scenario.source_props,
            streams: HashMap::new(),
            surface_id,
        };

        let steps = scenario.steps;
        let (sender, mut receiver) = mpsc::unbounded_channel::<HostEvent>();
        let producer = async move {
            for step in steps {
                if step.delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(step.delay_ms)).await;
                }
                if sender.send(step.event).is_err() {
                    break;
                }
            }
        };
        let consumer = async {
            let mut step = 0;
            while let Some(event) = receiver.recv().await {
                let name = event.to_string();
                replay.dispatch(event);
                let report = replay.report(step, name);
                writeln!(out, "{}", serde_json::to_string(&report)?)?;
                step += 1;
            }
            Ok::<_, eyre::Report>(step)
        };

        let ((), steps) = tokio::join!(producer, consumer);
        steps
    }
}

struct Replay<'a> {
    declaration: &'a dyn TransformDeclaration,
    lifecycle: MemoryLifecycle,
    host: &'a MemoryHost,
    query: SourceQuery,
    streams: HashMap<String, StreamHandle>,
    surface_id: SurfaceId,
}

impl Replay<'_> {
    fn dispatch(&mut self, event: HostEvent) {
        debug!(%event, "Dispatching host event");
        match event {
            HostEvent::Update { props } => {
                let props = props.map(|props| self.declaration.props().normalize(&props));
                self.lifecycle.update(props);
            }
            HostEvent::Sources { candidates } => {
                let candidates = candidates
                    .iter()
                    .map(|spec| spec.to_source(&mut self.streams))
                    .collect::<Vec<_>>();
                let source = self.declaration.use_source(&candidates, &self.query);
                debug!(source = ?source.as_ref().map(|source| &source.id), "Matched source");
                self.lifecycle.new_source(source);
            }
            HostEvent::Resize { width } => self.host.resize(self.surface_id, width),
            HostEvent::Interact => self.host.interact(),
            HostEvent::Detach => self.host.detach_from_document(self.surface_id),
            HostEvent::Remove { props } => {
                let props = props.map(|props| self.declaration.props().normalize(&props));
                self.lifecycle.remove(props);
            }
        }
    }

    fn report(&self, step: usize, event: String) -> StepReport {
        let (attached, volume) = self
            .host
            .memory_surface(self.surface_id)
            .map(|surface| {
                let surface = surface.borrow();
                (surface.attached().map(|stream| stream.label().to_string()), surface.volume())
            })
            .unwrap_or((None, 0.0));

        StepReport {
            step,
            event,
            attached,
            volume,
            observed: self.host.is_observed(self.surface_id),
            pending_retry: self.host.listener_count() > 0,
            view: self.host.last_view(self.surface_id),
        }
    }
}
