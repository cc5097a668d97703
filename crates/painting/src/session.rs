//! Decorating session: owns the design state and the active paint strategy
//! and wires pointer input, repaint and material binding together.

use ab_glyph::FontArc;
use tracing::{debug, info, warn};

use dzyn_config::EngineConfig;
use dzyn_ipc::{
    EngineToHost, HostToEngine, PaintCommand, PointCommand, PointView, PointerEvent, PointerPhase,
    TextCommand, TextureInfo,
};

use crate::color::Rgb;
use crate::error::PaintError;
use crate::generator::GradientGenerator;
use crate::material::{patch_meshes, PatchReport};
use crate::mesh::SceneMesh;
use crate::painter::RasterPainter;
use crate::ramp::{GradientRamp, RampGenerator};
use crate::router::{InteractionRouter, RouterAction, RouterState};
use crate::store::{ControlPointStore, StrokeLog, TextStore};
use crate::strategy::{Design, PaintStrategy, StrategyKind};
use crate::text::TextRenderer;
use crate::texture::{Texture, TextureHandle};
use crate::types::{Brush, ControlPointPatch, TextElement};

/// Explicitly owned engine instance.
///
/// Pointer callbacks and commands mutate the stores; the host calls
/// [`DecorSession::repaint_if_dirty`] once per frame, which coalesces every
/// mutation since the previous frame into a single repaint.
pub struct DecorSession {
    config: EngineConfig,
    points: ControlPointStore,
    texts: TextStore,
    strokes: StrokeLog,
    router: InteractionRouter,
    strategy: Box<dyn PaintStrategy>,
    text: TextRenderer,
    ramp: GradientRamp,
    strength: f32,
    /// Texture and strength currently bound into the host's materials
    bound: Option<(TextureHandle, f32)>,
    /// Forces a repaint without a store change (strategy switch)
    dirty: bool,
}

impl DecorSession {
    /// Create a session with a raster painter.
    ///
    /// Fails when the config is invalid or the painter's buffer cannot be
    /// allocated; nothing downstream can work without it.
    pub fn new(config: EngineConfig) -> Result<Self, PaintError> {
        config.validate()?;

        let mut text = TextRenderer::new(config.text.min_font_size_px);
        if let Some(path) = &config.text.font_path {
            match TextRenderer::from_file(path, config.text.min_font_size_px) {
                Ok(loaded) => text = loaded,
                Err(err) => warn!("Failed to load font, text will not be drawn: {}", err),
            }
        }

        let painter = RasterPainter::from_config(&config)?.with_text_renderer(text.clone());
        info!(
            "Decorating session ready ({}x{} texture)",
            config.texture_size, config.texture_size
        );

        Ok(Self {
            strength: config.blend_strength,
            config,
            points: ControlPointStore::new(),
            texts: TextStore::new(),
            strokes: StrokeLog::new(),
            router: InteractionRouter::new(),
            strategy: Box::new(painter),
            text,
            ramp: GradientRamp::default(),
            bound: None,
            dirty: true,
        })
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- Design state ---

    #[inline]
    pub fn points(&self) -> &ControlPointStore {
        &self.points
    }

    #[inline]
    pub fn points_mut(&mut self) -> &mut ControlPointStore {
        &mut self.points
    }

    #[inline]
    pub fn texts(&self) -> &TextStore {
        &self.texts
    }

    #[inline]
    pub fn texts_mut(&mut self) -> &mut TextStore {
        &mut self.texts
    }

    #[inline]
    pub fn strokes(&self) -> &StrokeLog {
        &self.strokes
    }

    #[inline]
    pub fn strokes_mut(&mut self) -> &mut StrokeLog {
        &mut self.strokes
    }

    #[inline]
    pub fn router(&self) -> &InteractionRouter {
        &self.router
    }

    /// Control points with their selection state, for handle rendering
    pub fn handles(&self) -> Vec<PointView> {
        self.points.views()
    }

    fn design(&self) -> Design<'_> {
        Design {
            points: self.points.points(),
            strokes: self.strokes.strokes(),
            texts: self.texts.elements(),
        }
    }

    /// Whether nothing has been placed, painted or written
    pub fn is_empty(&self) -> bool {
        self.design().is_empty()
    }

    /// Use `font` for text from now on
    pub fn set_font(&mut self, font: FontArc) {
        self.text.set_font(font);
        self.strategy.set_text_renderer(self.text.clone());
        self.dirty = true;
    }

    // --- Pointer input ---

    pub fn pointer_down(&mut self, event: &PointerEvent) -> Option<RouterAction> {
        if let Err(err) = event.validate() {
            warn!("Ignoring pointer down: {}", err);
            return None;
        }
        let action = self.router.pointer_down(event, self.texts.target_or_last())?;
        let brush = self.resolve_brush(event);
        self.apply(action, brush)
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) -> Option<RouterAction> {
        if let Err(err) = event.validate() {
            warn!("Ignoring pointer move: {}", err);
            return None;
        }
        let action = self.router.pointer_move(event)?;
        let brush = self.resolve_brush(event);
        self.apply(action, brush)
    }

    pub fn pointer_up(&mut self) -> Option<RouterAction> {
        let action = self.router.pointer_up()?;
        self.finish_gesture(action)
    }

    /// Lost pointer capture. Treated as a release: nothing is rolled back.
    pub fn pointer_cancel(&mut self) -> Option<RouterAction> {
        let action = self.router.pointer_cancel()?;
        self.finish_gesture(action)
    }

    /// The event's brush, or the configured one when the host sent none
    fn resolve_brush(&self, event: &PointerEvent) -> Brush {
        event
            .brush
            .map(Brush::from)
            .unwrap_or_else(|| Brush::from(&self.config.brush))
    }

    fn finish_gesture(&mut self, action: RouterAction) -> Option<RouterAction> {
        if let RouterAction::Release {
            from: RouterState::Painting,
        } = action
        {
            self.strokes.end_stroke();
        }
        Some(action)
    }

    /// Apply a router action to the stores. Actions on elements that no
    /// longer exist abort the gesture.
    fn apply(&mut self, action: RouterAction, brush: Brush) -> Option<RouterAction> {
        let result = match action {
            RouterAction::AddPoint { uv, world_position } => {
                self.points.add(uv, world_position, brush.color, brush.radius);
                Ok(())
            }
            RouterAction::GrabPoint { index } => self.points.select(Some(index)),
            RouterAction::MovePoint {
                index,
                uv,
                world_position,
            } => self
                .points
                .update(index, ControlPointPatch::position(uv, world_position)),
            RouterAction::BeginStroke { uv } => {
                self.strokes.begin_stroke(brush);
                if let Some(uv) = uv {
                    self.strokes.add_dab(uv);
                }
                Ok(())
            }
            RouterAction::Paint { uv } => {
                self.strokes.add_dab(uv);
                Ok(())
            }
            RouterAction::GrabText { index, uv } => self
                .texts
                .set_target(Some(index))
                .and_then(|()| match uv {
                    Some(uv) => self.texts.set_uv(index, uv),
                    None => Ok(()),
                }),
            RouterAction::MoveText { index, uv } => self.texts.set_uv(index, uv),
            RouterAction::Release { .. } => Ok(()),
        };

        match result {
            Ok(()) => Some(action),
            Err(err) => {
                warn!("Dropping {:?}: {}", action, err);
                self.router.abort();
                None
            }
        }
    }

    // --- Texture production ---

    /// Texture of the active strategy
    pub fn texture(&self) -> &Texture {
        self.strategy.texture()
    }

    pub fn texture_mut(&mut self) -> &mut Texture {
        self.strategy.texture_mut()
    }

    pub fn texture_info(&self) -> TextureInfo {
        let texture = self.texture();
        TextureInfo {
            texture_id: texture.handle().0,
            size: texture.size(),
            version: texture.version(),
        }
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Whether anything changed since the last repaint
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.points.is_changed() || self.texts.is_changed() || self.strokes.is_changed()
    }

    /// Repaint when the design changed since the last call.
    ///
    /// Call once per frame. Returns whether a repaint happened; the texture
    /// is flagged for upload when it did.
    pub fn repaint_if_dirty(&mut self) -> Result<bool, PaintError> {
        // Take every flag, even when an earlier one is already set
        let changed = [
            std::mem::take(&mut self.dirty),
            self.points.take_changed(),
            self.texts.take_changed(),
            self.strokes.take_changed(),
        ]
        .contains(&true);
        if !changed {
            return Ok(false);
        }

        let design = Design {
            points: self.points.points(),
            strokes: self.strokes.strokes(),
            texts: self.texts.elements(),
        };
        if let Err(err) = self.strategy.repaint(&design) {
            self.dirty = true;
            return Err(err);
        }
        Ok(true)
    }

    /// Switch how the texture is produced. The next repaint redraws it.
    pub fn set_strategy(&mut self, kind: StrategyKind) -> Result<(), PaintError> {
        if kind == self.strategy.kind() {
            return Ok(());
        }
        let mut strategy: Box<dyn PaintStrategy> = match kind {
            StrategyKind::Painter => Box::new(RasterPainter::from_config(&self.config)?),
            StrategyKind::Generator => Box::new(GradientGenerator::from_config(&self.config)?),
            StrategyKind::Ramp => {
                Box::new(RampGenerator::from_config(self.ramp.clone(), &self.config)?)
            }
        };
        strategy.set_text_renderer(self.text.clone());
        info!("Switched paint strategy to {:?}", kind);
        self.strategy = strategy;
        self.dirty = true;
        Ok(())
    }

    /// Ramp used by the ramp strategy. The texture keeps its handle, so
    /// bound materials stay valid.
    pub fn set_ramp(&mut self, ramp: GradientRamp) {
        self.strategy.set_ramp(&ramp);
        self.ramp = ramp;
        if self.strategy.kind() == StrategyKind::Ramp {
            self.dirty = true;
        }
    }

    // --- Materials ---

    #[inline]
    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Blend strength for patched materials; applied on the next rebind
    pub fn set_strength(&mut self, strength: f32) {
        self.strength = if strength.is_nan() {
            0.0
        } else {
            strength.clamp(0.0, 1.0)
        };
    }

    /// Whether materials are bound to a stale texture or strength
    pub fn needs_rebind(&self) -> bool {
        self.bound != Some((self.texture().handle(), self.strength))
    }

    /// Paint the current design and patch every UV-mapped mesh of a freshly
    /// loaded model
    pub fn on_model_ready(&mut self, meshes: &mut [SceneMesh]) -> Result<PatchReport, PaintError> {
        self.repaint_if_dirty()?;
        let report = self.rebind(meshes);
        info!(
            "Model ready: {} meshes, {} excluded",
            meshes.len(),
            report.skipped_meshes.len()
        );
        Ok(report)
    }

    /// Bind the current texture and strength into every patched material
    pub fn rebind(&mut self, meshes: &mut [SceneMesh]) -> PatchReport {
        let handle = self.texture().handle();
        let report = patch_meshes(meshes, handle, self.strength);
        self.bound = Some((handle, self.strength));
        report
    }

    // --- Export ---

    /// PNG of the current design, or None when nothing has been designed
    pub fn export_png(&mut self) -> Result<Option<Vec<u8>>, PaintError> {
        if self.is_empty() {
            debug!("Export requested with an empty design");
            return Ok(None);
        }
        self.repaint_if_dirty()?;
        self.texture().encode_png().map(Some)
    }

    // --- Host protocol ---

    /// Per-frame tick: repaint if needed and report the new texture
    pub fn frame(&mut self) -> Option<EngineToHost> {
        match self.repaint_if_dirty() {
            Ok(true) => Some(EngineToHost::TextureUpdated {
                texture: self.texture_info(),
                rebind: self.needs_rebind(),
            }),
            Ok(false) => None,
            Err(err) => Some(EngineToHost::error("repaint", err.to_string())),
        }
    }

    /// Dispatch one host message and collect the notifications it produces
    pub fn handle_message(&mut self, message: HostToEngine) -> Vec<EngineToHost> {
        match message {
            HostToEngine::Pointer { phase, event } => self.handle_pointer(phase, &event),
            HostToEngine::PointCommand(command) => match self.handle_point_command(command) {
                Ok(()) => vec![self.points_changed()],
                Err(err) => vec![EngineToHost::error("point_command", err.to_string())],
            },
            HostToEngine::TextCommand(command) => match self.handle_text_command(command) {
                Ok(()) => Vec::new(),
                Err(err) => vec![EngineToHost::error("text_command", err.to_string())],
            },
            HostToEngine::PaintCommand(command) => self.handle_paint_command(command),
        }
    }

    fn points_changed(&self) -> EngineToHost {
        EngineToHost::PointsChanged {
            points: self.handles(),
        }
    }

    fn handle_pointer(&mut self, phase: PointerPhase, event: &PointerEvent) -> Vec<EngineToHost> {
        let action = match phase {
            PointerPhase::Down => self.pointer_down(event),
            PointerPhase::Move => self.pointer_move(event),
            PointerPhase::Up => self.pointer_up(),
            PointerPhase::Cancel => self.pointer_cancel(),
        };
        let moves_handles = matches!(
            action,
            Some(
                RouterAction::AddPoint { .. }
                    | RouterAction::GrabPoint { .. }
                    | RouterAction::MovePoint { .. }
                    | RouterAction::Release {
                        from: RouterState::DraggingHandle(_)
                    }
            )
        );
        if moves_handles {
            vec![self.points_changed()]
        } else {
            Vec::new()
        }
    }

    fn handle_point_command(&mut self, command: PointCommand) -> Result<(), PaintError> {
        let result = match command {
            PointCommand::Add {
                uv,
                world_position,
                color,
                radius,
            } => {
                self.points
                    .add(uv.into(), world_position.into(), Rgb::from(color), radius);
                Ok(())
            }
            PointCommand::Update { index, patch } => self.points.update(index, patch.into()),
            PointCommand::Remove { index } => self.points.remove(index).map(|_| {
                self.router.point_removed(index);
            }),
            PointCommand::Duplicate { index } => self.points.duplicate(index).map(|_| ()),
            PointCommand::Select { index } => self.points.select(index),
        };
        Ok(result?)
    }

    fn handle_text_command(&mut self, command: TextCommand) -> Result<(), PaintError> {
        let result = match command {
            TextCommand::Add(spec) => {
                let element = TextElement::from_spec(spec, self.config.text.font_size_px);
                let index = self.texts.add(element);
                self.texts.set_target(Some(index))
            }
            TextCommand::Update { index, spec } => {
                let element = TextElement::from_spec(spec, self.config.text.font_size_px);
                self.texts.update(index, element)
            }
            TextCommand::Remove { index } => self.texts.remove(index).map(|_| {
                self.router.text_removed(index);
            }),
            TextCommand::Target { index } => self.texts.set_target(index),
        };
        Ok(result?)
    }

    fn handle_paint_command(&mut self, command: PaintCommand) -> Vec<EngineToHost> {
        match command {
            PaintCommand::SetStrength { strength } => {
                self.set_strength(strength);
                Vec::new()
            }
            PaintCommand::SetStrategy { strategy } => match self.set_strategy(strategy) {
                Ok(()) => Vec::new(),
                Err(err) => vec![EngineToHost::error("set_strategy", err.to_string())],
            },
            PaintCommand::ClearStrokes => {
                self.strokes.clear();
                Vec::new()
            }
            PaintCommand::Export => match self.export_png() {
                Ok(png) => vec![EngineToHost::TextureExported { png }],
                Err(err) => vec![EngineToHost::error("export", err.to_string())],
            },
        }
    }
}
