use crate::clock::Clock;
use crate::grid::{Grid, PageBuffer, MAX_HEIGHT};
use crate::layout::{CoordinateMapper, KeyLayout, GRID_HEIGHT, GRID_WIDTH};
use crate::noise::{NoiseSource, MS_PER_FRAME_POW2};
use crate::render::{render_page, DisplaySurface};
use log::debug;

/// Default idle time before raindrops start
pub const DEFAULT_IDLE_TIMEOUT_MS: u16 = 5000;

/// Key switch transitions reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Held,
    Released,
}

/// Running counters for the status display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub frames: u64,
    pub raindrops: u64,
    pub key_presses: u64,
}

/// Ripple simulation for one keyboard
pub type KeyboardPool<C> = Wavepool<KeyLayout, C, GRID_WIDTH, GRID_HEIGHT>;

/// Double-buffered water surface driven by key presses and idle raindrops.
///
/// `on_key_transition` may be called at any time; `advance` runs at most one
/// frame per 32 ms of clock time and draws it to the given surface.
pub struct Wavepool<M, C, const W: usize, const H: usize> {
    surface: PageBuffer<W, H>,
    /// Copy of the page last drawn to the LEDs
    rendered: Grid<W, H>,
    mapper: M,
    clock: C,
    noise: NoiseSource,
    /// Idle time before raindrops, 0 disables them
    pub idle_timeout_ms: u16,
    frames_since_event: u16,
    jitter: u16,
    pending_drop: Option<(usize, usize)>,
    hue: u8,
    last_tick: Option<u64>,
    pub paused: bool,
    pub stats: PoolStats,
}

impl<M, C, const W: usize, const H: usize> Wavepool<M, C, W, H>
where
    M: CoordinateMapper,
    C: Clock,
{
    pub fn new(mapper: M, clock: C) -> Self {
        let mut noise = NoiseSource::new();
        let jitter = Self::draw_jitter(&mut noise, clock.now_ms());
        Self {
            surface: PageBuffer::new(),
            rendered: Grid::new(),
            mapper,
            clock,
            noise,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            frames_since_event: 0,
            jitter,
            pending_drop: None,
            hue: 0,
            last_tick: None,
            paused: false,
            stats: PoolStats::default(),
        }
    }

    fn draw_jitter(noise: &mut NoiseSource, now_ms: u64) -> u16 {
        4 + (noise.next(now_ms) & 0x3f) as u16
    }

    /// Key switch event from the host. Only presses disturb the water;
    /// coordinates outside the key matrix are ignored.
    pub fn on_key_transition(&mut self, row: u8, col: u8, state: KeyState) {
        if !self.mapper.contains(row, col) || state != KeyState::Pressed {
            return;
        }
        let position = self.mapper.position(row, col);
        self.surface.front_mut().set_at(position, MAX_HEIGHT);
        self.frames_since_event = 0;
        self.stats.key_presses += 1;
    }

    /// Run a frame if a new 32 ms tick has started. Returns whether it did.
    pub fn advance<S>(&mut self, out: &mut S) -> bool
    where
        S: DisplaySurface + ?Sized,
    {
        let tick = self.clock.now_ms() >> MS_PER_FRAME_POW2;
        if self.last_tick == Some(tick) {
            return false;
        }
        self.last_tick = Some(tick);
        if self.paused {
            // keep the keys lit while frozen
            self.rendered = *self.surface.front();
            render_page(&self.rendered, &self.mapper, self.hue, out);
            return false;
        }
        self.step(out);
        true
    }

    /// One ungated frame: raindrops, ripple, draw, swap
    pub fn step<S>(&mut self, out: &mut S)
    where
        S: DisplaySurface + ?Sized,
    {
        self.hue = self.hue.wrapping_add(1);
        self.frames_since_event = self.frames_since_event.saturating_add(1);

        if self.idle_timeout_ms > 0 {
            self.rain();
        }

        self.surface.step();
        self.rendered = *self.surface.front();
        render_page(&self.rendered, &self.mapper, self.hue, out);
        self.surface.flip();
        self.stats.frames += 1;
    }

    fn rain(&mut self) {
        // hit the last drop once more so it reads as a splash
        if let Some((x, y)) = self.pending_drop.take() {
            self.surface.front_mut().set(x, y, MAX_HEIGHT);
        }

        // no interior cell to drop on
        if W < 3 || H < 3 {
            return;
        }

        let timeout_frames = self.idle_timeout_ms >> MS_PER_FRAME_POW2;
        if self.frames_since_event < timeout_frames.saturating_add(self.jitter) {
            return;
        }

        let now = self.clock.now_ms();
        self.jitter = Self::draw_jitter(&mut self.noise, now);
        self.frames_since_event = timeout_frames;

        let x = 1 + self.noise.next(now) as usize % (W - 2);
        let y = 1 + self.noise.next(now) as usize % (H - 2);
        self.surface.front_mut().set(x, y, MAX_HEIGHT);
        self.pending_drop = Some((x, y));
        self.stats.raindrops += 1;
        debug!("raindrop at ({}, {}), next in {} frames", x, y, timeout_frames + self.jitter);
    }

    /// Page the next frame reads and draws
    pub fn active_page(&self) -> &Grid<W, H> {
        self.surface.front()
    }

    /// Page drawn by the last frame, matching what the LEDs show
    pub fn rendered_page(&self) -> &Grid<W, H> {
        &self.rendered
    }

    pub fn active_page_index(&self) -> usize {
        self.surface.active_index()
    }

    pub fn hue(&self) -> u8 {
        self.hue
    }

    pub fn frames_since_event(&self) -> u16 {
        self.frames_since_event
    }

    /// Frames left before the next raindrop, None when rain is off
    pub fn frames_until_rain(&self) -> Option<u16> {
        if self.idle_timeout_ms == 0 {
            return None;
        }
        let due = (self.idle_timeout_ms >> MS_PER_FRAME_POW2).saturating_add(self.jitter);
        Some(due.saturating_sub(self.frames_since_event))
    }

    pub fn pending_raindrop(&self) -> Option<(usize, usize)> {
        self.pending_drop
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Swap the physical layout; the water itself is kept
    pub fn set_mapper(&mut self, mapper: M) {
        self.mapper = mapper;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Calm the water and restart the idle timer
    pub fn reset(&mut self) {
        self.surface.clear();
        self.rendered.clear();
        self.pending_drop = None;
        self.frames_since_event = 0;
        self.stats = PoolStats::default();
    }
}
