//! The runtime controller: action dispatch, layer state machine, LED
//! presentation, and the polling event loop.
//!
//! A [`Controller`] owns its [`RuntimeState`] exclusively; configuration is
//! read-only after construction. All dispatch happens synchronously on the
//! thread driving [`Controller::run`] — there is no concurrent mutator and
//! no locking.

use crate::action::{Action, Function, KeyCodes};
use crate::color::Rgb;
use crate::config::{Config, InteractionState, KeyBinding, BRIGHTNESS_MAX, BRIGHTNESS_MIN};
use crate::device::{HidTransport, KeyEvent, KeyEventKind, Keypad};
use crate::error::{DeviceError, RuntimeError};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

/// Delay between steps of a sequence action.
const SEQUENCE_STEP_DELAY: Duration = Duration::from_millis(10);

/// Step size for the brightness-up/down built-ins.
const BRIGHTNESS_STEP: f32 = 0.1;

// ── Restart policy ───────────────────────────────────────────────────

/// Bounds for the cleanup-and-restart protocol on loop-level errors.
#[derive(Debug, Clone, Copy)]
pub struct RestartPolicy {
    /// How many times the loop may be restarted before giving up.
    pub max_restarts: u32,
    /// Fixed wait between cleanup and restart.
    pub backoff: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_restarts: 3,
            backoff: Duration::from_secs(3),
        }
    }
}

// ── Runtime state ────────────────────────────────────────────────────

/// Mutable state owned by the controller.
#[derive(Debug)]
struct RuntimeState {
    /// Active layer id. Always a valid key of the layer table.
    current_layer: u8,
    /// Positions of modifier keys currently held.
    held_modifiers: BTreeSet<u8>,
    /// Positions with an in-flight press-only action and the exact codes
    /// that must be released for them.
    pressed_actions: BTreeMap<u8, KeyCodes>,
    /// Positions currently in the long-press state.
    held_keys: BTreeSet<u8>,
    /// Global brightness, kept within [0.1, 1.0].
    brightness: f32,
    /// Cleared by the toggle-all-LEDs built-in; while false every LED
    /// write paints black.
    leds_enabled: bool,
}

// ── Controller ───────────────────────────────────────────────────────

/// Runtime controller for an RGB matrix keypad.
pub struct Controller<K: Keypad, H: HidTransport> {
    config: Config,
    keypad: K,
    hid: H,
    restart_policy: RestartPolicy,
    state: RuntimeState,
    debug: bool,
}

impl<K: Keypad, H: HidTransport> Controller<K, H> {
    /// Build a controller and apply startup device settings (LED sleep,
    /// initial layer repaint).
    ///
    /// Device failures here are fatal: the controller never starts in a
    /// half-initialized state.
    pub fn new(config: Config, keypad: K, hid: H) -> Result<Self, RuntimeError> {
        let settings = &config.settings;
        let state = RuntimeState {
            current_layer: settings.default_layer,
            held_modifiers: BTreeSet::new(),
            pressed_actions: BTreeMap::new(),
            held_keys: BTreeSet::new(),
            brightness: settings.brightness,
            leds_enabled: true,
        };
        let debug = settings.debug;

        let mut controller = Self {
            config,
            keypad,
            hid,
            restart_policy: RestartPolicy::default(),
            state,
            debug,
        };

        let settings = &controller.config.settings;
        controller
            .keypad
            .set_led_sleep(
                settings.led_sleep_enabled,
                Duration::from_secs(settings.led_sleep_time as u64),
            )
            .map_err(RuntimeError::Init)?;
        controller.repaint_layer().map_err(RuntimeError::Init)?;

        info!(
            name = controller.config.settings.name.as_deref().unwrap_or("unnamed"),
            version = controller.config.settings.version.as_deref().unwrap_or("none"),
            layer = controller.state.current_layer,
            layer_name = %controller.config.layer_name(controller.state.current_layer),
            "controller initialized"
        );
        Ok(controller)
    }

    /// Replace the default restart policy.
    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    pub fn current_layer(&self) -> u8 {
        self.state.current_layer
    }

    pub fn brightness(&self) -> f32 {
        self.state.brightness
    }

    pub fn keypad(&self) -> &K {
        &self.keypad
    }

    pub fn hid(&self) -> &H {
        &self.hid
    }

    /// Tear down into the collaborator devices.
    pub fn into_parts(self) -> (K, H) {
        (self.keypad, self.hid)
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Route one key event. Exposed for embedders that drive their own
    /// poll loop.
    pub fn handle_event(&mut self, event: KeyEvent) {
        match event.kind {
            KeyEventKind::Pressed => self.on_press(event.position),
            KeyEventKind::Released => self.on_release(event.position),
            KeyEventKind::Held => self.on_hold(event.position),
        }
    }

    /// Key-down: resolve the binding in the active layer and execute it.
    pub fn on_press(&mut self, position: u8) {
        let Some(binding) = self.config.binding(self.state.current_layer, position).cloned()
        else {
            if self.debug {
                debug!(position, "press on unbound key");
            }
            return;
        };
        if self.debug {
            debug!(position, action = binding.action.kind(), "key pressed");
        }
        self.paint_key(position, &binding, InteractionState::Pressed);

        if self.is_modifier(position, &binding.action) {
            self.state.held_modifiers.insert(position);
            info!(position, "modifier held, layer switching enabled");
            return;
        }

        let modifier_held = !self.state.held_modifiers.is_empty();
        let action = binding.action.resolve(modifier_held).clone();
        match action {
            Action::Key(codes) => match self.hid.press(codes.as_slice()) {
                Ok(()) => {
                    info!(position, codes = %codes, "key action pressed");
                    self.state.pressed_actions.insert(position, codes);
                }
                Err(e) => error!(position, error = %e, "failed to press key action"),
            },
            Action::Layer(target) => self.switch_layer(target),
            Action::Modifier => {
                // Reached through a dual sub-binding.
                self.state.held_modifiers.insert(position);
                info!(position, "modifier held, layer switching enabled");
            }
            other => self.execute_action(position, &other),
        }
    }

    /// Key-up: undo modifier holds and release recorded press-only
    /// actions, then restore the key's LED.
    ///
    /// Releases use the codes recorded at press time, never a fresh
    /// lookup, so a layer switch between press and release cannot strand
    /// keys.
    pub fn on_release(&mut self, position: u8) {
        if self.state.held_modifiers.remove(&position) {
            info!(position, "modifier released");
        }
        if let Some(codes) = self.state.pressed_actions.remove(&position) {
            match self.hid.release(codes.as_slice()) {
                Ok(()) => info!(position, codes = %codes, "key action released"),
                Err(e) => error!(position, error = %e, "failed to release key action"),
            }
        }
        self.state.held_keys.remove(&position);

        match self.config.binding(self.state.current_layer, position).cloned() {
            Some(binding) => self.paint_key(position, &binding, InteractionState::Default),
            None => {
                if let Err(e) = self.keypad.led_off(position) {
                    error!(position, error = %e, "LED blank failed");
                }
            }
        }
    }

    /// Long-press threshold crossed: presentation only, no dispatch
    /// state changes and no re-triggering.
    pub fn on_hold(&mut self, position: u8) {
        self.state.held_keys.insert(position);
        if let Some(binding) = self.config.binding(self.state.current_layer, position).cloned() {
            if self.debug {
                debug!(position, "key held");
            }
            self.paint_key(position, &binding, InteractionState::Held);
        }
    }

    fn is_modifier(&self, position: u8, action: &Action) -> bool {
        matches!(action, Action::Modifier) || self.config.settings.modifier_key == Some(position)
    }

    /// Execute an immediately-complete action, catching and logging any
    /// failure. One bad action must not crash the loop or strand other
    /// keys.
    fn execute_action(&mut self, position: u8, action: &Action) {
        let result = match action {
            Action::Sequence(steps) => self.run_sequence(steps),
            Action::String(text) => {
                let r = self.hid.write(text);
                if r.is_ok() {
                    info!(position, text, "typed string");
                }
                r
            }
            Action::Consumer(usage) => {
                let r = self.hid.send_consumer(*usage);
                if r.is_ok() {
                    info!(position, usage, "consumer code sent");
                }
                r
            }
            Action::Function(function) => {
                self.run_function(*function);
                Ok(())
            }
            // Full tap for a key action dispatched outside the
            // press/release pairing.
            Action::Key(codes) => self.hid.send(codes.as_slice()),
            Action::None | Action::Layer(_) | Action::Modifier | Action::Dual { .. } => Ok(()),
        };
        if let Err(e) = result {
            error!(position, kind = action.kind(), error = %e, "action execution failed");
        }
    }

    fn run_sequence(&mut self, steps: &[KeyCodes]) -> Result<(), DeviceError> {
        for step in steps {
            self.hid.send(step.as_slice())?;
            thread::sleep(SEQUENCE_STEP_DELAY);
        }
        info!(steps = steps.len(), "sequence sent");
        Ok(())
    }

    fn run_function(&mut self, function: Function) {
        match function {
            Function::ToggleAllLeds => {
                self.state.leds_enabled = !self.state.leds_enabled;
                info!(enabled = self.state.leds_enabled, "toggled all LEDs");
                self.repaint_logged();
            }
            Function::ShowLayerInfo => {
                let layer = self.state.current_layer;
                let keys = self
                    .config
                    .layers
                    .get(&layer)
                    .map(|l| l.keys.len())
                    .unwrap_or(0);
                info!(layer, name = %self.config.layer_name(layer), keys, "layer info");
            }
            Function::BrightnessUp => self.adjust_brightness(BRIGHTNESS_STEP),
            Function::BrightnessDown => self.adjust_brightness(-BRIGHTNESS_STEP),
        }
    }

    /// Adjust global brightness, clamped to [0.1, 1.0], and repaint.
    pub fn adjust_brightness(&mut self, delta: f32) {
        self.state.brightness =
            (self.state.brightness + delta).clamp(BRIGHTNESS_MIN, BRIGHTNESS_MAX);
        info!(brightness = self.state.brightness, "brightness adjusted");
        self.repaint_logged();
    }

    // ── Layer state machine ──────────────────────────────────────────

    /// Switch the active layer and repaint.
    ///
    /// An invalid target logs an error and leaves the current layer
    /// unchanged. Held modifiers and in-flight press records survive the
    /// switch. Switching to the already-active layer still repaints.
    pub fn switch_layer(&mut self, target: u8) {
        if !self.config.has_layer(target) {
            error!(target, "invalid layer switch target, staying on current layer");
            return;
        }
        let old = self.state.current_layer;
        self.state.current_layer = target;
        self.repaint_logged();
        info!(
            from = %self.config.layer_name(old),
            to = %self.config.layer_name(target),
            "layer switch"
        );
    }

    // ── LED presentation ─────────────────────────────────────────────

    /// The RGB value to display for a binding in the given interaction
    /// state: configured color (with per-state fallback), resolved through
    /// the color table, scaled by current brightness.
    pub fn color_for(&self, binding: &KeyBinding, state: InteractionState) -> Rgb {
        if !self.state.leds_enabled {
            return Rgb::BLACK;
        }
        let spec = binding.colors.for_state(state);
        self.config
            .colors
            .resolve(&spec)
            .scaled(self.state.brightness)
    }

    fn paint_key(&mut self, position: u8, binding: &KeyBinding, state: InteractionState) {
        let rgb = self.color_for(binding, state);
        if let Err(e) = self.keypad.set_led(position, rgb) {
            error!(position, error = %e, "LED write failed");
        }
    }

    /// Paint every physical key with its default color for the active
    /// layer; keys without a binding are blanked.
    pub fn repaint_layer(&mut self) -> Result<(), DeviceError> {
        for position in 0..self.keypad.key_count() {
            match self.config.binding(self.state.current_layer, position).cloned() {
                Some(binding) => {
                    let rgb = self.color_for(&binding, InteractionState::Default);
                    self.keypad.set_led(position, rgb)?;
                }
                None => self.keypad.led_off(position)?,
            }
        }
        Ok(())
    }

    fn repaint_logged(&mut self) {
        if let Err(e) = self.repaint_layer() {
            error!(error = %e, "layer repaint failed");
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Release every recorded HID press, blank all LEDs, clear tracking
    /// state. Runs on every exit path; failures are logged, never raised.
    pub fn release_all(&mut self) {
        if let Err(e) = self.hid.release_all() {
            error!(error = %e, "release-all failed");
        }
        for position in 0..self.keypad.key_count() {
            if let Err(e) = self.keypad.led_off(position) {
                error!(position, error = %e, "LED blank failed");
            }
        }
        self.state.pressed_actions.clear();
        self.state.held_modifiers.clear();
        self.state.held_keys.clear();
        info!("released all keys and blanked LEDs");
    }

    /// Run the polling event loop until `stop` is set.
    ///
    /// Events are dispatched synchronously in arrival order; the stop flag
    /// is checked between poll iterations, so an in-progress action always
    /// completes before cleanup. `Keypad::update` is expected to pace the
    /// loop (blocking poll or internal timing).
    ///
    /// Loop-level device errors trigger cleanup, a fixed backoff, and a
    /// restart, bounded by the restart policy; past the ceiling the last
    /// error is returned as fatal.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<(), RuntimeError> {
        info!(
            layer = self.state.current_layer,
            name = %self.config.layer_name(self.state.current_layer),
            "controller starting"
        );
        let mut restarts = 0u32;
        loop {
            match self.poll_loop(stop) {
                Ok(()) => {
                    info!("stop requested, shutting down");
                    self.release_all();
                    return Ok(());
                }
                Err(e) => {
                    error!(error = %e, "event loop error");
                    self.release_all();
                    if restarts >= self.restart_policy.max_restarts {
                        error!(attempts = restarts, "restart limit reached, giving up");
                        return Err(RuntimeError::RestartLimit {
                            attempts: restarts,
                            last: e,
                        });
                    }
                    restarts += 1;
                    info!(
                        restart = restarts,
                        backoff_ms = self.restart_policy.backoff.as_millis() as u64,
                        "restarting event loop"
                    );
                    thread::sleep(self.restart_policy.backoff);
                    // Cleanup blanked the LEDs; restore them before
                    // processing events again.
                    self.repaint_logged();
                }
            }
        }
    }

    fn poll_loop(&mut self, stop: &AtomicBool) -> Result<(), DeviceError> {
        while !stop.load(Ordering::Relaxed) {
            let events = self.keypad.update()?;
            for event in events {
                self.handle_event(event);
            }
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
