use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use super::consts;
use super::{DebugHandler, DebugMessage, DebugSeverity, Driver, GlEnum, ProcAddress, ReloadStatus};

/// Surface handle issued by [`HeadlessDriver::create_surface`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HeadlessSurface(u32);

/// Context handle issued by a [`HeadlessDriver`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HeadlessContext(u32);

/// Behaviour injected into the next invocation of a named call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The call records this error code, has no effect and returns its
    /// failure value.
    Error(GlEnum),
    /// The call returns its failure value without recording an error.
    Fail,
}

/// Render state held by a headless context.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessGlState {
    /// Version requested at creation.
    pub version: (i32, i32),
    pub clear_color: [f32; 4],
    pub polygon_mode: GlEnum,
    pub cull_face: GlEnum,
    pub depth_write: bool,
    pub blend_func: (GlEnum, GlEnum),
    pub enabled: BTreeSet<GlEnum>,
    /// Number of `glClear` calls that took effect.
    pub clears: u32,
}

impl HeadlessGlState {
    fn new(version: (i32, i32)) -> Self {
        Self {
            version,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            polygon_mode: consts::FILL,
            cull_face: consts::BACK,
            depth_write: true,
            blend_func: (consts::ONE, consts::ZERO),
            enabled: BTreeSet::new(),
            clears: 0,
        }
    }

    pub fn is_enabled(&self, capability: GlEnum) -> bool {
        self.enabled.contains(&capability)
    }
}

struct ContextRecord {
    surface: HeadlessSurface,
    gl: HeadlessGlState,
}

#[derive(Default)]
struct State {
    next_surface: u32,
    next_context: u32,
    contexts: HashMap<HeadlessContext, ContextRecord>,
    bound: HashMap<ThreadId, HeadlessContext>,
    pending: HashMap<ThreadId, VecDeque<GlEnum>>,
    faults: Vec<(&'static str, Fault)>,
    missing: HashSet<&'static str>,
    available_formats: u32,
    debug_handler: Option<DebugHandler>,
    presented: HashMap<HeadlessSurface, u32>,
    journal: Vec<String>,
}

impl State {
    fn take_fault(&mut self, call: &str) -> Option<Fault> {
        let index = self.faults.iter().position(|(name, _)| *name == call)?;
        Some(self.faults.remove(index).1)
    }

    /// Applies an injected fault. Returns `true` when the call must fail.
    fn fails(&mut self, call: &str) -> bool {
        match self.take_fault(call) {
            Some(Fault::Error(code)) => {
                self.raise(code);
                true
            }
            Some(Fault::Fail) => true,
            None => false,
        }
    }

    fn raise(&mut self, code: GlEnum) {
        self.pending
            .entry(thread::current().id())
            .or_default()
            .push_back(code);
    }

    fn insert_context(&mut self, surface: HeadlessSurface, version: (i32, i32)) -> HeadlessContext {
        self.next_context += 1;
        let context = HeadlessContext(self.next_context);
        self.contexts.insert(
            context,
            ContextRecord {
                surface,
                gl: HeadlessGlState::new(version),
            },
        );
        context
    }

    fn bound_gl(&mut self) -> Option<&mut HeadlessGlState> {
        let context = self.bound.get(&thread::current().id()).copied()?;
        self.contexts.get_mut(&context).map(|record| &mut record.gl)
    }
}

/// In-process driver that records every call.
///
/// Bindings and error codes are tracked per thread like a real driver.
/// Faults can be injected per call name to exercise failure paths, and the
/// journal lists every call in issue order.
pub struct HeadlessDriver {
    state: Mutex<State>,
}

impl Default for HeadlessDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDriver {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                available_formats: 4,
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stands in for the windowing layer handing out a device surface.
    pub fn create_surface(&self) -> HeadlessSurface {
        let mut state = self.lock();
        state.next_surface += 1;
        HeadlessSurface(state.next_surface)
    }

    /// Makes the next invocation of `call` misbehave.
    pub fn inject(&self, call: &'static str, fault: Fault) {
        self.lock().faults.push((call, fault));
    }

    /// Makes `proc_address(name)` resolve to nothing.
    pub fn mark_missing(&self, name: &'static str) {
        self.lock().missing.insert(name);
    }

    /// Number of pixel formats matching any request.
    pub fn set_available_formats(&self, count: u32) {
        self.lock().available_formats = count;
    }

    /// Leaves an error code pending on the calling thread.
    pub fn raise_error(&self, code: GlEnum) {
        self.lock().raise(code);
    }

    /// Error codes pending on the calling thread.
    pub fn pending_errors(&self) -> usize {
        self.lock()
            .pending
            .get(&thread::current().id())
            .map_or(0, VecDeque::len)
    }

    /// Context bound to the calling thread.
    pub fn current_context(&self) -> Option<HeadlessContext> {
        self.lock().bound.get(&thread::current().id()).copied()
    }

    pub fn gl_state(&self, context: HeadlessContext) -> Option<HeadlessGlState> {
        self.lock().contexts.get(&context).map(|record| record.gl.clone())
    }

    /// `false` once the context was deleted.
    pub fn is_alive(&self, context: HeadlessContext) -> bool {
        self.lock().contexts.contains_key(&context)
    }

    /// Number of successful buffer swaps on `surface`.
    pub fn presented(&self, surface: HeadlessSurface) -> u32 {
        self.lock().presented.get(&surface).copied().unwrap_or(0)
    }

    pub fn journal(&self) -> Vec<String> {
        self.lock().journal.clone()
    }

    /// Number of journal entries for `call`.
    pub fn calls(&self, call: &str) -> usize {
        self.lock()
            .journal
            .iter()
            .filter(|entry| {
                entry.as_str() == call
                    || entry
                        .strip_prefix(call)
                        .is_some_and(|rest| rest.starts_with('('))
            })
            .count()
    }

    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    /// Delivers a debug message to the installed handler.
    ///
    /// Returns `false` when no handler is installed.
    pub fn emit_debug_message(&self, severity: DebugSeverity, text: &str) -> bool {
        let handler = self.lock().debug_handler;
        let Some(handler) = handler else {
            return false;
        };
        handler(&DebugMessage {
            source: 0,
            kind: 0,
            id: 0,
            severity,
            text,
        });
        true
    }

    fn command(&self, call: &'static str, entry: String, apply: impl FnOnce(&mut HeadlessGlState)) {
        let mut state = self.lock();
        state.journal.push(entry);
        if state.fails(call) {
            return;
        }
        match state.bound_gl() {
            Some(gl) => apply(gl),
            None => state.raise(consts::INVALID_OPERATION),
        }
    }
}

/// Reads `(major, minor)` out of a zero-terminated attribute list.
fn requested_version(attribs: &[i32]) -> (i32, i32) {
    let mut version = (1, 0);
    for pair in attribs.chunks_exact(2) {
        match pair[0] {
            0 => break,
            consts::WGL_CONTEXT_MAJOR_VERSION_ARB => version.0 = pair[1],
            consts::WGL_CONTEXT_MINOR_VERSION_ARB => version.1 = pair[1],
            _ => {}
        }
    }
    version
}

impl Driver for HeadlessDriver {
    type Surface = HeadlessSurface;
    type Context = HeadlessContext;

    fn get_error(&self) -> GlEnum {
        self.lock()
            .pending
            .get_mut(&thread::current().id())
            .and_then(VecDeque::pop_front)
            .unwrap_or(consts::NO_ERROR)
    }

    fn proc_address(&self, name: &'static str) -> Option<ProcAddress> {
        let mut state = self.lock();
        state.journal.push(format!("wglGetProcAddress({name})"));
        if state.missing.contains(name) {
            return None;
        }
        NonZeroUsize::new(0x1000 + name.len()).map(|addr| ProcAddress::new(name, addr))
    }

    fn create_context(&self, surface: HeadlessSurface) -> Option<HeadlessContext> {
        let mut state = self.lock();
        state.journal.push(format!("wglCreateContext({surface:?})"));
        if state.fails("wglCreateContext") {
            return None;
        }
        Some(state.insert_context(surface, (1, 1)))
    }

    fn create_context_attribs(
        &self,
        entry: ProcAddress,
        surface: HeadlessSurface,
        attribs: &[i32],
    ) -> Option<HeadlessContext> {
        let mut state = self.lock();
        state.journal.push(format!("{}({surface:?}, {attribs:?})", entry.name()));
        if state.fails(entry.name()) {
            return None;
        }
        Some(state.insert_context(surface, requested_version(attribs)))
    }

    fn delete_context(&self, context: HeadlessContext) -> bool {
        let mut state = self.lock();
        state.journal.push(format!("wglDeleteContext({context:?})"));
        if state.fails("wglDeleteContext") {
            return false;
        }
        state.bound.retain(|_, bound| *bound != context);
        state.contexts.remove(&context).is_some()
    }

    fn make_current(&self, target: Option<(HeadlessSurface, HeadlessContext)>) -> bool {
        let mut state = self.lock();
        let thread = thread::current().id();
        let Some((surface, context)) = target else {
            state.journal.push("wglMakeCurrent(null)".to_string());
            if state.fails("wglMakeCurrent") {
                return false;
            }
            state.bound.remove(&thread);
            return true;
        };

        state.journal.push(format!("wglMakeCurrent({surface:?}, {context:?})"));
        if state.fails("wglMakeCurrent") {
            return false;
        }
        let matches_surface = state
            .contexts
            .get(&context)
            .is_some_and(|record| record.surface == surface);
        let busy = state
            .bound
            .iter()
            .any(|(other, bound)| *other != thread && *bound == context);
        if !matches_surface || busy {
            return false;
        }
        state.bound.insert(thread, context);
        true
    }

    fn reload_functions(&self) -> ReloadStatus {
        let mut state = self.lock();
        state.journal.push("reloadFunctions".to_string());
        if state.fails("reloadFunctions") || state.bound_gl().is_none() {
            return ReloadStatus::MissingEntryPoints;
        }
        ReloadStatus::Ok
    }

    fn choose_pixel_format(
        &self,
        entry: ProcAddress,
        surface: HeadlessSurface,
        attribs: &[i32],
        formats: &mut [i32],
        count: &mut u32,
    ) -> bool {
        let mut state = self.lock();
        state.journal.push(format!("{}({surface:?}, {attribs:?})", entry.name()));
        if state.fails(entry.name()) {
            return false;
        }
        let written = formats.len().min(state.available_formats as usize);
        for (index, id) in formats.iter_mut().take(written).enumerate() {
            *id = index as i32 + 1;
        }
        *count = written as u32;
        true
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.command(
            "glClearColor",
            format!("glClearColor({red}, {green}, {blue}, {alpha})"),
            |gl| gl.clear_color = [red, green, blue, alpha],
        );
    }

    fn clear(&self, mask: GlEnum) {
        self.command("glClear", format!("glClear({mask:#06x})"), |gl| gl.clears += 1);
    }

    fn polygon_mode(&self, face: GlEnum, mode: GlEnum) {
        self.command(
            "glPolygonMode",
            format!("glPolygonMode({face:#06x}, {mode:#06x})"),
            |gl| gl.polygon_mode = mode,
        );
    }

    fn enable(&self, capability: GlEnum) {
        self.command("glEnable", format!("glEnable({capability:#06x})"), |gl| {
            gl.enabled.insert(capability);
        });
    }

    fn disable(&self, capability: GlEnum) {
        self.command("glDisable", format!("glDisable({capability:#06x})"), |gl| {
            gl.enabled.remove(&capability);
        });
    }

    fn cull_face(&self, face: GlEnum) {
        self.command("glCullFace", format!("glCullFace({face:#06x})"), |gl| gl.cull_face = face);
    }

    fn depth_mask(&self, write: bool) {
        self.command("glDepthMask", format!("glDepthMask({write})"), |gl| gl.depth_write = write);
    }

    fn blend_func(&self, source: GlEnum, destination: GlEnum) {
        self.command(
            "glBlendFunc",
            format!("glBlendFunc({source:#06x}, {destination:#06x})"),
            |gl| gl.blend_func = (source, destination),
        );
    }

    fn debug_message_callback(&self, handler: DebugHandler) -> bool {
        let mut state = self.lock();
        state.journal.push("glDebugMessageCallback".to_string());
        if state.fails("glDebugMessageCallback") {
            return false;
        }
        state.debug_handler = Some(handler);
        true
    }

    fn swap_buffers(&self, surface: HeadlessSurface) -> bool {
        let mut state = self.lock();
        state.journal.push(format!("SwapBuffers({surface:?})"));
        if state.fails("SwapBuffers") {
            return false;
        }
        *state.presented.entry(surface).or_default() += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_driver() -> (HeadlessDriver, HeadlessContext) {
        let driver = HeadlessDriver::new();
        let surface = driver.create_surface();
        let context = driver.create_context(surface).unwrap();
        assert!(driver.make_current(Some((surface, context))));
        (driver, context)
    }

    #[test]
    fn commands_without_a_bound_context_raise_invalid_operation() {
        let driver = HeadlessDriver::new();
        driver.clear(consts::COLOR_BUFFER_BIT);
        assert_eq!(driver.get_error(), consts::INVALID_OPERATION);
        assert_eq!(driver.get_error(), consts::NO_ERROR);
    }

    #[test]
    fn commands_apply_to_the_bound_context() {
        let (driver, context) = bound_driver();
        driver.enable(consts::BLEND);
        driver.polygon_mode(consts::FRONT_AND_BACK, consts::LINE);

        let gl = driver.gl_state(context).unwrap();
        assert!(gl.is_enabled(consts::BLEND));
        assert_eq!(gl.polygon_mode, consts::LINE);
        assert_eq!(driver.pending_errors(), 0);
    }

    #[test]
    fn injected_error_fires_once_and_skips_the_effect() {
        let (driver, context) = bound_driver();
        driver.inject("glEnable", Fault::Error(consts::INVALID_ENUM));

        driver.enable(consts::BLEND);
        assert_eq!(driver.get_error(), consts::INVALID_ENUM);
        assert!(!driver.gl_state(context).unwrap().is_enabled(consts::BLEND));

        driver.enable(consts::BLEND);
        assert_eq!(driver.get_error(), consts::NO_ERROR);
        assert!(driver.gl_state(context).unwrap().is_enabled(consts::BLEND));
    }

    #[test]
    fn context_cannot_be_bound_on_two_threads() {
        let driver = HeadlessDriver::new();
        let surface = driver.create_surface();
        let context = driver.create_context(surface).unwrap();
        assert!(driver.make_current(Some((surface, context))));

        thread::scope(|s| {
            s.spawn(|| assert!(!driver.make_current(Some((surface, context)))));
        });
    }

    #[test]
    fn requested_version_reads_attribute_pairs() {
        let attribs = [
            consts::WGL_CONTEXT_MAJOR_VERSION_ARB,
            4,
            consts::WGL_CONTEXT_MINOR_VERSION_ARB,
            6,
            0,
        ];
        assert_eq!(requested_version(&attribs), (4, 6));
    }

    #[test]
    fn calls_matches_whole_names_only() {
        let (driver, _) = bound_driver();
        driver.clear_color(0.0, 0.0, 0.0, 1.0);
        driver.clear(consts::COLOR_BUFFER_BIT);
        assert_eq!(driver.calls("glClear"), 1);
        assert_eq!(driver.calls("glClearColor"), 1);
    }
}
