use crate::layer::ParticleLayer;
use crate::render::GpuSurface;
use crate::timers::TimerPump;
use crate::{dom, overlay};
use fx_core::{EffectsEngine, OnComplete, RenderLoop, ShaderSurface};
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Everything a frame or a timer touches, behind one `RefCell`.
pub struct Runtime {
    pub engine: EffectsEngine,
    pub render_loop: RenderLoop,
    pub gpu: Option<GpuSurface>,
    pub layer: Option<ParticleLayer>,
    /// Both canvases as supplied, for show/hide even when init failed.
    pub canvases: Vec<web::HtmlCanvasElement>,
    /// False once initialization failed; effects stay off for the page.
    pub available: bool,
}

impl Runtime {
    /// Draw one frame; returns whether another should be requested.
    fn tick(&mut self, now: Instant) -> bool {
        match (self.gpu.as_mut(), self.layer.as_mut()) {
            (Some(gpu), Some(layer)) => self.render_loop.frame(now, &mut self.engine, gpu, layer),
            _ => {
                self.render_loop.stop();
                false
            }
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.engine.resize(width, height);
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(width, height);
        }
        if let Some(layer) = self.layer.as_mut() {
            layer.resize(width, height);
        }
    }

    pub fn set_visible(&self, visible: bool) {
        overlay::set_visible(&self.canvases, visible);
        if !visible {
            if let Some(layer) = self.layer.as_ref() {
                layer.clear();
            }
        }
    }
}

/// Browser driver: one `requestAnimationFrame` loop and one timer pump over a
/// shared runtime. Callbacks hold only weak references back to the driver.
pub struct Driver {
    pub runtime: RefCell<Runtime>,
    raf: RefCell<Option<Closure<dyn FnMut()>>>,
    raf_id: Cell<Option<i32>>,
    timers: TimerPump,
}

impl Driver {
    pub fn new(runtime: Runtime) -> Rc<Self> {
        Rc::new(Self {
            runtime: RefCell::new(runtime),
            raf: RefCell::new(None),
            raf_id: Cell::new(None),
            timers: TimerPump::default(),
        })
    }

    pub fn start(self: &Rc<Self>) -> bool {
        let started = {
            let mut rt = self.runtime.borrow_mut();
            let Runtime {
                engine,
                render_loop,
                ..
            } = &mut *rt;
            render_loop.start(engine)
        };
        if started {
            self.request_frame();
        }
        started
    }

    pub fn stop(&self) {
        self.runtime.borrow_mut().render_loop.stop();
        if let Some(id) = self.raf_id.take() {
            dom::cancel_animation_frame(id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.runtime.borrow().render_loop.is_running()
    }

    fn request_frame(self: &Rc<Self>) {
        if self.raf_id.get().is_some() {
            return;
        }
        if self.raf.borrow().is_none() {
            let weak = Rc::downgrade(self);
            *self.raf.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                if let Some(driver) = weak.upgrade() {
                    driver.on_frame();
                }
            }) as Box<dyn FnMut()>));
        }
        let raf = self.raf.borrow();
        let Some(cb) = raf.as_ref() else {
            return;
        };
        match dom::request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => self.raf_id.set(Some(id)),
            Err(e) => log::error!("[loop] {:?}", e),
        }
    }

    fn on_frame(self: &Rc<Self>) {
        self.raf_id.set(None);
        let again = self.runtime.borrow_mut().tick(Instant::now());
        if again {
            self.request_frame();
        }
    }

    /// Re-arm the timer pump for the engine's next deadline.
    pub fn schedule_timers(self: &Rc<Self>) {
        if self.runtime.borrow().engine.is_disposed() {
            return;
        }
        if !self.timers.is_bound() {
            let weak: Weak<Self> = Rc::downgrade(self);
            self.timers.bind(move || {
                if let Some(driver) = weak.upgrade() {
                    driver.on_timer();
                }
            });
        }
        let due = self.runtime.borrow_mut().engine.next_due();
        self.timers.arm(due, Instant::now());
    }

    fn on_timer(self: &Rc<Self>) {
        self.timers.fired();
        let done = self.runtime.borrow_mut().engine.run_due(Instant::now());
        // the runtime borrow is released: callbacks may call back in
        run_completions(done);
        self.schedule_timers();
    }

    /// Tear everything down. Pending transition callbacks still fire once.
    pub fn dispose(&self) {
        self.stop();
        let done = {
            let mut rt = self.runtime.borrow_mut();
            let done = rt.engine.dispose();
            if let Some(gpu) = rt.gpu.as_mut() {
                gpu.dispose();
            }
            if let Some(layer) = rt.layer.as_ref() {
                layer.clear();
            }
            done
        };
        // dispose may run inside one of these callbacks; drop them later
        let raf = self.raf.borrow_mut().take();
        let timer = self.timers.release();
        wasm_bindgen_futures::spawn_local(async move {
            drop(raf);
            drop(timer);
        });
        run_completions(done);
    }
}

pub fn run_completions(done: Vec<OnComplete>) {
    for f in done {
        f();
    }
}
