#![forbid(unsafe_code)]

use core::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use classroom_ui_core::debounce::Debouncer;
use classroom_ui_core::event::{EventKind, EventTarget};
use classroom_ui_core::host::{self, ConfirmPrompt};
use classroom_ui_core::loading::LoaderHandle;
use classroom_ui_core::toast::ToastKind;
use classroom_ui_core::{Page, UiConfig, UiError};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{Event, KeyboardEvent, Window};

use crate::bridge::{self, DateParts, KeyState, RawEvent};
use crate::dom::WebDom;

type Listener = Closure<dyn FnMut(Event)>;

fn to_js(err: UiError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

fn now_ms(window: &Window) -> f64 {
    window.performance().map_or(0.0, |p| p.now())
}

struct Shared {
    window: Window,
    page: RefCell<Page<WebDom>>,
    wake: Cell<Option<i32>>,
    loaders: RefCell<BTreeMap<u32, LoaderHandle>>,
}

impl Shared {
    /// Sync the page clock with `performance.now()` and fire due timers.
    fn tick(self: &Rc<Self>) {
        let now = bridge::millis(now_ms(&self.window));
        if let Ok(mut page) = self.page.try_borrow_mut() {
            page.set_time(now);
        }
        self.flush();
        self.schedule_wake();
    }

    /// Arm a single `setTimeout` for the page's next deadline.
    fn schedule_wake(self: &Rc<Self>) {
        if let Some(id) = self.wake.take() {
            self.window.clear_timeout_with_handle(id);
        }
        let (now, deadline) = match self.page.try_borrow() {
            Ok(page) => (bridge::millis(now_ms(&self.window)), page.next_deadline()),
            Err(_) => return,
        };
        let Some(deadline) = deadline else {
            return;
        };
        let shared = Rc::clone(self);
        let callback = Closure::once_into_js(move || {
            shared.wake.set(None);
            shared.tick();
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                bridge::timeout_delay(now, deadline),
            ) {
            Ok(id) => self.wake.set(Some(id)),
            Err(err) => tracing::error!(?err, "setTimeout rejected"),
        }
    }

    /// Apply deferred focus and surface captured diagnostics.
    fn flush(&self) {
        let Ok(mut page) = self.page.try_borrow_mut() else {
            return;
        };
        let focus = page.dom_mut().take_pending_focus();
        let logs = page.take_outputs().logs;
        drop(page);
        for line in logs {
            web_sys::console::error_1(&JsValue::from_str(&line));
        }
        if let Some(el) = focus {
            let _ = el.focus();
        }
    }

    fn handle(self: &Rc<Self>, raw: RawEvent, event: &Event) {
        let Some(ui) = bridge::to_ui_event(raw) else {
            return;
        };
        let outcome = match self.page.try_borrow_mut() {
            Ok(mut page) => page.dispatch(&ui),
            Err(_) => {
                tracing::warn!(kind = ?ui.kind(), "event dropped during dispatch");
                return;
            }
        };
        if outcome.default_prevented {
            event.prevent_default();
        }
        self.flush();
        self.schedule_wake();
    }
}

/// Browser binding for the classroom portal page behavior.
#[wasm_bindgen]
pub struct ClassroomUi {
    shared: Rc<Shared>,
    listeners: Vec<(web_sys::EventTarget, &'static str, Listener)>,
    next_loader: u32,
}

#[wasm_bindgen]
impl ClassroomUi {
    /// Bind to the current document. `config` is an optional JSON object
    /// overriding any subset of the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<ClassroomUi, JsValue> {
        let config = match config {
            Some(json) => UiConfig::from_json(&json).map_err(to_js)?,
            None => UiConfig::default(),
        };
        let window = window()?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let dom = WebDom::new(document).map_err(to_js)?;
        let mut page = Page::new(dom, config);
        page.set_time(bridge::millis(now_ms(&window)));
        Ok(Self {
            shared: Rc::new(Shared {
                window,
                page: RefCell::new(page),
                wake: Cell::new(None),
                loaders: RefCell::new(BTreeMap::new()),
            }),
            listeners: Vec::new(),
            next_loader: 0,
        })
    }

    /// Wire every feature against the document. Call once the DOM is ready;
    /// later calls return `false` and change nothing.
    pub fn start(&mut self) -> Result<bool, JsValue> {
        let bindings = {
            let mut page = self.shared.page.borrow_mut();
            if !page.init() {
                return Ok(false);
            }
            page.listeners().bindings()
        };
        for (target, kind) in bindings {
            self.listen(target, kind)?;
        }
        tracing::info!(listeners = self.listeners.len(), "browser listeners attached");
        self.shared.flush();
        self.shared.schedule_wake();
        Ok(true)
    }

    /// Show a toast. `kind` is `"success"` (default) or `"error"`.
    #[wasm_bindgen(js_name = showMessage)]
    pub fn show_message(&self, message: &str, kind: Option<String>) {
        let kind = kind.as_deref().map_or(ToastKind::Success, ToastKind::from_name);
        if let Ok(mut page) = self.shared.page.try_borrow_mut() {
            if let Err(err) = page.notify(message, kind) {
                web_sys::console::error_1(&to_js(err));
            }
        }
        self.shared.schedule_wake();
    }

    /// Write `text` to the system clipboard and toast the outcome. The
    /// promise resolves to whether the write succeeded.
    #[wasm_bindgen(js_name = copyToClipboard)]
    pub fn copy_to_clipboard(&self, text: String) -> js_sys::Promise {
        let shared = Rc::clone(&self.shared);
        future_to_promise(async move {
            let pending = shared.window.navigator().clipboard().write_text(&text);
            let result = JsFuture::from(pending).await.map(drop).map_err(|err| {
                UiError::Clipboard(err.as_string().unwrap_or_else(|| format!("{err:?}")))
            });
            let ok = match shared.page.try_borrow_mut() {
                Ok(mut page) => page.finish_copy(result),
                Err(_) => false,
            };
            shared.flush();
            shared.schedule_wake();
            Ok(JsValue::from_bool(ok))
        })
    }

    /// Append a loading indicator to `container`. Returns a handle for
    /// [`hide_loading`](Self::hide_loading).
    #[wasm_bindgen(js_name = showLoading)]
    pub fn show_loading(&mut self, container: web_sys::Element) -> Result<u32, JsValue> {
        let handle = {
            let mut page = self.shared.page.borrow_mut();
            let node = page.dom().intern(container);
            page.show_loading(node).map_err(to_js)?
        };
        let id = self.next_loader;
        self.next_loader = self.next_loader.wrapping_add(1);
        self.shared.loaders.borrow_mut().insert(id, handle);
        Ok(id)
    }

    /// Remove a loading indicator. Unknown or already-hidden handles are a
    /// no-op returning `false`.
    #[wasm_bindgen(js_name = hideLoading)]
    pub fn hide_loading(&self, handle: u32) -> bool {
        let Some(mut loader) = self.shared.loaders.borrow_mut().remove(&handle) else {
            return false;
        };
        self.shared.page.borrow_mut().hide_loading(&mut loader)
    }

    /// Detach every listener and cancel the pending timer.
    pub fn destroy(&mut self) {
        for (target, name, listener) in self.listeners.drain(..) {
            let _ = target
                .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
        }
        if let Some(id) = self.shared.wake.take() {
            self.shared.window.clear_timeout_with_handle(id);
        }
    }
}

impl ClassroomUi {
    fn listen(&mut self, target: EventTarget, kind: EventKind) -> Result<(), JsValue> {
        let shared = Rc::clone(&self.shared);
        let (js_target, listener): (web_sys::EventTarget, Listener) = match target {
            EventTarget::Node(node) => {
                let el = shared
                    .page
                    .borrow()
                    .dom()
                    .element(node)
                    .ok_or_else(|| to_js(UiError::UnknownNode(node)))?;
                let cb = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                    shared.handle(RawEvent::Element(kind, node), &event);
                });
                (el.into(), cb)
            }
            EventTarget::Document => {
                let doc = shared.page.borrow().dom().document().clone();
                let cb = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                    let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };
                    let raw = RawEvent::Key {
                        key: key_event.key(),
                        state: KeyState {
                            shift: key_event.shift_key(),
                            alt: key_event.alt_key(),
                            ctrl: key_event.ctrl_key(),
                            meta: key_event.meta_key(),
                        },
                    };
                    shared.handle(raw, &event);
                });
                (doc.into(), cb)
            }
            EventTarget::Window => {
                let win = shared.window.clone();
                let cb = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                    let dim = |v: Result<JsValue, JsValue>| {
                        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
                    };
                    let raw = RawEvent::Resize {
                        width: dim(shared.window.inner_width()),
                        height: dim(shared.window.inner_height()),
                    };
                    shared.handle(raw, &event);
                });
                (win.into(), cb)
            }
        };
        let name = kind.dom_name();
        js_target.add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())?;
        self.listeners.push((js_target, name, listener));
        Ok(())
    }
}

impl Drop for ClassroomUi {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Format anything `new Date(value)` accepts (a `Date`, a timestamp, a date
/// string) as `YYYY-MM-DD HH:MM` in the user's local time. Falsy values and
/// invalid dates give `""`.
#[wasm_bindgen(js_name = formatDateTime)]
pub fn format_date_time(value: JsValue) -> String {
    if !value.is_truthy() {
        return String::new();
    }
    let date = match value.dyn_into::<js_sys::Date>() {
        Ok(date) => date,
        Err(value) => js_sys::Date::new(&value),
    };
    bridge::format_js_date(date.get_time(), || DateParts {
        year: i32::try_from(date.get_full_year()).unwrap_or(i32::MAX),
        month0: date.get_month(),
        day: date.get_date(),
        hour: date.get_hours(),
        minute: date.get_minutes(),
    })
}

struct BrowserConfirm<'a>(&'a Window);

impl ConfirmPrompt for BrowserConfirm<'_> {
    fn confirm(&mut self, message: &str) -> bool {
        self.0.confirm_with_message(message).unwrap_or(false)
    }
}

/// Ask the user to confirm `message`; run `callback` only if they accept.
#[wasm_bindgen(js_name = confirmAction)]
pub fn confirm_action(message: &str, callback: &js_sys::Function) -> Result<bool, JsValue> {
    let window = window()?;
    let mut prompt = BrowserConfirm(&window);
    let mut outcome = Ok(());
    let ran = host::confirm_action(&mut prompt, message, || {
        outcome = callback.call0(&JsValue::NULL).map(drop);
    });
    outcome.map(|()| ran)
}

/// Wrap `func` so it runs once `wait` ms after the latest call, with all of
/// that call's arguments.
#[wasm_bindgen]
pub fn debounce(func: js_sys::Function, wait: u32) -> Result<js_sys::Function, JsValue> {
    let window = window()?;
    let state = Rc::new(RefCell::new(Debouncer::<js_sys::Array>::new(
        core::time::Duration::from_millis(u64::from(wait)),
    )));
    let timer = Rc::new(Cell::new(None::<i32>));
    let wrapper = Closure::<dyn FnMut(js_sys::Array)>::new(move |args: js_sys::Array| {
        let now = bridge::millis(now_ms(&window));
        state.borrow_mut().call(now, args);
        if let Some(id) = timer.take() {
            window.clear_timeout_with_handle(id);
        }
        let (state, func, timer_slot, win) = (
            Rc::clone(&state),
            func.clone(),
            Rc::clone(&timer),
            window.clone(),
        );
        let fire = Closure::once_into_js(move || {
            timer_slot.set(None);
            let now = bridge::millis(now_ms(&win));
            // This timer belongs to the latest call, so it settles that call
            // even if the browser wakes a fraction of a millisecond early.
            let due = {
                let mut debouncer = state.borrow_mut();
                let at = debouncer.next_deadline().map_or(now, |d| d.max(now));
                debouncer.poll(at)
            };
            if let Some(args) = due {
                if let Err(err) = func.apply(&JsValue::NULL, &args) {
                    web_sys::console::error_1(&err);
                }
            }
        });
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            fire.unchecked_ref(),
            i32::try_from(wait).unwrap_or(i32::MAX),
        ) {
            Ok(id) => timer.set(Some(id)),
            Err(err) => web_sys::console::error_1(&err),
        }
    });
    // Closures take a fixed arity; a small JS shim packs the rest arguments.
    let pack = js_sys::Function::new_with_args(
        "inner",
        "return function (...args) { inner(args); };",
    );
    let packed = pack.call1(&JsValue::NULL, &wrapper.into_js_value())?;
    Ok(packed.unchecked_into())
}
