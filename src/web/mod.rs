//! 浏览器外壳：把视图写入 DOM，绑定拖放事件，并导出给 JS 的 `SolitaireUi`。

pub mod dom;
pub mod fetch;
pub mod toast;

use std::cell::RefCell;
use std::future::Future;
use std::rc::{Rc, Weak};

use serde_wasm_bindgen::to_value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::js_sys::Promise;
use web_sys::{Document, DragEvent, Element};

use crate::client::{RemoteClient, Transport};
use crate::config::{ConfigError, UiConfig};
use crate::game::{FOUNDATION_COUNT, TABLEAU_COUNT};
use crate::interaction::DropOutcome;
use crate::logging;
use crate::session::{Game, Session, Update};

use dom::CardHandlers;
use fetch::FetchTransport;

type DragClosure = Closure<dyn FnMut(DragEvent)>;
type DragHandler<T> = fn(&Rc<Inner<T>>, DragEvent);

fn config_to_js_error(error: ConfigError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn event_element(target: Option<web_sys::EventTarget>) -> Option<Element> {
    target.and_then(|target| target.dyn_into::<Element>().ok())
}

fn warn_on_error(result: Result<(), JsValue>) {
    if let Err(error) = result {
        logging::warn(&format!("{error:?}"));
    }
}

fn drag_closure<T: Transport + 'static>(weak: Weak<Inner<T>>, handler: DragHandler<T>) -> DragClosure {
    Closure::new(move |event: DragEvent| {
        if let Some(inner) = weak.upgrade() {
            handler(&inner, event);
        }
    })
}

struct Inner<T> {
    game: Game<T>,
    document: Document,
    /// 整个生命周期只有这一对卡牌处理器：已脱离页面的旧元素仍可能收到 `dragend`。
    card_handlers: CardHandlers,
    zone_handlers: RefCell<Vec<DragClosure>>,
}

impl<T: Transport + 'static> Inner<T> {
    fn new(game: Game<T>, document: Document) -> Rc<Self> {
        Rc::new_cyclic(|weak| Inner {
            game,
            document,
            card_handlers: CardHandlers {
                drag_start: drag_closure(weak.clone(), Self::on_drag_start),
                drag_end: drag_closure(weak.clone(), Self::on_drag_end),
            },
            zone_handlers: RefCell::new(Vec::new()),
        })
    }

    /// 先重绘再显示提示。
    fn present(self: &Rc<Self>, update: &Update) {
        if let Some(view) = &update.view {
            if let Err(error) = dom::paint(&self.document, view, &self.card_handlers) {
                logging::error(&format!("render failed: {error:?}"));
            }
        }

        for notice in &update.notices {
            let weak = Rc::downgrade(self);
            let id = notice.id;
            let shown = toast::show(&self.document, notice, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.game.dismiss(id);
                }
            });
            if let Err(error) = shown {
                logging::error(&format!("notification failed: {error:?}"));
            }
        }
    }

    fn on_drag_start(self: &Rc<Self>, event: DragEvent) {
        let Some(target) = event_element(event.target()) else {
            return;
        };
        let chain = dom::element_chain(&target);
        match self.game.drag_start(&chain) {
            Some(card_id) => {
                if let Some(transfer) = event.data_transfer() {
                    if let Err(error) = transfer.set_data("text", &card_id) {
                        logging::warn(&format!("dataTransfer rejected card id: {error:?}"));
                    }
                }
                warn_on_error(target.class_list().add_1(dom::DRAGGING_CLASS));
            }
            None => event.prevent_default(),
        }
    }

    fn on_drag_end(self: &Rc<Self>, _event: DragEvent) {
        self.game.drag_end();
        self.clear_dragging();
    }

    fn on_drag_over(self: &Rc<Self>, event: DragEvent) {
        event.prevent_default();
        if let Some(zone) = event_element(event.current_target()) {
            warn_on_error(zone.class_list().add_1(dom::DRAG_OVER_CLASS));
        }
    }

    fn on_drag_leave(self: &Rc<Self>, event: DragEvent) {
        if let Some(zone) = event_element(event.current_target()) {
            warn_on_error(zone.class_list().remove_1(dom::DRAG_OVER_CLASS));
        }
    }

    fn on_drop(self: &Rc<Self>, event: DragEvent) {
        event.prevent_default();
        let Some(zone) = event_element(event.current_target()) else {
            self.game.drag_end();
            return;
        };
        warn_on_error(zone.class_list().remove_1(dom::DRAG_OVER_CLASS));

        match self.game.drop_on(&dom::tags_of(&zone)) {
            DropOutcome::Submit(request) => {
                self.clear_dragging();
                let inner = Rc::clone(self);
                spawn_local(async move {
                    let update = inner.game.submit_move(request).await;
                    inner.present(&update);
                });
            }
            DropOutcome::Ignored => {}
        }
    }

    fn clear_dragging(&self) {
        warn_on_error(dom::clear_class(&self.document, dom::DRAGGING_CLASS));
    }

    fn listen_zone(self: &Rc<Self>, zone: &Element) -> Result<(), JsValue> {
        let handlers: [(&str, DragHandler<T>); 3] = [
            ("dragover", Self::on_drag_over),
            ("dragleave", Self::on_drag_leave),
            ("drop", Self::on_drop),
        ];
        let mut bound = self.zone_handlers.borrow_mut();
        for (event, handler) in handlers {
            let closure = drag_closure(Rc::downgrade(self), handler);
            zone.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
            bound.push(closure);
        }
        Ok(())
    }

    /// 为 4 个基础牌堆和 7 个桌面牌列绑定放置监听，重复调用无副作用。
    fn mount_zones(self: &Rc<Self>) -> Result<(), JsValue> {
        if !self.zone_handlers.borrow().is_empty() {
            return Ok(());
        }
        for index in 0..FOUNDATION_COUNT {
            let zone = dom::zone(&self.document, dom::FOUNDATION_ATTR, index)?;
            self.listen_zone(&zone)?;
        }
        for index in 0..TABLEAU_COUNT {
            let zone = dom::zone(&self.document, dom::TABLEAU_ATTR, index)?;
            self.listen_zone(&zone)?;
        }
        Ok(())
    }
}

#[wasm_bindgen]
pub struct SolitaireUi {
    inner: Rc<Inner<FetchTransport>>,
}

impl SolitaireUi {
    /// 操作完成后先呈现更新，再把更新本身交给 JS。
    fn spawn_action<Fut>(&self, action: impl FnOnce(Rc<Inner<FetchTransport>>) -> Fut) -> Promise
    where
        Fut: Future<Output = Update> + 'static,
    {
        let inner = Rc::clone(&self.inner);
        let pending = action(Rc::clone(&inner));
        future_to_promise(async move {
            let update = pending.await;
            inner.present(&update);
            to_value(&update).map_err(JsValue::from)
        })
    }
}

#[wasm_bindgen]
impl SolitaireUi {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<SolitaireUi, JsValue> {
        let config = UiConfig::from_json(config_json.as_deref()).map_err(config_to_js_error)?;
        logging::set_debug(config.debug);
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("document not available"))?;

        let session = Session::new(&config);
        let client = RemoteClient::new(FetchTransport::new(config));
        Ok(SolitaireUi {
            inner: Inner::new(Game::new(client, session), document),
        })
    }

    pub fn mount(&self) -> Result<(), JsValue> {
        self.inner.mount_zones()
    }

    pub fn load(&self) -> Promise {
        self.spawn_action(|inner| async move { inner.game.load().await })
    }

    #[wasm_bindgen(js_name = "newGame")]
    pub fn new_game(&self) -> Promise {
        self.spawn_action(|inner| async move { inner.game.new_game().await })
    }

    pub fn draw(&self) -> Promise {
        self.spawn_action(|inner| async move { inner.game.draw().await })
    }

    #[wasm_bindgen(js_name = "autoMove")]
    pub fn auto_move(&self) -> Promise {
        self.spawn_action(|inner| async move { inner.game.auto_move().await })
    }

    pub fn undo(&self) -> Promise {
        self.spawn_action(|inner| async move { inner.game.undo().await })
    }

    #[wasm_bindgen(js_name = "dragState")]
    pub fn drag_state(&self) -> Result<JsValue, JsValue> {
        let session = self.inner.game.session();
        to_value(session.drag().state()).map_err(JsValue::from)
    }

    /// 当前快照，未加载时为 `undefined`。
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let session = self.inner.game.session();
        match session.store().get() {
            Some(state) => to_value(state).map_err(JsValue::from),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}
