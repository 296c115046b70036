use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, DragEvent, Element, HtmlElement};

use crate::interaction::ElementTags;
use crate::render::{BoardView, CardView, FoundationView, StackedCard};

pub const CARD_ID_ATTR: &str = "data-card-id";
pub const FOUNDATION_ATTR: &str = "data-foundation";
pub const TABLEAU_ATTR: &str = "data-tableau";
pub const DRAGGING_CLASS: &str = "dragging";
pub const DRAG_OVER_CLASS: &str = "drag-over";

/// 绑定到所有可交互卡牌上的处理器。每次渲染都复用同一对。
pub struct CardHandlers {
    pub drag_start: Closure<dyn FnMut(DragEvent)>,
    pub drag_end: Closure<dyn FnMut(DragEvent)>,
}

fn by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
}

pub fn zone(document: &Document, attr: &str, index: usize) -> Result<Element, JsValue> {
    document
        .query_selector(&format!("[{attr}=\"{index}\"]"))?
        .ok_or_else(|| JsValue::from_str(&format!("missing zone [{attr}=\"{index}\"]")))
}

fn set_style(element: &Element, property: &str, value: &str) -> Result<(), JsValue> {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        html.style().set_property(property, value)?;
    }
    Ok(())
}

pub fn tags_of(element: &Element) -> ElementTags {
    ElementTags {
        card_id: element.get_attribute(CARD_ID_ATTR),
        foundation: element.get_attribute(FOUNDATION_ATTR),
        tableau: element.get_attribute(TABLEAU_ATTR),
    }
}

/// 从目标元素到文档根的标记链，供拖动源解析使用。
pub fn element_chain(target: &Element) -> Vec<ElementTags> {
    let mut chain = vec![tags_of(target)];
    let mut current = target.parent_element();
    while let Some(element) = current {
        chain.push(tags_of(&element));
        current = element.parent_element();
    }
    chain
}

pub fn clear_class(document: &Document, class: &str) -> Result<(), JsValue> {
    let marked = document.query_selector_all(&format!(".{class}"))?;
    for index in 0..marked.length() {
        if let Some(element) = marked.get(index).and_then(|node| node.dyn_into::<Element>().ok()) {
            element.class_list().remove_1(class)?;
        }
    }
    Ok(())
}

fn bind(element: &Element, handlers: &CardHandlers) -> Result<(), JsValue> {
    element.set_attribute("draggable", "true")?;
    element.add_event_listener_with_callback("dragstart", handlers.drag_start.as_ref().unchecked_ref())?;
    element.add_event_listener_with_callback("dragend", handlers.drag_end.as_ref().unchecked_ref())?;
    Ok(())
}

fn card_image(document: &Document, card: &CardView) -> Result<Element, JsValue> {
    let image = document.create_element("img")?;
    image.set_attribute("src", &card.image)?;
    image.set_class_name("card-img");
    Ok(image)
}

/// 废牌堆与基础牌堆：图片本身就是可拖动单元。
fn top_card(document: &Document, card: &CardView, handlers: &CardHandlers) -> Result<Element, JsValue> {
    let image = card_image(document, card)?;
    if let Some(card_id) = card.card_id.as_deref() {
        image.set_attribute(CARD_ID_ATTR, card_id)?;
        bind(&image, handlers)?;
    }
    Ok(image)
}

/// 桌面牌列：外层 div 携带标识，内部图片是不带标识的子元素。
fn stacked_card(
    document: &Document,
    stacked: &StackedCard,
    handlers: &CardHandlers,
) -> Result<Element, JsValue> {
    let wrapper = document.create_element("div")?;
    wrapper.set_class_name(&stacked.classes);
    set_style(&wrapper, "margin-top", &format!("{}px", stacked.offset_px))?;
    set_style(&wrapper, "position", "relative")?;
    set_style(&wrapper, "z-index", &stacked.z_index.to_string())?;
    if let Some(card_id) = stacked.card.card_id.as_deref() {
        wrapper.set_attribute(CARD_ID_ATTR, card_id)?;
        bind(&wrapper, handlers)?;
    }
    let image = card_image(document, &stacked.card)?;
    wrapper.append_child(&image)?;
    Ok(wrapper)
}

fn replace_slot(slot: &Element, content: Option<Element>) -> Result<(), JsValue> {
    slot.set_inner_html("");
    if let Some(content) = content {
        slot.append_child(&content)?;
    }
    Ok(())
}

/// 把视图整体写入页面。旧的子元素（以及它们上的监听）全部丢弃。
pub fn paint(document: &Document, view: &BoardView, handlers: &CardHandlers) -> Result<(), JsValue> {
    by_id(document, "score")?.set_text_content(Some(&view.score.to_string()));
    by_id(document, "moves")?.set_text_content(Some(&view.moves.to_string()));

    let deck = view.deck.as_ref().map(|card| card_image(document, card)).transpose()?;
    replace_slot(&by_id(document, "deck-cards")?, deck)?;

    let waste = view
        .waste
        .as_ref()
        .map(|card| top_card(document, card, handlers))
        .transpose()?;
    replace_slot(&by_id(document, "waste-cards")?, waste)?;

    for (index, pile) in view.foundations.iter().enumerate() {
        let content = match pile {
            FoundationView::Card { card } => top_card(document, card, handlers)?,
            FoundationView::Empty { glyph } => {
                let empty = document.create_element("div")?;
                empty.set_class_name("empty-foundation");
                empty.set_text_content(Some(&glyph.to_string()));
                empty
            }
        };
        replace_slot(&zone(document, FOUNDATION_ATTR, index)?, Some(content))?;
    }

    for (index, column) in view.tableau.iter().enumerate() {
        let slot = zone(document, TABLEAU_ATTR, index)?;
        replace_slot(&slot, None)?;
        for stacked in column {
            let card = stacked_card(document, stacked, handlers)?;
            slot.append_child(&card)?;
        }
    }

    let banner = by_id(document, "winMessage")?;
    match view.win {
        Some(panel) => {
            by_id(document, "finalScore")?.set_text_content(Some(&panel.final_score.to_string()));
            set_style(&banner, "display", "block")?;
        }
        None => set_style(&banner, "display", "none")?,
    }
    Ok(())
}
