use gloo_timers::callback::Timeout;
use wasm_bindgen::JsValue;
use web_sys::Document;

use crate::notify::{Notice, NoticeKind};
use crate::utils;

const TOAST_STYLE: &str = "position: fixed; top: 20px; right: 20px; \
color: white; padding: 15px; border-radius: 5px; z-index: 1000; \
box-shadow: 0 2px 5px rgba(0,0,0,0.3);";

fn background(notice: &Notice) -> &'static str {
    match notice.kind {
        NoticeKind::Success | NoticeKind::Info => "#4CAF50",
        NoticeKind::Rejected => "#FF9800",
        NoticeKind::Error => "#F44336",
    }
}

/// 显示一条提示，并由它自己的定时器在过期时移除。
pub fn show(
    document: &Document,
    notice: &Notice,
    on_expire: impl FnOnce() + 'static,
) -> Result<(), JsValue> {
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    let toast = document.create_element("div")?;
    toast.set_class_name(&format!("notification {}", notice.kind.class_name()));
    toast.set_attribute(
        "style",
        &format!("{TOAST_STYLE} background: {};", background(notice)),
    )?;
    toast.set_text_content(Some(&notice.message));
    body.append_child(&toast)?;

    let remaining_ms = (notice.expires_at_ms - utils::now_ms()).max(0.0) as u32;
    Timeout::new(remaining_ms, move || {
        toast.remove();
        on_expire();
    })
    .forget();
    Ok(())
}
