//! 浏览器控制台日志。非 wasm32 目标（本地测试）下为空操作。

use std::cell::Cell;

thread_local! {
    static DEBUG_ENABLED: Cell<bool> = const { Cell::new(false) };
}

pub fn set_debug(enabled: bool) {
    DEBUG_ENABLED.with(|flag| flag.set(enabled));
}

pub fn debug_enabled() -> bool {
    DEBUG_ENABLED.with(Cell::get)
}

/// 仅在开启 `debug` 配置时输出，用于拖放与接口调用的跟踪。
pub fn debug(message: &str) {
    if debug_enabled() {
        info(message);
    }
}

#[cfg(target_arch = "wasm32")]
pub fn info(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[cfg(target_arch = "wasm32")]
pub fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

#[cfg(target_arch = "wasm32")]
pub fn error(message: &str) {
    web_sys::console::error_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn info(_message: &str) {}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(_message: &str) {}

#[cfg(not(target_arch = "wasm32"))]
pub fn error(_message: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_is_toggleable() {
        set_debug(true);
        assert!(debug_enabled());
        debug("drag start");
        set_debug(false);
        assert!(!debug_enabled());
    }
}
