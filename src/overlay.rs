use crate::constants::HIDDEN_CLASS;
use web_sys as web;

#[inline]
pub fn show(el: &web::HtmlElement) {
    _ = el.class_list().remove_1(HIDDEN_CLASS);
    // fallback for pages without the CSS class
    _ = el.style().remove_property("display");
}

#[inline]
pub fn hide(el: &web::HtmlElement) {
    _ = el.class_list().add_1(HIDDEN_CLASS);
    // fallback
    _ = el.style().set_property("display", "none");
}

#[inline]
pub fn is_hidden(el: &web::HtmlElement) -> bool {
    if el.class_list().contains(HIDDEN_CLASS) {
        return true;
    }
    el.style()
        .get_property_value("display")
        .map(|v| v == "none")
        .unwrap_or(false)
}

/// Show or hide every effect canvas together.
pub fn set_visible(canvases: &[web::HtmlCanvasElement], visible: bool) {
    for canvas in canvases {
        if visible {
            show(canvas);
        } else if !is_hidden(canvas) {
            hide(canvas);
        }
    }
}
