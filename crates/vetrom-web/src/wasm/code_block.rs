#![forbid(unsafe_code)]

//! `.vetrom-codeblock` elements: colors from the `id`, hover swap, copy button.

use std::time::Duration;

use wasm_bindgen::JsCast;
use web_sys::{Document, EventTarget, HtmlElement, MouseEvent};

use vetrom_runtime::logging::LOG_TARGET;
use vetrom_runtime::{CodeBlockPlan, CopyButton, plan_code_block};

use super::dom::{DomError, DomNamedColors, create, inject_style, listen, now, set_style, set_text, window, write_clipboard};
use super::{Shared, with_state};
use crate::markup::{CODE_BLOCK_CSS, CODE_BLOCK_STYLE_ID};

const COPY_BUTTON_CLASS: &str = "vetrom-copy-btn";

pub(crate) struct CodeBlockView {
    element: HtmlElement,
    plan: CodeBlockPlan,
    button: Option<(HtmlElement, CopyButton)>,
    hovered: bool,
}

impl CodeBlockView {
    fn render(&self) {
        let style = self.plan.style_for(self.hovered);
        set_style(&self.element, "background-color", &style.background);
        set_style(&self.element, "color", &style.text.to_hex());
        if let Some((button, copy)) = &self.button {
            set_text(button, copy.label());
            set_style(button, "opacity", if copy.visible(self.hovered) { "1" } else { "0" });
        }
    }

    /// Revert the copy label once its confirmation has expired.
    pub(crate) fn tick(&mut self, now: Duration) {
        let reverted = self.button.as_mut().is_some_and(|(_, copy)| copy.tick(now));
        if reverted {
            self.render();
        }
    }

    fn code_text(&self) -> Option<String> {
        self.element
            .query_selector("code")
            .ok()
            .flatten()
            .and_then(|code| code.dyn_into::<HtmlElement>().ok())
            .map(|code| code.inner_text())
    }
}

pub(crate) fn attach(shared: &Shared, document: &Document, element: HtmlElement) -> Result<(), DomError> {
    inject_style(document, CODE_BLOCK_STYLE_ID, CODE_BLOCK_CSS)?;
    let names = DomNamedColors::new(window()?, document.clone());
    let plan = plan_code_block(&element.id(), &names);

    let button = match plan.copy_button() {
        Some(copy) => {
            let button: HtmlElement = create(document, "button", COPY_BUTTON_CLASS)?;
            button.set_attribute("type", "button")?;
            element.append_child(&button)?;
            Some((button, copy))
        }
        None => None,
    };
    let button_target: Option<EventTarget> = button.as_ref().map(|(b, _)| b.clone().into());

    let view = CodeBlockView {
        element: element.clone(),
        plan,
        button,
        hovered: false,
    };
    view.render();
    let index = with_state(shared, |state| {
        state.code_blocks.push(view);
        state.code_blocks.len() - 1
    })
    .ok_or(DomError::Busy)?;

    for (event, hovered) in [("mouseenter", true), ("mouseleave", false)] {
        let s = shared.clone();
        listen(&element, event, move |_: web_sys::Event| {
            with_state(&s, |state| {
                if let Some(view) = state.code_blocks.get_mut(index) {
                    view.hovered = hovered;
                    view.render();
                }
            });
        });
    }

    if let Some(target) = button_target {
        let s = shared.clone();
        listen(&target, "click", move |event: MouseEvent| {
            event.stop_propagation();
            copy(&s, index);
        });
    }
    Ok(())
}

fn copy(shared: &Shared, index: usize) {
    let text = with_state(shared, |state| {
        let view = state.code_blocks.get_mut(index)?;
        let text = view.code_text();
        let (_, button) = view.button.as_mut()?;
        if !button.click(now(), text.is_some()) {
            return None;
        }
        view.render();
        text
    })
    .flatten();
    if let Some(text) = text
        && let Err(err) = write_clipboard(&text)
    {
        tracing::warn!(target: LOG_TARGET, error = %err, "clipboard write failed");
    }
}
