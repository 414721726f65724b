#![forbid(unsafe_code)]

//! Code block planning: id grammar in, styles and copy-button behavior out.

use std::time::Duration;

use vetrom_config::{CopyMode, parse_code_block_id};
use vetrom_style::theme::{CODE_DEFAULT_BACKGROUND, CODE_DEFAULT_HOVER_BACKGROUND};
use vetrom_style::{NamedColorResolver, StyleDescriptor, code_block_style};

/// Everything the host applies to one `.vetrom-codeblock` element.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlockPlan {
    pub base: StyleDescriptor,
    /// Present only when the `hover` keyword was given.
    pub hover: Option<StyleDescriptor>,
    pub copy: CopyMode,
}

impl CodeBlockPlan {
    /// Style for the current pointer state.
    #[must_use]
    pub fn style_for(&self, hovered: bool) -> &StyleDescriptor {
        match &self.hover {
            Some(hover) if hovered => hover,
            _ => &self.base,
        }
    }

    #[must_use]
    pub fn copy_button(&self) -> Option<CopyButton> {
        (self.copy != CopyMode::None).then(|| CopyButton::new(self.copy))
    }
}

/// Build the plan for a code block from its `id`.
#[must_use]
pub fn plan_code_block<R: NamedColorResolver + ?Sized>(id: &str, names: &R) -> CodeBlockPlan {
    let config = parse_code_block_id(id);
    let base = code_block_style(config.primary().unwrap_or(CODE_DEFAULT_BACKGROUND), names);
    let hover = config.hover.then(|| {
        code_block_style(
            config.secondary().unwrap_or(CODE_DEFAULT_HOVER_BACKGROUND),
            names,
        )
    });
    CodeBlockPlan {
        base,
        hover,
        copy: config.copy,
    }
}

pub const COPY_LABEL: &str = "COPY";
pub const COPIED_LABEL: &str = "COPIED";
/// How long the confirmation label stays up.
pub const COPIED_FOR: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyButton {
    mode: CopyMode,
    copied_until: Option<Duration>,
}

impl CopyButton {
    #[must_use]
    pub const fn new(mode: CopyMode) -> Self {
        Self {
            mode,
            copied_until: None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        if self.copied_until.is_some() {
            COPIED_LABEL
        } else {
            COPY_LABEL
        }
    }

    /// Hover-only buttons are transparent until the block is hovered.
    #[must_use]
    pub fn visible(&self, hovered: bool) -> bool {
        match self.mode {
            CopyMode::None => false,
            CopyMode::Always => true,
            CopyMode::OnHover => hovered,
        }
    }

    /// Click. Returns whether the host should write the code text to the
    /// clipboard; blocks without a `<code>` child have nothing to copy.
    pub fn click(&mut self, now: Duration, has_code: bool) -> bool {
        if !has_code {
            return false;
        }
        self.copied_until = Some(now + COPIED_FOR);
        true
    }

    /// Returns whether the label reverted.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.copied_until {
            Some(until) if now >= until => {
                self.copied_until = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vetrom_style::{CssNamedColors, Foreground};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    // --- planning ---

    #[test]
    fn bare_block_uses_defaults() {
        let plan = plan_code_block("", &CssNamedColors);
        assert_eq!(plan.base.background, "#1e293b");
        assert_eq!(plan.base.foreground, Foreground::Light);
        assert_eq!(plan.hover, None);
        assert_eq!(plan.copy, CopyMode::None);
        assert!(plan.copy_button().is_none());
    }

    #[test]
    fn copy_with_light_background() {
        let plan = plan_code_block("copy-_e2e8f0", &CssNamedColors);
        assert_eq!(plan.base.foreground, Foreground::Dark);
        assert_eq!(plan.copy, CopyMode::Always);
        assert!(plan.copy_button().is_some());
    }

    #[test]
    fn hover_uses_second_color_or_default() {
        let plan = plan_code_block("hovercopy-white-hover-_222", &CssNamedColors);
        let hover = plan.hover.as_ref().unwrap();
        assert_eq!(hover.background, "#222");
        assert_eq!(plan.style_for(true), hover);
        assert_eq!(plan.style_for(false), &plan.base);
        assert_eq!(plan.copy, CopyMode::OnHover);

        let plan = plan_code_block("hover", &CssNamedColors);
        assert_eq!(plan.hover.unwrap().background, "#334155");
    }

    #[test]
    fn second_color_without_hover_is_unused() {
        let plan = plan_code_block("_111-_222", &CssNamedColors);
        assert_eq!(plan.base.background, "#111");
        assert_eq!(plan.style_for(true), &plan.base);
    }

    // --- copy button ---

    #[test]
    fn copied_label_reverts() {
        let mut button = CopyButton::new(CopyMode::Always);
        assert_eq!(button.label(), "COPY");
        assert!(button.click(ms(100), true));
        assert_eq!(button.label(), "COPIED");
        assert!(!button.tick(ms(2_099)));
        assert!(button.tick(ms(2_100)));
        assert_eq!(button.label(), "COPY");
    }

    #[test]
    fn nothing_to_copy() {
        let mut button = CopyButton::new(CopyMode::Always);
        assert!(!button.click(ms(0), false));
        assert_eq!(button.label(), "COPY");
    }

    #[test]
    fn hover_only_visibility() {
        let button = CopyButton::new(CopyMode::OnHover);
        assert!(!button.visible(false));
        assert!(button.visible(true));
        assert!(CopyButton::new(CopyMode::Always).visible(false));
    }
}
