//! Renderer factory: per-kind defaults and renderer dispatch.

use std::collections::HashMap;

use formwizard_forms::{Field, FieldKind, FieldValue, Form, ValidationErrors, ValueMap};

use crate::fields::{
    CaptchaRenderer, FieldRenderer, InputRenderer, MultiInputRenderer, ReadOnlyRenderer,
    SelectRenderer, TextareaRenderer,
};
use crate::options::RenderOptions;

/// Renderer kind key for the read-only variant.
pub const READ_ONLY_KIND: &str = "read-only";

fn renderer_for(kind: &FieldKind) -> &'static dyn FieldRenderer {
    match kind {
        FieldKind::Input { .. } => &InputRenderer,
        FieldKind::Textarea { .. } => &TextareaRenderer,
        FieldKind::Select { .. } => &SelectRenderer,
        FieldKind::MultiInput { .. } => &MultiInputRenderer,
        FieldKind::Captcha { .. } => &CaptchaRenderer,
    }
}

/// Maps field models to renderers and layers render options.
///
/// Effective options for a render are the caller's options over the
/// factory's registered per-kind defaults over the renderer's innate
/// defaults. The factory is stateless beyond its registered defaults.
#[derive(Debug, Clone, Default)]
pub struct RendererFactory {
    defaults: HashMap<String, RenderOptions>,
}

impl RendererFactory {
    /// Creates a factory with no registered defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers default options for a renderer kind.
    ///
    /// Kind keys are the [`FieldKind::key`] values plus [`READ_ONLY_KIND`].
    #[must_use]
    pub fn defaults(mut self, kind: impl Into<String>, options: RenderOptions) -> Self {
        self.defaults.insert(kind.into(), options);
        self
    }

    /// Renders a field with no caller options.
    pub fn render_field(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        read_only: bool,
        has_errors: bool,
    ) -> String {
        self.render_field_with(field, value, None, read_only, has_errors)
    }

    /// Renders a field, layering any caller options on top.
    pub fn render_field_with(
        &self,
        field: &Field,
        value: Option<&FieldValue>,
        caller: Option<&RenderOptions>,
        read_only: bool,
        has_errors: bool,
    ) -> String {
        let renderer: &dyn FieldRenderer = if read_only {
            &ReadOnlyRenderer
        } else {
            renderer_for(field.kind())
        };
        let kind_key = if read_only {
            READ_ONLY_KIND
        } else {
            field.kind().key()
        };

        let registered = self.defaults.get(kind_key).cloned().unwrap_or_default();
        let layered = match caller {
            Some(options) => options.merged_over(&registered),
            None => registered,
        };
        let mut effective = layered.merged_over(&renderer.innate());

        if has_errors {
            let class = effective
                .attributes
                .get("class")
                .cloned()
                .unwrap_or_default();
            effective
                .attributes
                .set("class", format!("{class} is-invalid").trim().to_string());
        }

        renderer.render(field, value, &effective)
    }

    /// Renders the current step of a form as a complete `<form>` element.
    pub fn render_form(
        &self,
        form: &Form,
        current_step: usize,
        values: &ValueMap,
        errors: &ValidationErrors,
    ) -> String {
        crate::form::render_form(self, form, current_step, values, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_defaults_apply() {
        let factory = RendererFactory::new().defaults(
            "input",
            RenderOptions::new().attr("class", "form-control form-control-sm"),
        );
        let field = Field::new("email", FieldKind::input("email"));

        let html = factory.render_field(&field, None, false, false);
        assert!(html.contains(r#"class="form-control form-control-sm""#));
    }

    #[test]
    fn test_caller_options_beat_registered_defaults() {
        let factory = RendererFactory::new().defaults(
            "input",
            RenderOptions::new().attr("data-size", "sm"),
        );
        let caller = RenderOptions::new().attr("data-size", "lg");
        let field = Field::new("email", FieldKind::input("email"));

        let html = factory.render_field_with(&field, None, Some(&caller), false, false);
        assert!(html.contains(r#"data-size="lg""#));
    }

    #[test]
    fn test_error_state_appends_class() {
        let factory = RendererFactory::new();
        let field = Field::new("email", FieldKind::input("email"));

        let html = factory.render_field(&field, None, false, true);
        assert!(html.contains(r#"class="form-control is-invalid""#));
    }

    #[test]
    fn test_read_only_dispatch() {
        let factory = RendererFactory::new();
        let field = Field::new("email", FieldKind::input("email"));
        let value = FieldValue::from("a@b.com");

        let html = factory.render_field(&field, Some(&value), true, false);
        assert!(html.contains("form-control-plaintext"));
        assert!(html.contains(r#"type="hidden""#));
    }

    #[test]
    fn test_kind_dispatch() {
        let factory = RendererFactory::new();

        let select = Field::new(
            "choice",
            FieldKind::Select {
                options: vec![formwizard_forms::FieldOption::new("a", "A")],
            },
        );
        assert!(factory
            .render_field(&select, None, false, false)
            .contains("<select"));

        let textarea = Field::new("message", FieldKind::Textarea { rows: 4, cols: 40 });
        assert!(factory
            .render_field(&textarea, None, false, false)
            .contains("<textarea"));
    }
}
