//! Per-kind field renderers.

use formwizard_forms::{Field, FieldKind, FieldValue};

use crate::options::{AttributeMap, RenderOptions};

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn element_id(name: &str, attrs: &AttributeMap) -> String {
    attrs
        .get("id")
        .cloned()
        .unwrap_or_else(|| format!("id_{name}"))
}

fn extra_attrs(attrs: &AttributeMap, skip: &[&str]) -> String {
    let mut filtered = AttributeMap::new();
    for (key, value) in &attrs.attrs {
        if !skip.contains(&key.as_str()) {
            filtered.set(key.clone(), value.clone());
        }
    }
    if filtered.is_empty() {
        String::new()
    } else {
        format!(" {}", filtered.to_html())
    }
}

/// Trait for renderers translating a field into markup.
///
/// Renderers are pure functions of the field model, the current value, and
/// the effective render options; nothing here touches session state.
pub trait FieldRenderer: Send + Sync {
    /// Innate defaults for this renderer type: element name and attributes.
    fn innate(&self) -> RenderOptions;

    /// Renders the field as HTML.
    fn render(&self, field: &Field, value: Option<&FieldValue>, options: &RenderOptions) -> String;
}

/// Renders a plain `<input>` element.
#[derive(Debug, Clone, Default)]
pub struct InputRenderer;

impl FieldRenderer for InputRenderer {
    fn innate(&self) -> RenderOptions {
        RenderOptions::new()
            .element("input")
            .attr("class", "form-control")
    }

    fn render(&self, field: &Field, value: Option<&FieldValue>, options: &RenderOptions) -> String {
        let input_type = match field.kind() {
            FieldKind::Input { input_type } => input_type.as_str(),
            _ => "text",
        };
        let name = field.name();
        let id = element_id(name, &options.attributes);
        let class = options
            .attributes
            .get("class")
            .cloned()
            .unwrap_or_default();

        let value_attr = value
            .and_then(FieldValue::as_str)
            .map(|v| format!(r#" value="{}""#, html_escape(v)))
            .unwrap_or_default();
        let extra = extra_attrs(&options.attributes, &["class", "id"]);

        format!(
            r#"<{} type="{}" class="{}" id="{}" name="{}"{}{extra}>"#,
            options.element_name(),
            input_type,
            class,
            id,
            name,
            value_attr
        )
    }
}

/// Renders a `<textarea>` element.
#[derive(Debug, Clone, Default)]
pub struct TextareaRenderer;

impl FieldRenderer for TextareaRenderer {
    fn innate(&self) -> RenderOptions {
        RenderOptions::new()
            .element("textarea")
            .attr("class", "form-control")
    }

    fn render(&self, field: &Field, value: Option<&FieldValue>, options: &RenderOptions) -> String {
        let (rows, cols) = match field.kind() {
            FieldKind::Textarea { rows, cols } => (*rows, *cols),
            _ => (4, 40),
        };
        let name = field.name();
        let id = element_id(name, &options.attributes);
        let class = options
            .attributes
            .get("class")
            .cloned()
            .unwrap_or_default();
        let content = value
            .and_then(FieldValue::as_str)
            .map(html_escape)
            .unwrap_or_default();
        let extra = extra_attrs(&options.attributes, &["class", "id"]);

        format!(
            r#"<{el} class="{class}" id="{id}" name="{name}" rows="{rows}" cols="{cols}"{extra}>{content}</{el}>"#,
            el = options.element_name(),
        )
    }
}

/// Renders a `<select>` with the selected option matched by value equality.
#[derive(Debug, Clone, Default)]
pub struct SelectRenderer;

impl FieldRenderer for SelectRenderer {
    fn innate(&self) -> RenderOptions {
        RenderOptions::new()
            .element("select")
            .attr("class", "form-select")
    }

    fn render(&self, field: &Field, value: Option<&FieldValue>, options: &RenderOptions) -> String {
        let choices: &[formwizard_forms::FieldOption] = match field.kind() {
            FieldKind::Select { options } => options,
            _ => &[],
        };
        let name = field.name();
        let id = element_id(name, &options.attributes);
        let class = options
            .attributes
            .get("class")
            .cloned()
            .unwrap_or_default();

        let mut rendered = String::new();
        rendered.push_str(r#"<option value="">---------</option>"#);
        for choice in choices {
            let selected = value.is_some_and(|v| v.contains(&choice.value));
            let selected_attr = if selected { " selected" } else { "" };
            rendered.push_str(&format!(
                r#"<option value="{}"{selected_attr}>{}</option>"#,
                html_escape(&choice.value),
                html_escape(&choice.label)
            ));
        }

        format!(
            r#"<{el} class="{class}" id="{id}" name="{name}">{rendered}</{el}>"#,
            el = options.element_name(),
        )
    }
}

/// Renders a checkbox group, one input per option.
///
/// A leading hidden reset input submits an empty value for the field, so a
/// submission with nothing checked still clears a previous selection.
#[derive(Debug, Clone, Default)]
pub struct MultiInputRenderer;

impl FieldRenderer for MultiInputRenderer {
    fn innate(&self) -> RenderOptions {
        RenderOptions::new().attr("class", "form-check-input")
    }

    fn render(&self, field: &Field, value: Option<&FieldValue>, options: &RenderOptions) -> String {
        let choices: &[formwizard_forms::FieldOption] = match field.kind() {
            FieldKind::MultiInput { options } => options,
            _ => &[],
        };
        let name = field.name();
        let class = options
            .attributes
            .get("class")
            .cloned()
            .unwrap_or_default();

        let mut html = format!(r#"<input type="hidden" name="{name}" value="">"#);
        for (i, choice) in choices.iter().enumerate() {
            let id = format!("id_{name}_{i}");
            let checked = value.is_some_and(|v| v.contains(&choice.value));
            let checked_attr = if checked { " checked" } else { "" };

            html.push_str(&format!(
                r#"<div class="form-check">
  <input class="{}" type="checkbox" id="{}" name="{}" value="{}"{checked_attr}>
  <label class="form-check-label" for="{}">{}</label>
</div>
"#,
                class,
                id,
                name,
                html_escape(&choice.value),
                id,
                html_escape(&choice.label)
            ));
        }

        html
    }
}

/// Renders a captcha challenge: the question plus an answer input.
#[derive(Debug, Clone, Default)]
pub struct CaptchaRenderer;

impl FieldRenderer for CaptchaRenderer {
    fn innate(&self) -> RenderOptions {
        RenderOptions::new()
            .element("input")
            .attr("class", "form-control")
    }

    fn render(&self, field: &Field, _value: Option<&FieldValue>, options: &RenderOptions) -> String {
        let question = match field.kind() {
            FieldKind::Captcha { question } => question.as_str(),
            _ => "",
        };
        let name = field.name();
        let id = element_id(name, &options.attributes);
        let class = options
            .attributes
            .get("class")
            .cloned()
            .unwrap_or_default();

        // The answer is never echoed back.
        format!(
            r#"<span class="form-text">{}</span><{} type="text" class="{}" id="{}" name="{}" autocomplete="off">"#,
            html_escape(question),
            options.element_name(),
            class,
            id,
            name
        )
    }
}

/// Read-only variant usable for any field kind.
///
/// Shows the current value as plain text and carries it in hidden inputs so
/// it survives resubmission.
#[derive(Debug, Clone, Default)]
pub struct ReadOnlyRenderer;

impl FieldRenderer for ReadOnlyRenderer {
    fn innate(&self) -> RenderOptions {
        RenderOptions::new()
            .element("span")
            .attr("class", "form-control-plaintext")
    }

    fn render(&self, field: &Field, value: Option<&FieldValue>, options: &RenderOptions) -> String {
        let name = field.name();
        let class = options
            .attributes
            .get("class")
            .cloned()
            .unwrap_or_default();
        let display = value.map(ToString::to_string).unwrap_or_default();

        let mut html = format!(
            r#"<{el} class="{class}">{}</{el}>"#,
            html_escape(&display),
            el = options.element_name(),
        );
        if let Some(value) = value {
            for item in value.items() {
                html.push_str(&format!(
                    r#"<input type="hidden" name="{name}" value="{}">"#,
                    html_escape(item)
                ));
            }
        }
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwizard_forms::FieldOption;

    fn effective(renderer: &dyn FieldRenderer) -> RenderOptions {
        RenderOptions::new().merged_over(&renderer.innate())
    }

    #[test]
    fn test_input_renderer() {
        let field = Field::new("email", FieldKind::input("email"));
        let value = FieldValue::from("a@b.com");
        let html = InputRenderer.render(&field, Some(&value), &effective(&InputRenderer));

        assert!(html.contains(r#"type="email""#));
        assert!(html.contains(r#"class="form-control""#));
        assert!(html.contains(r#"name="email""#));
        assert!(html.contains(r#"value="a@b.com""#));
    }

    #[test]
    fn test_input_renderer_escapes_value() {
        let field = Field::new("note", FieldKind::input("text"));
        let value = FieldValue::from(r#""<script>"#);
        let html = InputRenderer.render(&field, Some(&value), &effective(&InputRenderer));
        assert!(html.contains("&quot;&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_textarea_renderer() {
        let field = Field::new("message", FieldKind::Textarea { rows: 6, cols: 30 });
        let value = FieldValue::from("Hello");
        let html = TextareaRenderer.render(&field, Some(&value), &effective(&TextareaRenderer));

        assert!(html.contains(r#"rows="6""#));
        assert!(html.contains(r#"cols="30""#));
        assert!(html.contains(">Hello</textarea>"));
    }

    #[test]
    fn test_select_renderer_marks_selected() {
        let field = Field::new(
            "delivery",
            FieldKind::Select {
                options: vec![
                    FieldOption::new("post", "Post"),
                    FieldOption::new("pickup", "Pickup"),
                ],
            },
        );
        let value = FieldValue::from("pickup");
        let html = SelectRenderer.render(&field, Some(&value), &effective(&SelectRenderer));

        assert!(html.contains(r#"class="form-select""#));
        assert!(html.contains(r#"value="pickup" selected"#));
        assert!(!html.contains(r#"value="post" selected"#));
    }

    #[test]
    fn test_multi_input_renderer_has_hidden_reset() {
        let field = Field::new(
            "toppings",
            FieldKind::MultiInput {
                options: vec![
                    FieldOption::new("ham", "Ham"),
                    FieldOption::new("cheese", "Cheese"),
                ],
            },
        );
        let value = FieldValue::from(vec!["cheese".to_string()]);
        let html = MultiInputRenderer.render(&field, Some(&value), &effective(&MultiInputRenderer));

        assert!(html.starts_with(r#"<input type="hidden" name="toppings" value="">"#));
        assert!(html.contains(r#"id="id_toppings_0""#));
        assert!(html.contains(r#"value="cheese" checked"#));
        assert!(!html.contains(r#"value="ham" checked"#));
    }

    #[test]
    fn test_captcha_renderer_shows_question_not_answer() {
        let field = Field::new(
            "challenge",
            FieldKind::Captcha {
                question: "What is 2 + 2?".to_string(),
            },
        );
        let value = FieldValue::from("4");
        let html = CaptchaRenderer.render(&field, Some(&value), &effective(&CaptchaRenderer));

        assert!(html.contains("What is 2 + 2?"));
        assert!(!html.contains(r#"value="4""#));
    }

    #[test]
    fn test_read_only_renderer_carries_value() {
        let field = Field::new("email", FieldKind::input("email"));
        let value = FieldValue::from("a@b.com");
        let html = ReadOnlyRenderer.render(&field, Some(&value), &effective(&ReadOnlyRenderer));

        assert!(html.contains(r#"class="form-control-plaintext""#));
        assert!(html.contains(">a@b.com</span>"));
        assert!(html.contains(r#"<input type="hidden" name="email" value="a@b.com">"#));
    }

    #[test]
    fn test_caller_options_override_innate() {
        let field = Field::new("email", FieldKind::input("email"));
        let caller = RenderOptions::new().attr("class", "form-control is-invalid");
        let html = InputRenderer.render(&field, None, &caller.merged_over(&InputRenderer.innate()));
        assert!(html.contains(r#"class="form-control is-invalid""#));
    }
}
