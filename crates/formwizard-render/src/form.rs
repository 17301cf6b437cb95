//! Fieldset, step, and form rendering.

use std::collections::HashMap;

use ironhtml::html;
use ironhtml::typed::Element;
use ironhtml_elements::{Div, Li, Ul};

use formwizard_forms::{
    Field, FieldReference, FieldValue, Fieldset, Form, ValidationErrors, ValueMap,
    NON_FIELD_ERRORS,
};

use crate::factory::RendererFactory;
use crate::fields::html_escape;
use crate::options::AttributeMap;

/// Converts a field name to a human-readable label.
///
/// Dashes and underscores become spaces and the first letter is capitalized:
/// "delivery-address" renders as "Delivery address".
pub fn humanize_field_name(name: &str) -> String {
    let mut result = String::new();
    for (i, c) in name.chars().enumerate() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        if i == 0 {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Renders one field with label and error decoration.
pub fn render_wrapped_field(
    factory: &RendererFactory,
    field: &Field,
    value: Option<&FieldValue>,
    errors: &[String],
    read_only: bool,
) -> String {
    let id = format!("id_{}", field.name());
    let label_text = humanize_field_name(field.name());
    let has_errors = !errors.is_empty();

    let control_html = factory.render_field(field, value, read_only, has_errors);

    let label_el = html! {
        label.for_(#id).class("form-label") { #label_text }
    };

    html! { div.class("mb-3") }
        .raw(label_el.render())
        .raw(&control_html)
        .children(errors, |error, div: Element<Div>| {
            div.class("invalid-feedback").text(error)
        })
        .render()
}

/// Renders a fieldset: start tag, legend, children, end tag.
pub fn render_fieldset(
    factory: &RendererFactory,
    form: &Form,
    fieldset: &Fieldset,
    values: &ValueMap,
    errors: &ValidationErrors,
) -> String {
    let mut html = String::from("<fieldset>");
    if let Some(heading) = &fieldset.heading {
        html.push_str(&format!("<legend>{}</legend>", html_escape(heading)));
    }
    for reference in &fieldset.references {
        html.push_str(&render_reference(factory, form, reference, values, errors));
    }
    html.push_str("</fieldset>");
    html
}

fn render_reference(
    factory: &RendererFactory,
    form: &Form,
    reference: &FieldReference,
    values: &ValueMap,
    errors: &ValidationErrors,
) -> String {
    let Some(field) = form.get_field(&reference.field_name) else {
        // Unresolvable references are rejected at build time.
        return String::new();
    };
    let value = values.get(field.name()).or_else(|| field.default());
    let field_errors = errors.get(field.name()).cloned().unwrap_or_default();

    if reference.wrapped {
        render_wrapped_field(factory, field, value, &field_errors, reference.read_only)
    } else {
        factory.render_field(field, value, reference.read_only, !field_errors.is_empty())
    }
}

fn render_button(
    button_type: &str,
    attributes: &HashMap<String, String>,
    default_label: &str,
    default_class: &str,
    extra: &str,
) -> String {
    let label = attributes
        .get("label")
        .cloned()
        .unwrap_or_else(|| default_label.to_string());
    let mut attrs = AttributeMap::new().with("class", default_class);
    for (key, value) in attributes {
        if key != "label" {
            attrs.set(key.clone(), value.clone());
        }
    }
    format!(
        r#"<button type="{button_type}"{extra} {}>{}</button>"#,
        attrs.to_html(),
        html_escape(&label)
    )
}

/// Renders the current step of a form as a complete `<form>` element.
///
/// A pure function of the model, values, and errors; the state machine is
/// not consulted. The back button appears only past the first step, the
/// reset button only when the form configures one.
pub fn render_form(
    factory: &RendererFactory,
    form: &Form,
    current_step: usize,
    values: &ValueMap,
    errors: &ValidationErrors,
) -> String {
    let action = form.submit_url();
    let method = form.form_method().as_str();

    let mut form_el = html! {
        form.action(#action).method(#method)
    };

    // Non-field errors
    if let Some(form_errors) = errors.get(NON_FIELD_ERRORS) {
        form_el = form_el.child::<Div, _>(|d| {
            d.class("alert alert-danger")
                .attr("role", "alert")
                .child::<Ul, _>(|ul| {
                    ul.class("mb-0")
                        .children(form_errors.iter(), |e, li: Element<Li>| li.text(e))
                })
        });
    }

    if let Some(step) = form.step_at(current_step) {
        for fieldset in &step.fieldsets {
            let fieldset_html = render_fieldset(factory, form, fieldset, values, errors);
            form_el = form_el.child::<Div, _>(|d| d.raw(&fieldset_html));
        }
    }

    let mut buttons = String::new();
    if current_step > 0 {
        buttons.push_str(&render_button(
            "submit",
            form.back_button_attributes(),
            "Back",
            "btn btn-secondary",
            r#" name="back" value="1""#,
        ));
    }
    buttons.push_str(&render_button(
        "submit",
        form.submit_button_attributes(),
        "Submit",
        "btn btn-primary",
        "",
    ));
    if let Some(reset) = form.reset_button_attributes() {
        buttons.push_str(&render_button(
            "reset",
            reset,
            "Reset",
            "btn btn-outline-secondary",
            "",
        ));
    }
    form_el = form_el.child::<Div, _>(|d| d.raw(&buttons));

    form_el.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwizard_forms::{Field, FieldKind, RequiredConstraint, Step};

    fn sample_form() -> Form {
        Form::new("/contact")
            .field(
                Field::new("email", FieldKind::input("email"))
                    .constraint(RequiredConstraint::new()),
            )
            .field(Field::new("message", FieldKind::Textarea { rows: 4, cols: 40 }))
            .step(Step::new().fieldset(
                Fieldset::new().heading("About you").field("email"),
            ))
            .step(Step::new().fieldset(Fieldset::new().field("message")))
    }

    #[test]
    fn test_humanize_field_name() {
        assert_eq!(humanize_field_name("email"), "Email");
        assert_eq!(
            humanize_field_name("delivery-address"),
            "Delivery address"
        );
        assert_eq!(humanize_field_name("first_name"), "First name");
    }

    #[test]
    fn test_render_form_first_step() {
        let factory = RendererFactory::new();
        let html = render_form(
            &factory,
            &sample_form(),
            0,
            &ValueMap::new(),
            &ValidationErrors::new(),
        );

        assert!(html.contains(r#"action="/contact""#));
        assert!(html.contains(r#"method="POST""#));
        assert!(html.contains("<legend>About you</legend>"));
        assert!(html.contains(r#"name="email""#));
        assert!(!html.contains(r#"name="message""#));
        assert!(!html.contains(r#"name="back""#));
    }

    #[test]
    fn test_render_form_later_step_has_back_button() {
        let factory = RendererFactory::new();
        let html = render_form(
            &factory,
            &sample_form(),
            1,
            &ValueMap::new(),
            &ValidationErrors::new(),
        );

        assert!(html.contains(r#"name="message""#));
        assert!(html.contains(r#"name="back""#));
        assert!(html.contains(">Back</button>"));
    }

    #[test]
    fn test_render_form_shows_field_errors() {
        let factory = RendererFactory::new();
        let mut errors = ValidationErrors::new();
        errors.add("email", "This field is required.");

        let html = render_form(&factory, &sample_form(), 0, &ValueMap::new(), &errors);
        assert!(html.contains("is-invalid"));
        assert!(html.contains("This field is required."));
    }

    #[test]
    fn test_render_form_shows_global_errors() {
        let factory = RendererFactory::new();
        let mut errors = ValidationErrors::new();
        errors.add_global("Something went wrong.");

        let html = render_form(&factory, &sample_form(), 0, &ValueMap::new(), &errors);
        assert!(html.contains("alert alert-danger"));
        assert!(html.contains("Something went wrong."));
    }

    #[test]
    fn test_render_form_fills_values() {
        let factory = RendererFactory::new();
        let mut values = ValueMap::new();
        values.insert("email".to_string(), FieldValue::from("a@b.com"));

        let html = render_form(
            &factory,
            &sample_form(),
            0,
            &values,
            &ValidationErrors::new(),
        );
        assert!(html.contains(r#"value="a@b.com""#));
    }

    #[test]
    fn test_wrapped_field_has_label() {
        let factory = RendererFactory::new();
        let field = Field::new("email", FieldKind::input("email"));
        let html = render_wrapped_field(&factory, &field, None, &[], false);

        assert!(html.contains("form-label"));
        assert!(html.contains("Email"));
        assert!(html.contains("mb-3"));
    }
}
