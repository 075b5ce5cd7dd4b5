//! Askama templates for the admin console.

use askama::Template;

use super::forms::FormErrors;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Model list with record counts.
#[derive(Template)]
#[template(path = "admin/index.html")]
pub struct IndexTemplate {
    pub user: String,
    pub models: Vec<ModelView>,
}

/// Records of one model.
#[derive(Template)]
#[template(path = "admin/change_list.html")]
pub struct ChangeListTemplate {
    pub user: String,
    pub title: String,
    pub add_url: Option<String>,
    pub columns: Vec<&'static str>,
    pub rows: Vec<RowView>,
    /// Present when the list can be searched
    pub search: Option<String>,
    pub filters: Vec<FilterView>,
}

/// Add or change one record.
#[derive(Template)]
#[template(path = "admin/change_form.html")]
pub struct ChangeFormTemplate {
    pub user: String,
    pub title: String,
    pub action: String,
    pub list_url: String,
    pub delete_url: Option<String>,
    pub fields: Vec<FieldView>,
    pub non_field_errors: Vec<String>,
}

/// Error page.
#[derive(Template)]
#[template(path = "admin/error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// One entry on the index page.
#[derive(Debug, Clone)]
pub struct ModelView {
    pub name: &'static str,
    pub url: String,
    pub count: i64,
}

/// One row of a change list.
#[derive(Debug, Clone)]
pub struct RowView {
    pub url: String,
    pub delete_url: String,
    pub cells: Vec<String>,
}

/// One choice in a list filter.
#[derive(Debug, Clone)]
pub struct FilterView {
    pub label: &'static str,
    pub url: String,
    pub selected: bool,
}

/// One `<option>` of a select input.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// One form input with its errors.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    /// `text`, `number`, `password`, `checkbox`, `select`,
    /// `datetime-local`, `textarea` or `readonly`
    pub input: &'static str,
    pub value: String,
    pub checked: bool,
    pub options: Vec<OptionView>,
    pub errors: Vec<String>,
}

impl FieldView {
    fn new(name: &'static str, label: &'static str, input: &'static str, value: &str) -> Self {
        Self {
            name,
            label,
            input,
            value: value.to_string(),
            checked: false,
            options: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn text(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(name, label, "text", value)
    }

    pub fn number(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(name, label, "number", value)
    }

    pub fn textarea(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(name, label, "textarea", value)
    }

    pub fn datetime(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(name, label, "datetime-local", value)
    }

    /// Password inputs are never pre-filled.
    pub fn password(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, "password", "")
    }

    pub fn readonly(name: &'static str, label: &'static str, value: &str) -> Self {
        Self::new(name, label, "readonly", value)
    }

    pub fn checkbox(name: &'static str, label: &'static str, checked: bool) -> Self {
        Self {
            checked,
            ..Self::new(name, label, "checkbox", "")
        }
    }

    /// A select; the option whose value equals `value` is selected.
    pub fn select(
        name: &'static str,
        label: &'static str,
        value: &str,
        choices: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let options = choices
            .into_iter()
            .map(|(v, label)| OptionView {
                selected: v == value,
                value: v,
                label,
            })
            .collect();
        Self {
            options,
            ..Self::new(name, label, "select", value)
        }
    }

    /// Attach this field's messages from `errors`.
    pub fn with_errors(mut self, errors: &FormErrors) -> Self {
        self.errors = errors.field(self.name);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_marks_current_value() {
        let field = FieldView::select(
            "status",
            "Status",
            "booked",
            [
                ("awaiting_confirmation".into(), "Waiting Confirmation".into()),
                ("booked".into(), "Booked".into()),
            ],
        );
        let selected: Vec<_> = field.options.iter().map(|o| o.selected).collect();
        assert_eq!(selected, [false, true]);
    }

    #[test]
    fn errors_attach_by_name() {
        let mut errors = FormErrors::default();
        errors.add("password2", "Passwords don't match");
        let field = FieldView::password("password2", "Password confirmation").with_errors(&errors);
        assert_eq!(field.errors, ["Passwords don't match"]);
        assert!(field.value.is_empty());
    }

    #[test]
    fn change_form_renders_errors() {
        let mut errors = FormErrors::default();
        errors.add("password2", "Passwords don't match");
        let page = ChangeFormTemplate {
            user: "admin@example.com".into(),
            title: "Add user".into(),
            action: "/admin/accounts/add/".into(),
            list_url: "/admin/accounts/".into(),
            delete_url: None,
            fields: vec![
                FieldView::text("email", "Email address", "a@example.com"),
                FieldView::password("password2", "Password confirmation").with_errors(&errors),
            ],
            non_field_errors: Vec::new(),
        };
        let html = page.render().unwrap();
        assert!(html.contains("Passwords don&#x27;t match"));
        assert!(html.contains("value=\"a@example.com\""));
    }

    #[test]
    fn change_list_renders_rows() {
        let page = ChangeListTemplate {
            user: "admin@example.com".into(),
            title: "Buses".into(),
            add_url: Some("/admin/buses/add/".into()),
            columns: vec!["Bus"],
            rows: vec![RowView {
                url: "/admin/buses/1/".into(),
                delete_url: "/admin/buses/1/delete/".into(),
                cells: vec!["Modern Coast".into()],
            }],
            search: None,
            filters: Vec::new(),
        };
        let html = page.render().unwrap();
        assert!(html.contains("Modern Coast"));
        assert!(html.contains("/admin/buses/1/"));
        assert!(!html.contains("name=\"q\""));
    }
}
