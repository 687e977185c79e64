//! Form, section and field descriptors.
//!
//! Descriptors are loaded from JSON or YAML with camelCase keys. Each field
//! carries its expressions as plain strings; they are only parsed when
//! evaluated.

pub mod state;
pub mod visibility;

use serde::{Deserialize, Serialize};

use crate::errors::{ExprError, ExprResult};

pub use state::{apply_answer, create_form_state, create_form_state_with};
pub use visibility::{
    field_read_only, field_required, field_visible, nearest_visible_section, section_visible,
    visible_fields, visible_sections, Direction,
};

/// A complete form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Form {
    pub fn from_json(text: &str) -> ExprResult<Self> {
        serde_json::from_str(text).map_err(|e| ExprError::invalid_form(e.to_string()))
    }

    pub fn from_yaml(text: &str) -> ExprResult<Self> {
        serde_yaml::from_str(text).map_err(|e| ExprError::invalid_form(e.to_string()))
    }

    /// Every field of every section, in schema order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field_by_data_name(&self, data_name: &str) -> Option<&Field> {
        self.fields().find(|f| f.data_name == data_name)
    }
}

/// One page of a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_condition: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// A single question or block of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Key of this field's answer in the state
    pub data_name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Value expression seeding the initial answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_condition: Option<String>,
    /// Carried for the host's validation layer; not evaluated here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_condition: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl Field {
    /// Whether this field collects an answer (as opposed to displaying content)
    pub fn is_input(&self) -> bool {
        !matches!(self.kind, FieldKind::StaticText { .. } | FieldKind::Html { .. })
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// A selectable option of a radio, checkbox or select field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStyle {
    Vertical,
    Horizontal,
}

/// Field type and its type-specific settings, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldKind {
    StaticText {
        #[serde(default)]
        content: String,
    },
    Html {
        #[serde(default)]
        content: String,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum_length: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum_length: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Textarea {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum_length: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum_length: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum_value: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum_value: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Radio {
        #[serde(default)]
        options: Vec<Choice>,
        #[serde(default)]
        allow_other: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_style: Option<DisplayStyle>,
    },
    #[serde(rename_all = "camelCase")]
    Checkbox {
        #[serde(default)]
        options: Vec<Choice>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum_choices: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum_choices: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_style: Option<DisplayStyle>,
    },
    Date,
    #[serde(rename_all = "camelCase")]
    Select {
        #[serde(default)]
        allow_multiple: bool,
        #[serde(default)]
        is_dynamic: bool,
        #[serde(default)]
        options: Vec<Choice>,
        #[serde(default)]
        allow_other: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum_choices: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum_choices: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        select_label: Option<String>,
    },
    AutoLookup,
    Subform,
}

impl FieldKind {
    /// The `type` tag as written in form documents
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::StaticText { .. } => "staticText",
            FieldKind::Html { .. } => "html",
            FieldKind::Text { .. } => "text",
            FieldKind::Textarea { .. } => "textarea",
            FieldKind::Number { .. } => "number",
            FieldKind::Radio { .. } => "radio",
            FieldKind::Checkbox { .. } => "checkbox",
            FieldKind::Date => "date",
            FieldKind::Select { .. } => "select",
            FieldKind::AutoLookup => "autoLookup",
            FieldKind::Subform => "subform",
        }
    }
}
