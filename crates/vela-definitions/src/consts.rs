use const_format::concatcp;

/// The namespace definitions and their documents live in, unless configured otherwise.
pub const DEFAULT_DEFINITION_NAMESPACE: &str = "vela-system";

const DEFINITION_KEY_PREFIX: &str = "definition.oam.dev/";
const CUSTOM_DEFINITION_KEY_PREFIX: &str = concatcp!("custom.", DEFINITION_KEY_PREFIX);

/// Annotation with the display name of a definition.
pub const ALIAS_ANNOTATION: &str = concatcp!(DEFINITION_KEY_PREFIX, "alias");

pub const DESCRIPTION_ANNOTATION: &str = concatcp!(DEFINITION_KEY_PREFIX, "description");

/// Annotation with the icon URL of a definition.
pub const ICON_ANNOTATION: &str = concatcp!(CUSTOM_DEFINITION_KEY_PREFIX, "icon");

pub const CATEGORY_ANNOTATION: &str = concatcp!(CUSTOM_DEFINITION_KEY_PREFIX, "category");

/// Definitions with this label are never listed.
pub const DEPRECATED_LABEL: &str = concatcp!(CUSTOM_DEFINITION_KEY_PREFIX, "deprecated");

/// Definitions with this label are hidden from the UI, its value is always `"true"`.
pub const UI_HIDDEN_LABEL: &str = concatcp!(CUSTOM_DEFINITION_KEY_PREFIX, "ui-hidden");

/// Restricts a definition to either applications or workflow runs.
pub const SCOPE_LABEL: &str = concatcp!(CUSTOM_DEFINITION_KEY_PREFIX, "scope");

pub const SCOPE_APPLICATION: &str = "Application";
pub const SCOPE_WORKFLOW_RUN: &str = "WorkflowRun";

/// Addons own the definitions they install through an application named `addon-<name>`.
pub const ADDON_APPLICATION_PREFIX: &str = "addon-";

/// Data key of the OpenAPI v3 schema in the schema document.
pub const SCHEMA_DOCUMENT_KEY: &str = "openapi-v3-json-schema";

/// Data key of the custom UI schema in the UI schema document.
pub const UI_SCHEMA_DOCUMENT_KEY: &str = "ui-schema";
