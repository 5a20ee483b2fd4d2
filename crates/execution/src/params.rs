//! Typed shapes of `input_params`, one per verb.
//!
//! Requests persist `input_params` as opaque JSON; these types are the
//! contract that [`validate_input`] enforces at creation and that handlers
//! parse again when they run.

use geocat_core::{ResourceKey, ResourceType};
use geocat_permission::PermissionsInput;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ExecutionError;
use crate::func::FuncName;

/// Initial values for a new resource. `owner` is mandatory; every key other
/// than `owner` and `title` is stored in the resource metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Username that will own the resource.
    pub owner: String,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Everything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateParams {
    /// Natural key of the new resource.
    pub uuid: ResourceKey,
    /// Concrete type.
    pub resource_type: ResourceType,
    /// Initial values.
    pub defaults: Defaults,
}

/// `ingest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestParams {
    /// Natural key; re-ingesting the same key updates.
    pub uuid: ResourceKey,
    /// Uploaded file references.
    pub files: Vec<String>,
    /// Concrete type.
    pub resource_type: ResourceType,
    /// Initial values.
    pub defaults: Defaults,
}

/// `update`. Absent keys leave existing values untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateParams {
    /// Target resource.
    pub uuid: ResourceKey,
    /// Reference to an uploaded metadata document.
    #[serde(default)]
    pub xml_file: Option<String>,
    /// Whether the metadata was uploaded rather than edited.
    #[serde(default)]
    pub metadata_uploaded: Option<bool>,
    /// Field values merged into the metadata.
    #[serde(default)]
    pub vals: Option<Map<String, Value>>,
    /// Replacement region list.
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    /// Replacement keyword list.
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    /// Free-form values merged under `metadata.custom`.
    #[serde(default)]
    pub custom: Option<Map<String, Value>>,
    /// Whether subscribers should be notified.
    #[serde(default)]
    pub notify: bool,
}

/// `delete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteParams {
    /// Target resource.
    pub uuid: ResourceKey,
}

/// `copy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyParams {
    /// Source resource.
    pub instance: ResourceKey,
    /// Owner of the copy.
    pub owner: String,
    /// Values overlaid on the source's metadata.
    #[serde(default)]
    pub defaults: Map<String, Value>,
}

/// `set_permissions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPermissionsParams {
    /// Target resource.
    pub uuid: ResourceKey,
    /// Resource owner; always keeps `manage`.
    pub owner: String,
    /// The new ACL; `None` applies the default ACL.
    #[serde(default)]
    pub permissions: Option<PermissionsInput>,
    /// Whether the resource was just created.
    #[serde(default)]
    pub created: bool,
}

/// `remove_permissions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovePermissionsParams {
    /// Target resource.
    pub uuid: ResourceKey,
}

/// Parse `input_params` into the typed shape `T`.
pub fn parse<T: DeserializeOwned>(func: FuncName, input: &Value) -> Result<T, ExecutionError> {
    serde_json::from_value(input.clone())
        .map_err(|e| ExecutionError::invalid_parameters(format!("{func}: {e}")))
}

fn require_owner(func: FuncName, owner: &str) -> Result<(), ExecutionError> {
    if owner.trim().is_empty() {
        return Err(ExecutionError::invalid_parameters(format!(
            "{func}: owner cannot be empty"
        )));
    }
    Ok(())
}

/// Validate `input` against the shape of `func`.
///
/// Returns the normalized parameters to persist: `create` and `ingest` get a
/// freshly generated `uuid` when the caller sent none.
pub fn validate_input(func: FuncName, input: &Value) -> Result<Value, ExecutionError> {
    let Value::Object(params) = input else {
        return Err(ExecutionError::invalid_parameters(format!(
            "{func}: input_params must be a JSON object"
        )));
    };
    let mut params = params.clone();
    if matches!(func, FuncName::Create | FuncName::Ingest)
        && params.get("uuid").is_none_or(Value::is_null)
    {
        params.insert(
            "uuid".to_owned(),
            Value::String(ResourceKey::generate().into()),
        );
    }
    let normalized = Value::Object(params);

    match func {
        FuncName::Create => {
            let p: CreateParams = parse(func, &normalized)?;
            require_owner(func, &p.defaults.owner)?;
        }
        FuncName::Ingest => {
            let p: IngestParams = parse(func, &normalized)?;
            require_owner(func, &p.defaults.owner)?;
            if p.files.is_empty() {
                return Err(ExecutionError::invalid_parameters(
                    "ingest: files cannot be empty",
                ));
            }
        }
        FuncName::Update => {
            parse::<UpdateParams>(func, &normalized)?;
        }
        FuncName::Delete => {
            parse::<DeleteParams>(func, &normalized)?;
        }
        FuncName::Copy => {
            let p: CopyParams = parse(func, &normalized)?;
            require_owner(func, &p.owner)?;
        }
        FuncName::SetPermissions => {
            let p: SetPermissionsParams = parse(func, &normalized)?;
            require_owner(func, &p.owner)?;
            match &p.permissions {
                Some(permissions) => permissions.check()?,
                None if p.created => {}
                None => {
                    return Err(ExecutionError::invalid_parameters(
                        "set_permissions: permissions may only be omitted for a newly created resource",
                    ));
                }
            }
        }
        FuncName::RemovePermissions => {
            parse::<RemovePermissionsParams>(func, &normalized)?;
        }
    }
    Ok(normalized)
}

/// The resource a request targets: `instance` for `copy`, `uuid` otherwise.
#[must_use]
pub fn target_resource(func: FuncName, input: &Value) -> Option<ResourceKey> {
    let key = match func {
        FuncName::Copy => "instance",
        _ => "uuid",
    };
    input
        .get(key)
        .and_then(Value::as_str)
        .and_then(|raw| ResourceKey::new(raw).ok())
}
