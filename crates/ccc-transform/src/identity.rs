//! Content identifier resolution for file-like records.

use tracing::{debug, warn};

use ccc_client::{ClientError, IdentityService, dir_name, file_name, placeholder_id};
use ccc_model::{CONTENT_ID_FIELD, DomainSchema, ModelError, NormalizedRecord, Value};

use crate::context::{IdentityPolicy, NormalizeContext};
use crate::error::{ImportError, Result};

/// Field naming a local resource path.
pub const FILEPATH_FIELD: &str = "filepath";
/// Field naming a remote resource location.
pub const URL_FIELD: &str = "url";
/// Field compared against the registered size during validation.
pub const SIZE_FIELD: &str = "size";

/// Validates or assigns the `ccc_id` of one record per the context's policy.
pub struct IdentityResolver<'a> {
    service: &'a dyn IdentityService,
    context: &'a NormalizeContext,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(service: &'a dyn IdentityService, context: &'a NormalizeContext) -> Self {
        Self { service, context }
    }

    pub fn resolve(&self, record: &mut NormalizedRecord, domain: &DomainSchema) -> Result<()> {
        let present = record
            .get(CONTENT_ID_FIELD)
            .filter(|value| !value.is_missing())
            .map(ToString::to_string);
        match (present, self.context.identity) {
            (Some(ccc_id), IdentityPolicy::SkipWithPlaceholder) => {
                warn!(%ccc_id, "skipping identity validation");
                Ok(())
            }
            (Some(ccc_id), _) => self.validate(&ccc_id, record),
            (None, IdentityPolicy::ValidateOnly) => Err(ModelError::MissingKeyField {
                domain: domain.name.clone(),
                field: CONTENT_ID_FIELD.to_string(),
            }
            .into()),
            (None, policy) => {
                let path = resource_path(record).ok_or_else(|| {
                    ImportError::MissingResourcePath {
                        domain: domain.name.clone(),
                    }
                })?;
                let ccc_id = self.assign(&path, policy)?;
                record.insert(CONTENT_ID_FIELD, Value::String(ccc_id));
                Ok(())
            }
        }
    }

    fn assign(&self, path: &str, policy: IdentityPolicy) -> Result<String> {
        if !policy.uses_service() {
            let ccc_id = placeholder_id(path);
            warn!(path, %ccc_id, "assigning a placeholder ccc_id");
            return Ok(ccc_id);
        }
        let registered = self
            .service
            .register(path, &self.context.site_id, &self.context.user);
        match registered {
            Ok(ccc_id) => {
                debug!(path, %ccc_id, "registered resource");
                Ok(ccc_id)
            }
            Err(ClientError::AlreadyRegistered(ccc_id)) => {
                Err(ImportError::IdentityRegistrationConflict { ccc_id })
            }
            Err(error) => Err(error.into()),
        }
    }

    fn validate(&self, ccc_id: &str, record: &NormalizedRecord) -> Result<()> {
        let registered = self
            .service
            .lookup(ccc_id)?
            .ok_or_else(|| ImportError::mismatch(ccc_id, "CCC_ID not found"))?;
        if let Some(path) = resource_path(record) {
            let name = file_name(&path);
            if registered.name != name {
                return Err(ImportError::mismatch(
                    ccc_id,
                    format!("registered name {} differs from {name}", registered.name),
                ));
            }
            let dir = dir_name(&path);
            if let Some(registered_dir) = registered.path.as_deref().filter(|d| *d != dir) {
                return Err(ImportError::mismatch(
                    ccc_id,
                    format!("registered path {registered_dir} differs from {dir}"),
                ));
            }
        }
        let local_size = record.get(SIZE_FIELD).and_then(Value::as_i64);
        if let (Some(expected), Some(local)) = (registered.size, local_size)
            && i64::try_from(expected).ok() != Some(local)
        {
            return Err(ImportError::mismatch(
                ccc_id,
                format!("registered size {expected} differs from {local}"),
            ));
        }
        debug!(ccc_id, "validated resource identity");
        Ok(())
    }
}

/// The record's `filepath`, else its `url`.
pub fn resource_path(record: &NormalizedRecord) -> Option<String> {
    [FILEPATH_FIELD, URL_FIELD]
        .into_iter()
        .filter_map(|field| record.get(field))
        .find(|value| !value.is_missing())
        .map(ToString::to_string)
}
