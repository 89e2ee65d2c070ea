// Entity edit forms
// One form per entity. A form starts either empty (create) or from a persisted
// entity (update); saving dispatches on whether the form carries an id.

use log::info;
use thiserror::Error;

use crate::api::{ApiClient, ApiError, Resource};
use crate::models::{EntityId, Identified};

pub mod chat;
pub mod comment;
pub mod message;
pub mod post;
pub mod profile;

pub use chat::{ChatEditor, ChatForm};
pub use comment::CommentForm;
pub use message::MessageForm;
pub use post::PostForm;
pub use profile::ProfileForm;

#[derive(Debug, Error)]
pub enum FormError {
    /// A field failed validation; nothing was sent
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The backend rejected the save
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FormError {
    pub(crate) fn invalid(field: &'static str, reason: &str) -> Self {
        FormError::Invalid {
            field,
            reason: reason.to_string(),
        }
    }
}

/// Editable copy of one entity.
///
/// `Default` gives the create-mode defaults (no id, empty relations).
pub trait EntityForm: Default {
    type Entity: Resource;

    fn from_entity(entity: &Self::Entity) -> Self;

    fn to_entity(&self) -> Self::Entity;

    fn id(&self) -> Option<EntityId>;

    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Back to create defaults, or to the values of `entity`
    fn reset(&mut self, entity: Option<&Self::Entity>) {
        *self = entity.map(Self::from_entity).unwrap_or_default();
    }

    fn validate(&self) -> Result<(), FormError> {
        Ok(())
    }
}

/// Validate, then create (no id) or update (id present)
pub async fn save_form<F: EntityForm>(api: &ApiClient, form: &F) -> Result<F::Entity, FormError> {
    form.validate()?;
    let entity = form.to_entity();
    let saved = if form.is_new() {
        api.create(&entity).await?
    } else {
        api.update(&entity).await?
    };
    info!("Saved {} {:?}", <F::Entity as Resource>::NAME, form.id().or(saved.id()));
    Ok(saved)
}

// Blank or whitespace-only text counts as missing
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// Payload and content type of an attachment only make sense together
pub(crate) fn check_attachment(
    field: &'static str,
    data: &Option<String>,
    content_type: &Option<String>,
) -> Result<(), FormError> {
    match (data, content_type) {
        (Some(_), None) => Err(FormError::invalid(field, "content type is missing")),
        (None, Some(_)) => Err(FormError::invalid(field, "content type without data")),
        _ => Ok(()),
    }
}
