use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::client::{ApiClient, ApiError};
use crate::models::{Neighborhood, Photo, Property, PropertyType, User};

/// A backend collection with the uniform CRUD surface. The five entity
/// pages all drive the same generic operations below instead of carrying
/// their own copies of the fetch/save/delete plumbing.
pub trait Resource: Serialize + DeserializeOwned {
    /// Collection path, e.g. `/api/bairros`.
    const PATH: &'static str;
    /// Lowercase human name used in notifications.
    const NAME: &'static str;

    fn id(&self) -> Option<i64>;

    /// Required-field check run before any network call. Messages are
    /// user-facing.
    fn validate(&self) -> Result<(), String>;
}

impl Resource for User {
    const PATH: &'static str = "/api/usuarios";
    const NAME: &'static str = "user";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".into());
        }
        if self.email.trim().is_empty() {
            return Err("Email is required".into());
        }
        // A password must arrive with new accounts; edits may leave it blank
        // to keep the stored one.
        if self.id.is_none() && self.password.as_deref().unwrap_or("").trim().is_empty() {
            return Err("Password is required".into());
        }
        Ok(())
    }
}

impl Resource for Neighborhood {
    const PATH: &'static str = "/api/bairros";
    const NAME: &'static str = "neighborhood";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".into());
        }
        if self.city.trim().is_empty() {
            return Err("City is required".into());
        }
        if self.state.trim().is_empty() {
            return Err("State is required".into());
        }
        Ok(())
    }
}

impl Resource for PropertyType {
    const PATH: &'static str = "/api/tipos-imoveis";
    const NAME: &'static str = "property type";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".into());
        }
        Ok(())
    }
}

impl Resource for Property {
    const PATH: &'static str = "/api/imoveis";
    const NAME: &'static str = "property";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".into());
        }
        if self.purpose.trim().is_empty() {
            return Err("Select a purpose".into());
        }
        if self.status.trim().is_empty() {
            return Err("Select a status".into());
        }
        Ok(())
    }
}

impl Resource for Photo {
    const PATH: &'static str = "/api/fotos-imoveis";
    const NAME: &'static str = "photo";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(&self) -> Result<(), String> {
        if self.property_id().is_none() {
            return Err("Select a property".into());
        }
        Ok(())
    }
}

/// New-photo submission: the file plus the metadata fields the upload
/// endpoint expects alongside it.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub data: Bytes,
    pub property_id: i64,
    pub is_cover: bool,
    pub order: i64,
}

impl ApiClient {
    pub async fn list<R: Resource>(&self) -> Result<Vec<R>, ApiError> {
        self.get(R::PATH).await
    }

    pub async fn fetch<R: Resource>(&self, id: i64) -> Result<R, ApiError> {
        self.get(&format!("{}/{}", R::PATH, id)).await
    }

    pub async fn create<R: Resource>(&self, record: &R) -> Result<(), ApiError> {
        self.post::<serde_json::Value, R>(R::PATH, record)
            .await
            .map(drop)
    }

    pub async fn update<R: Resource>(&self, id: i64, record: &R) -> Result<(), ApiError> {
        self.put::<serde_json::Value, R>(&format!("{}/{}", R::PATH, id), record)
            .await
            .map(drop)
    }

    pub async fn remove<R: Resource>(&self, id: i64) -> Result<(), ApiError> {
        self.delete::<serde_json::Value>(&format!("{}/{}", R::PATH, id))
            .await
            .map(drop)
    }

    /// Create or update depending on id presence, mirroring how the forms
    /// decide between the two.
    pub async fn save<R: Resource>(&self, record: &R) -> Result<(), ApiError> {
        match record.id() {
            Some(id) => self.update(id, record).await,
            None => self.create(record).await,
        }
    }

    /// Exchange credentials for the user record the session caches.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let body = serde_json::json!({ "email": email, "senha": password });
        let value: serde_json::Value = self.post("/login", &body).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn upload_photo(&self, upload: PhotoUpload) -> Result<(), ApiError> {
        let mime = mime_guess::from_path(&upload.file_name).first_or_octet_stream();
        let part = reqwest::multipart::Part::bytes(upload.data.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(mime.as_ref())?;
        let form = reqwest::multipart::Form::new()
            .text("imovelId", upload.property_id.to_string())
            .text("capa", upload.is_cover.to_string())
            .text("ordem", upload.order.to_string())
            .part("file", part);
        self.upload::<serde_json::Value>("/api/fotos-imoveis/upload", form)
            .await
            .map(drop)
    }
}
