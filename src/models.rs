use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Access level carried by the backend user record.
///
/// The backend spells roles inconsistently: user CRUD uses a `tipo` field
/// with `administrador`/`corretor`/`cliente`, while `/login` responses use
/// `role` and abbreviate the first as `admin`. Deserialization accepts every
/// spelling; anything unrecognized degrades to `Client`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Administrator,
    Broker,
    #[default]
    Client,
}

impl Role {
    pub fn as_wire(self) -> &'static str {
        match self {
            Role::Administrator => "administrador",
            Role::Broker => "corretor",
            Role::Client => "cliente",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::Broker => "Broker",
            Role::Client => "Client",
        }
    }

    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "administrador" | "admin" => Role::Administrator,
            "corretor" => Role::Broker,
            _ => Role::Client,
        }
    }

    pub fn can_create(self) -> bool {
        matches!(self, Role::Administrator | Role::Broker)
    }

    pub fn can_edit(self) -> bool {
        matches!(self, Role::Administrator | Role::Broker)
    }

    pub fn can_delete(self) -> bool {
        matches!(self, Role::Administrator)
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Role::from_wire(&value))
    }
}

/// Application user as stored by the backend and cached in the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Write-only: sent on create, omitted when blank so updates keep the
    /// stored credential. Never rendered.
    #[serde(rename = "senha", default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "tipo", alias = "role", default)]
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Neighborhood {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "cidade", default)]
    pub city: String,
    #[serde(rename = "estado", default)]
    pub state: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
}

/// A listing. Purpose and status are free strings on the wire; the only
/// value with special meaning is the rental purpose, which flips the
/// displayed price to the monthly one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Property {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "precoVenda", default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(rename = "precoAluguel", default, skip_serializing_if = "Option::is_none")]
    pub rent_price: Option<f64>,
    #[serde(rename = "finalidade", default)]
    pub purpose: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "dormitorios", default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i64>,
    #[serde(rename = "banheiros", default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i64>,
    #[serde(rename = "garagem", default, skip_serializing_if = "Option::is_none")]
    pub garages: Option<i64>,
    #[serde(rename = "areaTotal", default, skip_serializing_if = "Option::is_none")]
    pub total_area: Option<f64>,
    #[serde(rename = "areaConstruida", default, skip_serializing_if = "Option::is_none")]
    pub built_area: Option<f64>,
    #[serde(rename = "endereco", default)]
    pub street: String,
    #[serde(rename = "numero", default)]
    pub number: String,
    #[serde(rename = "complemento", default)]
    pub unit: String,
    #[serde(rename = "cep", default)]
    pub postal_code: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    /// Comma-separated feature tags, split only for display.
    #[serde(rename = "caracteristicas", default)]
    pub features: String,
    #[serde(rename = "destaque", default)]
    pub featured: bool,
    #[serde(rename = "bairro", default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<Neighborhood>,
    #[serde(rename = "tipoImovel", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
}

/// The rental purpose value the backend stores.
pub const PURPOSE_RENT: &str = "Aluguel";

impl Property {
    pub fn is_rental(&self) -> bool {
        self.purpose == PURPOSE_RENT
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "caminho", default)]
    pub path: String,
    #[serde(rename = "nomeArquivo", default)]
    pub file_name: String,
    #[serde(rename = "capa", default)]
    pub is_cover: bool,
    #[serde(rename = "ordem", default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Embedded owning property, as returned by the photo collection.
    #[serde(rename = "imovel", default, skip_serializing_if = "Option::is_none")]
    pub property: Option<Property>,
}

impl Photo {
    pub fn property_id(&self) -> Option<i64> {
        self.property.as_ref().and_then(|p| p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_capabilities_per_role() {
        assert!(Role::Administrator.can_create());
        assert!(Role::Administrator.can_edit());
        assert!(Role::Administrator.can_delete());

        assert!(Role::Broker.can_create());
        assert!(Role::Broker.can_edit());
        assert!(!Role::Broker.can_delete());

        assert!(!Role::Client.can_create());
        assert!(!Role::Client.can_edit());
        assert!(!Role::Client.can_delete());
    }

    #[test]
    fn role_accepts_every_backend_spelling() {
        let admin: Role = serde_json::from_str("\"administrador\"").unwrap();
        assert_eq!(admin, Role::Administrator);
        let admin_short: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(admin_short, Role::Administrator);
        let broker: Role = serde_json::from_str("\"corretor\"").unwrap();
        assert_eq!(broker, Role::Broker);
        let client: Role = serde_json::from_str("\"cliente\"").unwrap();
        assert_eq!(client, Role::Client);
    }

    #[test]
    fn unknown_role_degrades_to_client() {
        let role: Role = serde_json::from_str("\"superuser\"").unwrap();
        assert_eq!(role, Role::Client);
    }

    #[test]
    fn role_serializes_to_canonical_wire_value() {
        assert_eq!(
            serde_json::to_string(&Role::Administrator).unwrap(),
            "\"administrador\""
        );
        assert_eq!(serde_json::to_string(&Role::Broker).unwrap(), "\"corretor\"");
    }

    #[test]
    fn user_maps_onto_backend_field_names() {
        let user = User {
            id: Some(3),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password: Some("secret".into()),
            role: Role::Broker,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["nome"], "Ana");
        assert_eq!(value["senha"], "secret");
        assert_eq!(value["tipo"], "corretor");
        assert!(value.get("name").is_none());
    }

    #[test]
    fn user_password_is_omitted_when_absent() {
        let user = User {
            id: Some(3),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password: None,
            role: Role::Client,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("senha").is_none());
    }

    #[test]
    fn user_deserializes_from_login_shape() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"nome":"Ana","email":"ana@example.com","role":"admin"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Administrator);
        assert!(user.password.is_none());
    }

    #[test]
    fn photo_reads_embedded_property_reference() {
        let photo: Photo = serde_json::from_str(
            r#"{"id":7,"caminho":"/uploads/a.jpg","nomeArquivo":"a.jpg","capa":true,"ordem":2,"imovel":{"id":5,"titulo":"House"}}"#,
        )
        .unwrap();
        assert_eq!(photo.property_id(), Some(5));
        assert!(photo.is_cover);
        assert_eq!(photo.order, Some(2));
    }

    #[test]
    fn rental_purpose_is_detected() {
        let rental = Property {
            purpose: PURPOSE_RENT.into(),
            ..Property::default()
        };
        assert!(rental.is_rental());
        let sale = Property {
            purpose: "Venda".into(),
            ..Property::default()
        };
        assert!(!sale.is_rental());
    }
}
