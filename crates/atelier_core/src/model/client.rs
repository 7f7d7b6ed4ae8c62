//! Clients of the shop.

use crate::error::{CoreError, CoreResult};
use crate::model::RecordKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A client record.
///
/// Wire field names keep the shop's vocabulary (`nom`, `prenoms`,
/// `telephone`) so existing front ends keep working unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Server-assigned id.
    pub id: i64,
    /// Family name.
    pub nom: String,
    /// Given names.
    pub prenoms: String,
    /// Contact email, if any.
    pub email: Option<String>,
    /// Contact phone number.
    pub telephone: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A partial set of client fields, as submitted by a caller.
///
/// Absent fields leave the stored value untouched on merge. Building a new
/// record requires `nom`, `prenoms`, and `telephone`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientValues {
    /// Family name.
    #[serde(default)]
    pub nom: Option<String>,
    /// Given names.
    #[serde(default)]
    pub prenoms: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone number.
    #[serde(default)]
    pub telephone: Option<String>,
}

impl ClientValues {
    /// Builds a new client from these values.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is absent.
    pub fn build(&self, id: i64, now: DateTime<Utc>) -> CoreResult<Client> {
        let nom = self
            .nom
            .clone()
            .ok_or_else(|| CoreError::missing_field(RecordKind::Client, "nom"))?;
        let prenoms = self
            .prenoms
            .clone()
            .ok_or_else(|| CoreError::missing_field(RecordKind::Client, "prenoms"))?;
        let telephone = self
            .telephone
            .clone()
            .ok_or_else(|| CoreError::missing_field(RecordKind::Client, "telephone"))?;

        Ok(Client {
            id,
            nom,
            prenoms,
            email: self.email.clone(),
            telephone,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrites the fields present in `self` onto an existing client.
    pub fn merge_into(&self, client: &mut Client, now: DateTime<Utc>) {
        if let Some(nom) = &self.nom {
            client.nom = nom.clone();
        }
        if let Some(prenoms) = &self.prenoms {
            client.prenoms = prenoms.clone();
        }
        if let Some(email) = &self.email {
            client.email = Some(email.clone());
        }
        if let Some(telephone) = &self.telephone {
            client.telephone = telephone.clone();
        }
        client.updated_at = now;
    }
}
