//! Body measurement sheets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A measurement sheet for one client.
///
/// Measurement values are free-form strings: the shop records either a
/// single value (`"90"`) or a dash-separated range (`"90-95"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Server-assigned id.
    pub id: i64,
    /// Owning client.
    pub client_id: i64,
    /// The measurement values.
    #[serde(flatten)]
    pub values: MeasurementValues,
    /// Stored name of an uploaded reference photo, if any.
    pub image_path: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// The measurement fields proper, all optional.
///
/// `dos` keeps its historical wire name `do`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementValues {
    /// Back.
    #[serde(default, rename = "do")]
    pub dos: Option<String>,
    /// Chest.
    #[serde(default)]
    pub poitrine: Option<String>,
    /// Waist.
    #[serde(default)]
    pub taille: Option<String>,
    /// Garment length.
    #[serde(default)]
    pub longueur: Option<String>,
    /// Sleeve length.
    #[serde(default)]
    pub manche: Option<String>,
    /// Sleeve circumference.
    #[serde(default)]
    pub tour_manche: Option<String>,
    /// Belt.
    #[serde(default)]
    pub ceinture: Option<String>,
    /// Hips.
    #[serde(default)]
    pub bassin: Option<String>,
    /// Thigh.
    #[serde(default)]
    pub cuisse: Option<String>,
    /// Trouser length.
    #[serde(default)]
    pub longueur_pantalon: Option<String>,
    /// Hem.
    #[serde(default)]
    pub bas: Option<String>,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

impl Measurement {
    /// Creates a new sheet for a client.
    pub fn new(id: i64, client_id: i64, values: MeasurementValues, now: DateTime<Utc>) -> Self {
        Self {
            id,
            client_id,
            values,
            image_path: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl MeasurementValues {
    /// Overwrites the fields present in `self` onto an existing sheet.
    ///
    /// Absent fields keep their stored values.
    pub fn merge_into(&self, sheet: &mut Measurement, now: DateTime<Utc>) {
        let target = &mut sheet.values;
        if let Some(v) = &self.dos {
            target.dos = Some(v.clone());
        }
        if let Some(v) = &self.poitrine {
            target.poitrine = Some(v.clone());
        }
        if let Some(v) = &self.taille {
            target.taille = Some(v.clone());
        }
        if let Some(v) = &self.longueur {
            target.longueur = Some(v.clone());
        }
        if let Some(v) = &self.manche {
            target.manche = Some(v.clone());
        }
        if let Some(v) = &self.tour_manche {
            target.tour_manche = Some(v.clone());
        }
        if let Some(v) = &self.ceinture {
            target.ceinture = Some(v.clone());
        }
        if let Some(v) = &self.bassin {
            target.bassin = Some(v.clone());
        }
        if let Some(v) = &self.cuisse {
            target.cuisse = Some(v.clone());
        }
        if let Some(v) = &self.longueur_pantalon {
            target.longueur_pantalon = Some(v.clone());
        }
        if let Some(v) = &self.bas {
            target.bas = Some(v.clone());
        }
        if let Some(v) = &self.note {
            target.note = Some(v.clone());
        }
        sheet.updated_at = now;
    }

    /// Replaces the full field set of an existing sheet.
    ///
    /// Unlike [`merge_into`](Self::merge_into), absent fields are cleared.
    pub fn replace_into(&self, sheet: &mut Measurement, now: DateTime<Utc>) {
        sheet.values = self.clone();
        sheet.updated_at = now;
    }
}
