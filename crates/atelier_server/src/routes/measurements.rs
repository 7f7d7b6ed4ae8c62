//! Measurement routes.
//!
//! Measurements arrive as multipart forms: the front end submits the sheet
//! fields as text parts alongside an optional `image` file part. Blank text
//! parts mean "not provided".

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use atelier_core::{CoreError, Measurement, MeasurementValues, RecordKind};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

/// A parsed measurement form.
#[derive(Default)]
struct MeasurementForm {
    client_id: Option<i64>,
    values: MeasurementValues,
    image: Option<(String, Vec<u8>)>,
}

impl MeasurementForm {
    async fn read(multipart: &mut Multipart) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let file_name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                if let Some(file_name) = file_name {
                    if !file_name.is_empty() && !data.is_empty() {
                        form.image = Some((file_name, data.to_vec()));
                    }
                }
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(e.to_string()))?;
            if text.is_empty() {
                continue;
            }

            let values = &mut form.values;
            match name.as_str() {
                "client_id" => {
                    form.client_id = Some(
                        text.parse()
                            .map_err(|_| ApiError::bad_request("client_id must be an integer"))?,
                    );
                }
                "do" => values.dos = Some(text),
                "poitrine" => values.poitrine = Some(text),
                "taille" => values.taille = Some(text),
                "longueur" => values.longueur = Some(text),
                "manche" => values.manche = Some(text),
                "tour_manche" => values.tour_manche = Some(text),
                "ceinture" => values.ceinture = Some(text),
                "bassin" => values.bassin = Some(text),
                "cuisse" => values.cuisse = Some(text),
                "longueur_pantalon" => values.longueur_pantalon = Some(text),
                "bas" => values.bas = Some(text),
                "note" => values.note = Some(text),
                _ => {} // unknown parts are ignored
            }
        }

        Ok(form)
    }
}

pub(crate) async fn list_for_client(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
) -> Json<Vec<Measurement>> {
    Json(state.store.read(|t| t.measurements_for_client(client_id)))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Measurement>)> {
    let form = MeasurementForm::read(&mut multipart).await?;
    let client_id = form
        .client_id
        .ok_or_else(|| CoreError::missing_field(RecordKind::Measurement, "client_id"))
        .map_err(ApiError::from)?;

    if !state.store.read(|t| t.clients.contains(client_id)) {
        return Err(ApiError::not_found(RecordKind::Client, client_id));
    }

    let image_path = match &form.image {
        Some((file_name, data)) => Some(state.files.save(client_id, file_name, data)?),
        None => None,
    };

    let sheet = state.store.transaction(|tables| {
        let id = tables.measurements.allocate_id();
        let mut sheet = Measurement::new(id, client_id, form.values.clone(), Utc::now());
        sheet.image_path = image_path.clone();
        tables.measurements.insert(id, sheet.clone());
        Ok::<_, ApiError>(sheet)
    })?;

    tracing::info!(id = sheet.id, client_id, "measurement created");
    Ok((StatusCode::CREATED, Json(sheet)))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<Measurement>> {
    let form = MeasurementForm::read(&mut multipart).await?;

    let (client_id, old_image) = state
        .store
        .read(|t| {
            t.measurements
                .get(id)
                .map(|m| (m.client_id, m.image_path.clone()))
        })
        .ok_or_else(|| ApiError::not_found(RecordKind::Measurement, id))?;

    let new_image = match &form.image {
        Some((file_name, data)) => {
            if let Some(old) = &old_image {
                state.files.delete(old)?;
            }
            Some(state.files.save(client_id, file_name, data)?)
        }
        None => None,
    };

    let sheet = state.store.transaction(|tables| {
        let sheet = tables
            .measurements
            .get_mut(id)
            .ok_or_else(|| ApiError::not_found(RecordKind::Measurement, id))?;
        form.values.merge_into(sheet, Utc::now());
        if let Some(name) = &new_image {
            sheet.image_path = Some(name.clone());
        }
        Ok::<_, ApiError>(sheet.clone())
    })?;
    Ok(Json(sheet))
}

/// Find-or-create the single measurement sheet of a client.
///
/// Unlike the by-id update, this route replaces the full field set, so a
/// field left blank in the form clears the stored value.
pub(crate) async fn upsert_for_client(
    State(state): State<AppState>,
    Path(client_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<Measurement>> {
    let form = MeasurementForm::read(&mut multipart).await?;

    let existing = state.store.read(|t| {
        t.measurements
            .iter()
            .find(|m| m.client_id == client_id)
            .map(|m| (m.id, m.image_path.clone()))
    });

    let new_image = match &form.image {
        Some((file_name, data)) => {
            if let Some((_, Some(old))) = &existing {
                state.files.delete(old)?;
            }
            Some(state.files.save(client_id, file_name, data)?)
        }
        None => None,
    };

    let sheet = state.store.transaction(|tables| match existing {
        Some((id, _)) => {
            let sheet = tables
                .measurements
                .get_mut(id)
                .ok_or_else(|| ApiError::not_found(RecordKind::Measurement, id))?;
            form.values.replace_into(sheet, Utc::now());
            if let Some(name) = &new_image {
                sheet.image_path = Some(name.clone());
            }
            Ok::<_, ApiError>(sheet.clone())
        }
        None => {
            let id = tables.measurements.allocate_id();
            let mut sheet = Measurement::new(id, client_id, form.values.clone(), Utc::now());
            sheet.image_path = new_image.clone();
            tables.measurements.insert(id, sheet.clone());
            Ok(sheet)
        }
    })?;
    Ok(Json(sheet))
}
