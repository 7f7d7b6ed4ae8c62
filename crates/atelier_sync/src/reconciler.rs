//! Batch reconciliation.

use crate::batch::{IdMappings, SyncBatch};
use crate::error::{SyncError, SyncResult};
use atelier_core::{CoreError, Measurement, OrderValues, RecordId, RecordKind, Tables};
use chrono::{DateTime, Utc};

/// Merges one batch into the tables and returns the id mappings.
///
/// Clients are fully resolved before measurements and orders, because the
/// latter may reference a client by the temporary id it carried in this
/// batch. Every row touched here gets `now` as its modification timestamp,
/// so all records synced together report identical update times.
///
/// This function mutates `tables` directly; atomicity is the caller's
/// responsibility. Run it inside
/// [`Store::transaction`](atelier_core::Store::transaction) so that any
/// error leaves the store untouched.
pub fn reconcile(
    tables: &mut Tables,
    batch: &SyncBatch,
    now: DateTime<Utc>,
) -> SyncResult<IdMappings> {
    let mut mappings = IdMappings::default();

    for change in &batch.clients {
        match &change.id {
            RecordId::Temporary(token) => {
                if mappings.clients.contains_key(token) {
                    return Err(SyncError::duplicate_temporary_id(token));
                }
                let id = tables.clients.allocate_id();
                let client = change.values.build(id, now)?;
                tables.clients.insert(id, client);
                mappings.clients.insert(token.clone(), id);
            }
            RecordId::Assigned(id) => {
                if let Some(existing) = tables.clients.get_mut(*id) {
                    change.values.merge_into(existing, now);
                } else {
                    // The device pre-assigned a server-compatible id.
                    let client = change.values.build(*id, now)?;
                    tables.clients.claim_id(*id);
                    tables.clients.insert(*id, client);
                }
            }
        }
    }

    for change in &batch.measurements {
        let owner = resolve_owner(change.client_id.as_ref(), &mappings)?;
        match &change.id {
            RecordId::Temporary(token) => {
                if mappings.measurements.contains_key(token) {
                    return Err(SyncError::duplicate_temporary_id(token));
                }
                let owner = owner.ok_or_else(|| {
                    CoreError::missing_field(RecordKind::Measurement, "client_id")
                })?;
                let id = tables.measurements.allocate_id();
                let mut sheet = Measurement::new(id, owner, change.values.clone(), now);
                sheet.image_path = change.image_path.clone();
                tables.measurements.insert(id, sheet);
                mappings.measurements.insert(token.clone(), id);
            }
            RecordId::Assigned(id) => {
                if let Some(sheet) = tables.measurements.get_mut(*id) {
                    change.values.merge_into(sheet, now);
                    if let Some(owner) = owner {
                        sheet.client_id = owner;
                    }
                    if let Some(image) = &change.image_path {
                        sheet.image_path = Some(image.clone());
                    }
                } else {
                    let owner = owner.ok_or_else(|| {
                        CoreError::missing_field(RecordKind::Measurement, "client_id")
                    })?;
                    let mut sheet = Measurement::new(*id, owner, change.values.clone(), now);
                    sheet.image_path = change.image_path.clone();
                    tables.measurements.claim_id(*id);
                    tables.measurements.insert(*id, sheet);
                }
            }
        }
    }

    for change in &batch.orders {
        let owner = resolve_owner(change.client_id.as_ref(), &mappings)?;
        let values = OrderValues {
            client_id: owner,
            montant_total: change.montant_total,
            montant_avance: change.montant_avance,
            status: change.status,
        };
        match &change.id {
            RecordId::Temporary(token) => {
                if mappings.orders.contains_key(token) {
                    return Err(SyncError::duplicate_temporary_id(token));
                }
                let id = tables.orders.allocate_id();
                let order = values.build(id, now)?;
                tables.orders.insert(id, order);
                mappings.orders.insert(token.clone(), id);
            }
            RecordId::Assigned(id) => {
                if let Some(existing) = tables.orders.get_mut(*id) {
                    values.merge_into(existing, now);
                } else {
                    let order = values.build(*id, now)?;
                    tables.orders.claim_id(*id);
                    tables.orders.insert(*id, order);
                }
            }
        }
    }

    tracing::debug!(
        records = batch.len(),
        mapped = mappings.clients.len() + mappings.measurements.len() + mappings.orders.len(),
        "batch reconciled"
    );
    Ok(mappings)
}

/// Resolves an optional owning-client reference against this batch's
/// client mappings.
///
/// A temporary token with no mapping means the batch referenced a client
/// it never submitted: malformed.
fn resolve_owner(
    reference: Option<&RecordId>,
    mappings: &IdMappings,
) -> SyncResult<Option<i64>> {
    match reference {
        None => Ok(None),
        Some(RecordId::Assigned(id)) => Ok(Some(*id)),
        Some(RecordId::Temporary(token)) => mappings
            .clients
            .get(token)
            .copied()
            .map(Some)
            .ok_or_else(|| SyncError::unmapped_client_reference(token)),
    }
}

/// The most recent modification timestamp across all entities.
///
/// An entirely empty store reports `now`: a device that has never synced
/// should treat the server as "just changed" and do a full refresh.
pub fn last_update(tables: &Tables, now: DateTime<Utc>) -> DateTime<Utc> {
    tables.latest_update().unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{ClientChange, MeasurementChange, OrderChange};
    use atelier_core::{ClientValues, MeasurementValues, OrderStatus, Store};

    fn temp(token: &str) -> RecordId {
        RecordId::Temporary(token.to_string())
    }

    fn client_change(id: RecordId, nom: &str) -> ClientChange {
        ClientChange {
            id,
            values: ClientValues {
                nom: Some(nom.to_string()),
                prenoms: Some("Test".to_string()),
                email: None,
                telephone: Some("0100000000".to_string()),
            },
        }
    }

    fn measurement_change(id: RecordId, client_id: Option<RecordId>) -> MeasurementChange {
        MeasurementChange {
            id,
            client_id,
            values: MeasurementValues {
                poitrine: Some("92".to_string()),
                ..MeasurementValues::default()
            },
            image_path: None,
        }
    }

    #[test]
    fn temporary_rows_create_and_cross_link() {
        let mut tables = Tables::default();
        let batch = SyncBatch {
            clients: vec![client_change(temp("temp_c1"), "Fofana")],
            measurements: vec![measurement_change(temp("temp_m1"), Some(temp("temp_c1")))],
            orders: vec![],
        };

        let mappings = reconcile(&mut tables, &batch, Utc::now()).unwrap();

        let client_id = mappings.clients["temp_c1"];
        let sheet_id = mappings.measurements["temp_m1"];
        assert_eq!(
            tables.measurements.get(sheet_id).unwrap().client_id,
            client_id
        );
    }

    #[test]
    fn resubmitting_temp_ids_creates_new_rows() {
        let mut tables = Tables::default();
        let batch = SyncBatch {
            clients: vec![client_change(temp("temp_c1"), "Fofana")],
            ..SyncBatch::default()
        };

        let first = reconcile(&mut tables, &batch, Utc::now()).unwrap();
        let second = reconcile(&mut tables, &batch, Utc::now()).unwrap();

        assert_ne!(first.clients["temp_c1"], second.clients["temp_c1"]);
        assert_eq!(tables.clients.len(), 2);
    }

    #[test]
    fn assigned_id_merges_present_fields_only() {
        let now = Utc::now();
        let mut tables = Tables::default();
        let id = tables.clients.allocate_id();
        let client = ClientValues {
            nom: Some("Yao".to_string()),
            prenoms: Some("Adjoua".to_string()),
            email: Some("adjoua@example.com".to_string()),
            telephone: Some("0101010101".to_string()),
        }
        .build(id, now)
        .unwrap();
        tables.clients.insert(id, client);

        let batch = SyncBatch {
            clients: vec![ClientChange {
                id: RecordId::Assigned(id),
                values: ClientValues {
                    telephone: Some("0999999999".to_string()),
                    ..ClientValues::default()
                },
            }],
            ..SyncBatch::default()
        };
        let later = now + chrono::Duration::seconds(10);
        reconcile(&mut tables, &batch, later).unwrap();

        let stored = tables.clients.get(id).unwrap();
        assert_eq!(stored.telephone, "0999999999");
        assert_eq!(stored.nom, "Yao");
        assert_eq!(stored.email.as_deref(), Some("adjoua@example.com"));
        assert_eq!(stored.updated_at, later);
    }

    #[test]
    fn unknown_assigned_id_creates_verbatim() {
        let mut tables = Tables::default();
        let batch = SyncBatch {
            clients: vec![client_change(RecordId::Assigned(500), "Offline")],
            ..SyncBatch::default()
        };

        let mappings = reconcile(&mut tables, &batch, Utc::now()).unwrap();
        assert!(mappings.is_empty());
        assert!(tables.clients.contains(500));
        // The allocator moved past the claimed id.
        assert_eq!(tables.clients.allocate_id(), 501);
    }

    #[test]
    fn unmapped_temporary_reference_rejects_batch() {
        let mut tables = Tables::default();
        let batch = SyncBatch {
            measurements: vec![measurement_change(temp("temp_m1"), Some(temp("temp_ghost")))],
            ..SyncBatch::default()
        };

        let err = reconcile(&mut tables, &batch, Utc::now()).unwrap_err();
        assert!(matches!(err, SyncError::UnmappedClientReference { .. }));
        assert!(err.is_malformed_batch());
    }

    #[test]
    fn malformed_batch_rolls_back_through_store() {
        let store = Store::open_in_memory();
        store
            .transaction(|tables| {
                let batch = SyncBatch {
                    clients: vec![client_change(temp("temp_c1"), "Kept")],
                    ..SyncBatch::default()
                };
                reconcile(tables, &batch, Utc::now())
            })
            .unwrap();
        let before = store.read(|t| t.clone());

        // The client row would be created before the bad reference is hit;
        // the transaction must discard it.
        let result = store.transaction(|tables| {
            let batch = SyncBatch {
                clients: vec![client_change(temp("temp_c2"), "Discarded")],
                measurements: vec![measurement_change(
                    temp("temp_m1"),
                    Some(temp("temp_unknown")),
                )],
                ..SyncBatch::default()
            };
            reconcile(tables, &batch, Utc::now())
        });

        assert!(result.is_err());
        assert_eq!(store.read(|t| t.clone()), before);
    }

    #[test]
    fn duplicate_temporary_id_rejected() {
        let mut tables = Tables::default();
        let batch = SyncBatch {
            clients: vec![
                client_change(temp("temp_c1"), "One"),
                client_change(temp("temp_c1"), "Two"),
            ],
            ..SyncBatch::default()
        };

        let err = reconcile(&mut tables, &batch, Utc::now()).unwrap_err();
        assert!(matches!(err, SyncError::DuplicateTemporaryId { .. }));
    }

    #[test]
    fn missing_required_field_rejects_batch() {
        let mut tables = Tables::default();
        let batch = SyncBatch {
            clients: vec![ClientChange {
                id: temp("temp_c1"),
                values: ClientValues {
                    nom: Some("NoPhone".to_string()),
                    prenoms: Some("X".to_string()),
                    ..ClientValues::default()
                },
            }],
            ..SyncBatch::default()
        };

        let err = reconcile(&mut tables, &batch, Utc::now()).unwrap_err();
        assert!(err.is_malformed_batch());
        assert!(err.to_string().contains("telephone"));
    }

    #[test]
    fn batch_shares_one_timestamp() {
        let mut tables = Tables::default();
        let now = Utc::now();
        let batch = SyncBatch {
            clients: vec![
                client_change(temp("temp_c1"), "A"),
                client_change(temp("temp_c2"), "B"),
            ],
            orders: vec![OrderChange {
                id: temp("temp_o1"),
                client_id: Some(temp("temp_c1")),
                montant_total: Some(20_000.0),
                montant_avance: Some(5_000.0),
                status: None,
            }],
            ..SyncBatch::default()
        };

        reconcile(&mut tables, &batch, now).unwrap();

        assert!(tables.clients.iter().all(|c| c.updated_at == now));
        assert!(tables.orders.iter().all(|o| o.updated_at == now));
    }

    #[test]
    fn order_balance_derived_through_sync() {
        let mut tables = Tables::default();
        let now = Utc::now();
        let batch = SyncBatch {
            clients: vec![client_change(temp("temp_c1"), "Zadi")],
            orders: vec![OrderChange {
                id: temp("temp_o1"),
                client_id: Some(temp("temp_c1")),
                montant_total: Some(30_000.0),
                montant_avance: Some(10_000.0),
                status: None,
            }],
            ..SyncBatch::default()
        };
        let mappings = reconcile(&mut tables, &batch, now).unwrap();
        let order_id = mappings.orders["temp_o1"];
        assert_eq!(tables.orders.get(order_id).unwrap().montant_restant, 20_000.0);

        // An offline payment update re-derives the balance.
        let update = SyncBatch {
            orders: vec![OrderChange {
                id: RecordId::Assigned(order_id),
                client_id: None,
                montant_total: None,
                montant_avance: Some(25_000.0),
                status: Some(OrderStatus::Completed),
            }],
            ..SyncBatch::default()
        };
        let later = now + chrono::Duration::seconds(10);
        reconcile(&mut tables, &update, later).unwrap();

        let order = tables.orders.get(order_id).unwrap();
        assert_eq!(order.montant_restant, 5_000.0);
        assert_eq!(order.completed_at, Some(later));
    }

    #[test]
    fn last_update_falls_back_to_now() {
        let tables = Tables::default();
        let now = Utc::now();
        assert_eq!(last_update(&tables, now), now);
    }

    #[test]
    fn last_update_reports_newest_row() {
        let mut tables = Tables::default();
        let created = Utc::now();
        let batch = SyncBatch {
            clients: vec![client_change(temp("temp_c1"), "Solo")],
            ..SyncBatch::default()
        };
        reconcile(&mut tables, &batch, created).unwrap();

        let asked = created + chrono::Duration::hours(1);
        assert_eq!(last_update(&tables, asked), created);
    }
}
