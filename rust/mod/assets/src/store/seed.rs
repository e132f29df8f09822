//! First-run data for an empty local store.

use assettrack_core::{ServiceError, now_rfc3339};
use tracing::info;

use crate::model::*;
use crate::model::user::hash_password;
use crate::store::{Document, Entity, LocalStore};

/// Populate the main document with default users, assets, assignments,
/// transfers and maintenance records if it has never been written. The
/// pending-disposal asset gets a matching disposal request.
///
/// Seed accounts share `initial_password`, stored hashed. Returns whether
/// anything was written.
pub fn seed_defaults(local: &LocalStore, initial_password: &str) -> Result<bool, ServiceError> {
    if local.document(Document::Main).exists()? {
        return Ok(false);
    }
    let hash = hash_password(initial_password)?;
    let now = now_rfc3339();

    let users = vec![
        seed_user("U1", "Maria Santos", "admin@lgu.gov.ph", &hash, UserRole::Admin, "Office of the Mayor", &now),
        seed_user("U2", "Jose Reyes", "engineering.head@lgu.gov.ph", &hash, UserRole::DepartmentHead, "Engineering Office", &now),
        seed_user("U3", "Ana Cruz", "ana.cruz@lgu.gov.ph", &hash, UserRole::Staff, "Treasury Office", &now),
    ];

    let assets = vec![
        seed_asset("A1", "Dell OptiPlex Desktop", "IT Equipment", AssetStatus::InUse, "Treasury Office", Some("Ana Cruz"), "2023-03-15", 42000.0, "DL-7781-X", &now),
        seed_asset("A2", "Toyota Hilux Service Vehicle", "Vehicles", AssetStatus::InUse, "Engineering Office", Some("Jose Reyes"), "2021-08-02", 1450000.0, "TH-2021-0042", &now),
        seed_asset("A3", "Executive Office Chair", "Furniture", AssetStatus::InStorage, "General Services", None, "2022-01-20", 8500.0, "FC-0193", &now),
        seed_asset("A4", "Epson Multifunction Printer", "Office Equipment", AssetStatus::InMaintenance, "Human Resources", None, "2020-11-05", 18500.0, "EP-L5190-88", &now),
        seed_asset("A5", "Portable Generator 5kVA", "Machinery", AssetStatus::PendingDisposal, "Health Office", None, "2015-06-30", 65000.0, "GEN-5K-015", &now),
    ];

    let assignments = vec![
        Assignment {
            id: "AS1".into(),
            asset_id: "A1".into(),
            asset_name: "Dell OptiPlex Desktop".into(),
            assigned_to: "Ana Cruz".into(),
            assignee_type: AssigneeType::Employee,
            department: "Treasury Office".into(),
            assigned_date: "2023-03-20".into(),
            due_date: None,
            status: AssignmentStatus::Active,
            notes: None,
        },
        Assignment {
            id: "AS2".into(),
            asset_id: "A2".into(),
            asset_name: "Toyota Hilux Service Vehicle".into(),
            assigned_to: "Jose Reyes".into(),
            assignee_type: AssigneeType::Employee,
            department: "Engineering Office".into(),
            assigned_date: "2021-08-10".into(),
            due_date: None,
            status: AssignmentStatus::Active,
            notes: Some("Field inspections".into()),
        },
    ];

    let transfers = vec![Transfer {
        id: "T1".into(),
        asset_id: "A2".into(),
        asset_name: "Toyota Hilux Service Vehicle".into(),
        from_holder: Some("Motor Pool".into()),
        to_holder: "Jose Reyes".into(),
        from_department: "General Services".into(),
        to_department: "Engineering Office".into(),
        reason: Some("Reassigned for road projects".into()),
        approved_by: "Maria Santos".into(),
        transfer_date: "2021-08-10T08:00:00+00:00".into(),
    }];

    let maintenance = vec![MaintenanceRecord {
        id: "M1".into(),
        asset_id: "A4".into(),
        asset_name: "Epson Multifunction Printer".into(),
        maintenance_type: MaintenanceType::Corrective,
        status: MaintenanceStatus::InProgress,
        scheduled_date: "2024-02-12".into(),
        completed_date: None,
        assigned_to: "GSO Technician".into(),
        cost: 1500.0,
        description: "Paper feed roller replacement".into(),
        notes: None,
    }];

    let disposals = vec![DisposalRequest {
        id: "D1".into(),
        asset_id: "A5".into(),
        asset_name: "Portable Generator 5kVA".into(),
        reason: "Beyond economical repair".into(),
        status: DisposalStatus::PendingApproval,
        requested_by: "Health Office".into(),
        request_date: "2024-03-01".into(),
        approved_by: None,
        approval_date: None,
        disposal_method: None,
        estimated_value: 5000.0,
        notes: None,
    }];

    local.transact(|tx| {
        tx.put_records(Document::Main, SystemUser::COLLECTION, &users)?;
        tx.put_records(Document::Main, Asset::COLLECTION, &assets)?;
        tx.put_records(Document::Main, Assignment::COLLECTION, &assignments)?;
        tx.put_records(Document::Main, Transfer::COLLECTION, &transfers)?;
        tx.put_records(Document::Main, MaintenanceRecord::COLLECTION, &maintenance)?;
        tx.put_records::<InventoryItem>(Document::Main, InventoryItem::COLLECTION, &[])?;
        tx.put_records(DisposalRequest::DOCUMENT, DisposalRequest::COLLECTION, &disposals)?;
        Ok(())
    })?;
    info!(
        users = users.len(),
        assets = assets.len(),
        "seeded local store with defaults"
    );
    Ok(true)
}

fn seed_user(
    id: &str,
    name: &str,
    email: &str,
    hash: &str,
    role: UserRole,
    department: &str,
    now: &str,
) -> SystemUser {
    SystemUser {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        password_hash: hash.into(),
        role,
        department: department.into(),
        status: UserStatus::Active,
        last_login: None,
        created_at: now.into(),
    }
}

#[allow(clippy::too_many_arguments)]
fn seed_asset(
    id: &str,
    name: &str,
    category: &str,
    status: AssetStatus,
    department: &str,
    assigned_to: Option<&str>,
    purchase_date: &str,
    price: f64,
    serial: &str,
    now: &str,
) -> Asset {
    Asset {
        id: id.into(),
        name: name.into(),
        category: category.into(),
        status,
        department: department.into(),
        assigned_to: assigned_to.map(Into::into),
        purchase_date: Some(purchase_date.into()),
        purchase_price: price,
        serial_number: Some(serial.into()),
        location: None,
        notes: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}
