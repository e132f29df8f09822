//! Entity implementations for the asset-tracking records.
//!
//! Declares collection, table, id and hooks for each model, plus the
//! label ↔ code remapping of enumerated columns.

use assettrack_core::now_rfc3339;
use assettrack_remote::Row;

use crate::model::*;
use crate::store::entity::remap;
use crate::store::{Document, Entity};

// ── Asset ──

impl Entity for Asset {
    const LABEL: &'static str = "asset";
    const COLLECTION: &'static str = "assets";
    const TABLE: &'static str = "assets";
    const ORDER_BY: Option<&'static str> = Some("created_at");

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn before_create(&mut self) {
        let now = now_rfc3339();
        if self.created_at.is_empty() {
            self.created_at = now.clone();
        }
        self.updated_at = now;
    }

    fn before_update(&mut self) {
        self.updated_at = now_rfc3339();
    }

    fn encode_row(row: &mut Row) {
        remap(row, "status", AssetStatus::code_for_label);
    }

    fn decode_row(row: &mut Row) {
        remap(row, "status", AssetStatus::label_for_code);
    }
}

// ── Assignment ──

impl Entity for Assignment {
    const LABEL: &'static str = "assignment";
    const COLLECTION: &'static str = "assignments";
    const TABLE: &'static str = "assignments";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn encode_row(row: &mut Row) {
        remap(row, "status", AssignmentStatus::code_for_label);
        remap(row, "assignee_type", AssigneeType::code_for_label);
    }

    fn decode_row(row: &mut Row) {
        remap(row, "status", AssignmentStatus::label_for_code);
        remap(row, "assignee_type", AssigneeType::label_for_code);
    }
}

// ── Transfer ──

impl Entity for Transfer {
    const LABEL: &'static str = "transfer";
    const COLLECTION: &'static str = "transfers";
    const TABLE: &'static str = "transfers";
    const ORDER_BY: Option<&'static str> = Some("transfer_date");

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn before_create(&mut self) {
        if self.transfer_date.is_empty() {
            self.transfer_date = now_rfc3339();
        }
    }
}

// ── MaintenanceRecord ──

impl Entity for MaintenanceRecord {
    const LABEL: &'static str = "maintenance record";
    const COLLECTION: &'static str = "maintenanceRecords";
    const TABLE: &'static str = "maintenance_records";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn encode_row(row: &mut Row) {
        remap(row, "status", MaintenanceStatus::code_for_label);
        remap(row, "maintenance_type", MaintenanceType::code_for_label);
    }

    fn decode_row(row: &mut Row) {
        remap(row, "status", MaintenanceStatus::label_for_code);
        remap(row, "maintenance_type", MaintenanceType::label_for_code);
    }
}

// ── DisposalRequest ──

impl Entity for DisposalRequest {
    const LABEL: &'static str = "disposal request";
    const COLLECTION: &'static str = "disposalRequests";
    const TABLE: &'static str = "disposal_requests";
    const DOCUMENT: Document = Document::Disposals;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn encode_row(row: &mut Row) {
        remap(row, "status", DisposalStatus::code_for_label);
    }

    fn decode_row(row: &mut Row) {
        remap(row, "status", DisposalStatus::label_for_code);
    }
}

// ── InventoryItem ──

impl Entity for InventoryItem {
    const LABEL: &'static str = "inventory item";
    const COLLECTION: &'static str = "inventory";
    const TABLE: &'static str = "inventory_items";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn before_create(&mut self) {
        self.refresh_status();
    }

    fn before_update(&mut self) {
        self.refresh_status();
    }

    fn encode_row(row: &mut Row) {
        remap(row, "status", InventoryStatus::code_for_label);
    }

    fn decode_row(row: &mut Row) {
        remap(row, "status", InventoryStatus::label_for_code);
    }
}

// ── SystemUser ──

impl Entity for SystemUser {
    const LABEL: &'static str = "user";
    const COLLECTION: &'static str = "users";
    const TABLE: &'static str = "users";
    const ORDER_BY: Option<&'static str> = Some("created_at");

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn before_create(&mut self) {
        if self.created_at.is_empty() {
            self.created_at = now_rfc3339();
        }
    }
}

// ── AuditLog ──

impl Entity for AuditLog {
    const LABEL: &'static str = "audit log";
    const COLLECTION: &'static str = "auditLogs";
    const TABLE: &'static str = "audit_logs";
    const DOCUMENT: Document = Document::AuditLogs;
    const ORDER_BY: Option<&'static str> = Some("timestamp");

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn before_create(&mut self) {
        if self.timestamp.is_empty() {
            self.timestamp = now_rfc3339();
        }
    }
}
