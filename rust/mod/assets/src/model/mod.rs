//! Domain records. Plain data: behavior lives in `service` and `workflow`.
//!
//! Every record serializes camelCase for local storage and HTTP clients.
//! Enumerations carry two spellings: the display label used in the domain
//! (`"In Use"`) and the code the hosted backend stores (`"active"`).

/// Declare an enumeration with a domain label and a backend code per variant.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($label:literal, $code:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Domain label, e.g. `"In Use"`.
            pub fn label(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// Backend code, e.g. `"active"`.
            pub fn code(&self) -> &'static str {
                match self {
                    $( $name::$variant => $code, )+
                }
            }

            pub fn from_label(s: &str) -> Option<Self> {
                match s {
                    $( $label => Some($name::$variant), )+
                    _ => None,
                }
            }

            pub fn from_code(s: &str) -> Option<Self> {
                match s {
                    $( $code => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Lenient parse for user input: label or code, any case.
            pub fn parse(s: &str) -> Option<Self> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(s) || v.code().eq_ignore_ascii_case(s))
            }

            /// Label → code, for rows headed to the backend.
            pub fn code_for_label(s: &str) -> Option<&'static str> {
                Self::from_label(s).map(|v| v.code())
            }

            /// Code → label, for rows coming back from the backend.
            pub fn label_for_code(s: &str) -> Option<&'static str> {
                Self::from_code(s).map(|v| v.label())
            }

            /// Comma-separated labels, for error messages.
            pub fn labels() -> String {
                Self::ALL.iter().map(|v| v.label()).collect::<Vec<_>>().join(", ")
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

pub mod asset;
pub mod assignment;
pub mod audit;
pub mod disposal;
pub mod inventory;
pub mod maintenance;
pub mod transfer;
pub mod user;

pub use asset::{ASSET_CATEGORIES, Asset, AssetStatus, DEPARTMENTS, NewAsset};
pub use assignment::{AssigneeType, Assignment, AssignmentStatus, NewAssignment};
pub use audit::{
    ActionCount, AuditCategory, AuditLog, AuditQuery, AuditSeverity, AuditStats, NewAuditEntry,
};
pub use disposal::{DisposalRequest, DisposalStatus, NewDisposalRequest};
pub use inventory::{InventoryItem, InventoryStatus, NewInventoryItem};
pub use maintenance::{MaintenanceRecord, MaintenanceStatus, MaintenanceType, ScheduleMaintenance};
pub use transfer::{NewTransfer, Transfer};
pub use user::{NewUser, SystemUser, UserProfile, UserRole, UserStatus};
